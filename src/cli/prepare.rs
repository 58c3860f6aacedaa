use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};
use std::time::Instant;

use mzresolve::chemistry::{ReagentIon, SpeciesRegistry};
use mzresolve::dataset::{check_bias_file, DatasetBuilder, PeakList};
use mzresolve::search::Resolver;

use super::config::Config;

/// Build a labeled combo file from an assigned peak list
pub fn run(
    peak_list: PathBuf,
    combo_out: PathBuf,
    unidentified: Option<PathBuf>,
    ion: Option<ReagentIon>,
    threads: Option<usize>,
    config: Option<PathBuf>,
) -> Result<()> {
    let config = Config::load(config.as_deref())?;
    let search_config = config.search_config();
    let builder_config = config.builder_config(threads, ion);
    let unidentified = unidentified.unwrap_or_else(|| default_unidentified_path(&combo_out));

    info!("Preparing combo file");
    info!("  Peak list:    {}", peak_list.display());
    info!("  Combo output: {}", combo_out.display());
    info!("  Unidentified: {}", unidentified.display());
    info!("  Threads:      {}", builder_config.threads);
    match builder_config.reagent_ion {
        Some(ion) => info!("  Reagent ion:  {}", ion),
        None => info!("  Reagent ion:  inferred per peak"),
    }

    let start = Instant::now();
    let registry = SpeciesRegistry::new();

    let peaks = PeakList::from_tsv_file(&peak_list)
        .with_context(|| format!("Failed to read peak list: {}", peak_list.display()))?;
    let assignments = peaks
        .encode_assignments(&registry)
        .context("Failed to encode peak assignments")?;
    info!(
        "Loaded {} peaks, {} assigned",
        peaks.len(),
        peaks.assigned_count()
    );

    let builder = DatasetBuilder::new(
        Resolver::with_config(&registry, search_config),
        builder_config,
    );
    let stats = builder
        .create_combo_file(&peaks, &assignments, &combo_out, &unidentified)
        .context("Failed to build combo file")?;
    let balance = check_bias_file(&combo_out)?;

    let elapsed = start.elapsed();

    #[cfg(feature = "colorized_output")]
    {
        use console::style;
        println!("{}", style("Combo file complete").green().bold());
    }
    #[cfg(not(feature = "colorized_output"))]
    {
        println!("Combo file complete");
    }

    println!("  {}", stats);
    println!("  Label balance: {}", balance);
    println!("  Time: {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

/// `<combo stem>_unidentified.csv` next to the combo file
fn default_unidentified_path(combo: &Path) -> PathBuf {
    let stem = combo
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "combos".to_string());
    combo.with_file_name(format!("{}_unidentified.csv", stem))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_unidentified_path() {
        assert_eq!(
            default_unidentified_path(Path::new("out/combos.csv")),
            PathBuf::from("out/combos_unidentified.csv")
        );
        assert_eq!(
            default_unidentified_path(Path::new("train")),
            PathBuf::from("train_unidentified.csv")
        );
    }
}
