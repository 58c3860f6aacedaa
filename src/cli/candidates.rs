use anyhow::{Context, Result};
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use mzresolve::chemistry::{decode, simplify, CriteriaResult, ReagentIon, SpeciesRegistry};
use mzresolve::features::{mz_to_data, DEFAULT_N_FEATURES};
use mzresolve::search::Resolver;

use super::config::Config;

#[derive(Serialize)]
struct PeakReport {
    mz: f64,
    reagent_ion: ReagentIon,
    candidates: Vec<CandidateReport>,
}

#[derive(Serialize)]
struct CandidateReport {
    formula: String,
    unsimplified_formula: String,
    ppm_error: f64,
    criteria: CriteriaResult,
}

/// Enumerate candidates for each observed mass
pub fn run(
    mz_values: Vec<f64>,
    ion: ReagentIon,
    ppm: Option<f64>,
    json: bool,
    config: Option<PathBuf>,
) -> Result<()> {
    let config = Config::load(config.as_deref())?;
    let mut search_config = config.search_config();
    if let Some(ppm) = ppm {
        search_config.ppm_tolerance = ppm;
    }

    let registry = SpeciesRegistry::new();
    let resolver = Resolver::with_config(&registry, search_config);

    info!("Reagent ion: {}", ion);
    info!("Tolerance: {} ppm", search_config.ppm_tolerance);

    let mut reports = Vec::with_capacity(mz_values.len());
    for mz in mz_values {
        let data = mz_to_data(&resolver, mz, ion, DEFAULT_N_FEATURES)
            .with_context(|| format!("Search failed for m/z {}", mz))?;

        let candidates = data
            .encoded_compounds
            .iter()
            .zip(&data.ppm_errors)
            .zip(&data.criteria)
            .map(|((compound, &ppm_error), &criteria)| CandidateReport {
                formula: decode(&registry, &simplify(&registry, compound)),
                unsimplified_formula: decode(&registry, compound),
                ppm_error,
                criteria,
            })
            .collect();

        reports.push(PeakReport {
            mz,
            reagent_ion: ion,
            candidates,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            print_table(report);
        }
    }

    Ok(())
}

fn print_table(report: &PeakReport) {
    println!(
        "m/z {:.6} ({}): {} candidates",
        report.mz,
        report.reagent_ion,
        report.candidates.len()
    );
    if report.candidates.is_empty() {
        println!();
        return;
    }

    println!(
        "  {:<16} {:<20} {:>10}  {}",
        "Formula", "Unsimplified", "ppm", "Criteria"
    );
    for candidate in &report.candidates {
        println!(
            "  {:<16} {:<20} {:>10.3}  {}",
            candidate.formula,
            candidate.unsimplified_formula,
            candidate.ppm_error,
            criteria_label(&candidate.criteria)
        );
    }
    println!();
}

fn criteria_label(criteria: &CriteriaResult) -> String {
    let flags: String = criteria
        .mask
        .iter()
        .map(|&flag| if flag { '1' } else { '0' })
        .collect();

    let verdict = if criteria.passed { "pass" } else { "fail" };

    #[cfg(feature = "colorized_output")]
    let verdict = if criteria.passed {
        console::style(verdict).green().to_string()
    } else {
        console::style(verdict).red().to_string()
    };

    format!("{} {}", flags, verdict)
}
