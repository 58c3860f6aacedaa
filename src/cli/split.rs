use anyhow::{Context, Result};
use log::info;
use std::path::PathBuf;

use mzresolve::dataset::{
    check_bias_file, make_rng, negative_sample_reduction, train_test_split,
    DEFAULT_KEEP_FRACTION, DEFAULT_TEST_NEGATIVES, DEFAULT_TEST_POSITIVES,
};

use super::config::Config;

/// Downsample negatives of a combo file
pub fn run_reduce(
    combo: PathBuf,
    output: PathBuf,
    keep_fraction: Option<f64>,
    seed: Option<u64>,
    config: Option<PathBuf>,
) -> Result<()> {
    let config = Config::load(config.as_deref())?;
    let keep_fraction = keep_fraction
        .or(config.split.keep_fraction)
        .unwrap_or(DEFAULT_KEEP_FRACTION);
    let seed = seed.or(config.split.seed);

    let before = check_bias_file(&combo)
        .with_context(|| format!("Failed to read combo file: {}", combo.display()))?;
    info!("Input label balance: {}", before);
    info!("Keep fraction: {}", keep_fraction);

    let mut rng = make_rng(seed);
    let stats = negative_sample_reduction(&combo, &output, keep_fraction, &mut rng)
        .context("Negative-sample reduction failed")?;

    println!("{}", stats);
    println!("Wrote {}", output.display());
    Ok(())
}

/// Split a combo file into train and test files
pub fn run_split(
    combo: PathBuf,
    prefix: PathBuf,
    test_positives: Option<usize>,
    test_negatives: Option<usize>,
    seed: Option<u64>,
    config: Option<PathBuf>,
) -> Result<()> {
    let config = Config::load(config.as_deref())?;
    let n_test_pos = test_positives
        .or(config.split.test_positives)
        .unwrap_or(DEFAULT_TEST_POSITIVES);
    let n_test_neg = test_negatives
        .or(config.split.test_negatives)
        .unwrap_or(DEFAULT_TEST_NEGATIVES);
    let seed = seed.or(config.split.seed);

    info!(
        "Sampling {} positive and {} negative test rows",
        n_test_pos, n_test_neg
    );

    let mut rng = make_rng(seed);
    let stats = train_test_split(&combo, &prefix, n_test_pos, n_test_neg, &mut rng)
        .with_context(|| format!("Failed to split combo file: {}", combo.display()))?;

    println!("{}", stats);
    Ok(())
}
