//! Integration tests for mzresolve
//!
//! These tests run the full pipeline from an assigned peak list to ranked
//! candidates and train/test files.

use mzresolve::chemistry::{decode, simplify, ReagentIon, SpeciesRegistry};
use mzresolve::dataset::{
    check_bias_file, make_rng, negative_sample_reduction, train_test_split, BuilderConfig,
    DatasetBuilder, PeakList, UNIDENTIFIED_HEADER,
};
use mzresolve::features::{mz_to_data, DEFAULT_N_FEATURES};
use mzresolve::inference::{score_batch, InferenceError};
use mzresolve::search::{Resolver, SearchConfig};
use ndarray::Array2;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const PEAK_LIST: &str = "peak\trt\tintensity\tformula\tmass\n\
                         1\t10.1\t5000\tC2H6O\t46.041865\n\
                         2\t10.4\t3100\tCH4O\t32.026215\n\
                         3\t11.3\t800\t\t50.000000\n\
                         4\t12.0\t1200\tCH3Cl\t50.476675\n\
                         5\t12.8\t2500\tC3H6O\t58.041865\n\
                         6\t13.7\t900\tC2H6O\t60.000000\n";

fn write_peak_list(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("peaks.tsv");
    fs::write(&path, PEAK_LIST).unwrap();
    path
}

fn line_count(path: &Path) -> usize {
    fs::read_to_string(path).unwrap().lines().count()
}

/// Peak list -> combo file -> reduced file -> train/test split
#[test]
fn test_prepare_reduce_split_pipeline() {
    let dir = tempdir().unwrap();
    let peak_path = write_peak_list(dir.path());
    let combo_path = dir.path().join("combos.csv");
    let unidentified_path = dir.path().join("unidentified.csv");

    let registry = SpeciesRegistry::new();
    let peaks = PeakList::from_tsv_file(&peak_path).unwrap();
    let assignments = peaks.encode_assignments(&registry).unwrap();

    let config = BuilderConfig {
        threads: 3,
        ..BuilderConfig::default()
    };
    let builder = DatasetBuilder::new(Resolver::new(&registry), config);
    let stats = builder
        .create_combo_file(&peaks, &assignments, &combo_path, &unidentified_path)
        .unwrap();

    // Four matching assignments, one off-mass assignment, one empty row
    assert_eq!(stats.identified, 4);
    assert_eq!(stats.unidentified, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.positive_rows, 4);
    assert_eq!(stats.rows_written, stats.positive_rows + stats.negative_rows);
    assert_eq!(line_count(&combo_path), stats.rows_written);

    let unidentified = fs::read_to_string(&unidentified_path).unwrap();
    let mut lines = unidentified.lines();
    assert_eq!(lines.next(), Some(UNIDENTIFIED_HEADER));
    assert!(lines.next().unwrap().starts_with("C2H6O,"));
    assert_eq!(lines.next(), None);

    let balance = check_bias_file(&combo_path).unwrap();
    assert_eq!(balance.positives, 4);
    assert_eq!(balance.negatives, stats.negative_rows);

    // Reduction keeps every positive
    let reduced_path = dir.path().join("reduced.csv");
    let mut rng = make_rng(Some(42));
    let reduction = negative_sample_reduction(&combo_path, &reduced_path, 0.5, &mut rng).unwrap();
    assert_eq!(reduction.positives, 4);
    assert_eq!(
        reduction.negatives_kept + reduction.negatives_dropped,
        balance.negatives
    );
    let reduced_balance = check_bias_file(&reduced_path).unwrap();
    assert_eq!(reduced_balance.positives, 4);
    assert_eq!(reduced_balance.negatives, reduction.negatives_kept);

    // Split the full combo file
    let prefix = dir.path().join("run1");
    let n_test_neg = balance.negatives.min(3);
    let mut rng = make_rng(Some(7));
    let split = train_test_split(&combo_path, &prefix, 2, n_test_neg, &mut rng).unwrap();

    assert_eq!(split.test.positives, 2);
    assert_eq!(split.test.negatives, n_test_neg);
    assert_eq!(split.train.positives, 2);
    assert_eq!(split.train.negatives, balance.negatives - n_test_neg);

    let test_path = dir.path().join("run1_test_combos.csv");
    let train_path = dir.path().join("run1_train_combos.csv");
    assert_eq!(line_count(&test_path), split.test.total());
    assert_eq!(line_count(&train_path), split.train.total());
    assert_eq!(check_bias_file(&test_path).unwrap(), split.test);
    assert_eq!(check_bias_file(&train_path).unwrap(), split.train);
}

/// A fixed reagent ion turns the chlorine assignment into an unidentified peak
#[test]
fn test_prepare_with_fixed_ion() {
    let dir = tempdir().unwrap();
    let peak_path = write_peak_list(dir.path());
    let combo_path = dir.path().join("combos.csv");
    let unidentified_path = dir.path().join("unidentified.csv");

    let registry = SpeciesRegistry::new();
    let peaks = PeakList::from_tsv_file(&peak_path).unwrap();
    let assignments = peaks.encode_assignments(&registry).unwrap();

    let config = BuilderConfig {
        threads: 2,
        reagent_ion: Some(ReagentIon::Ammonium),
        ..BuilderConfig::default()
    };
    let builder = DatasetBuilder::new(Resolver::new(&registry), config);
    let stats = builder
        .create_combo_file(&peaks, &assignments, &combo_path, &unidentified_path)
        .unwrap();

    assert_eq!(stats.identified, 3);
    assert_eq!(stats.unidentified, 2);
    assert_eq!(stats.skipped, 1);

    let unidentified = fs::read_to_string(&unidentified_path).unwrap();
    assert!(unidentified.lines().any(|line| line.starts_with("CH3Cl,")));
}

/// Combo rows carry the same values as the in-memory feature matrix
#[test]
fn test_combo_rows_match_features() {
    let dir = tempdir().unwrap();
    let peak_path = dir.path().join("single.tsv");
    fs::write(&peak_path, "a\tb\tc\tformula\tmass\n1\t0\t0\tCH4O\t32.026215\n").unwrap();
    let combo_path = dir.path().join("combos.csv");

    let registry = SpeciesRegistry::new();
    let resolver = Resolver::new(&registry);
    let peaks = PeakList::from_tsv_file(&peak_path).unwrap();
    let assignments = peaks.encode_assignments(&registry).unwrap();
    DatasetBuilder::new(resolver.clone(), BuilderConfig::default())
        .create_combo_file(
            &peaks,
            &assignments,
            &combo_path,
            dir.path().join("unidentified.csv"),
        )
        .unwrap();

    let data = mz_to_data(&resolver, 32.026215, ReagentIon::Ammonium, DEFAULT_N_FEATURES).unwrap();
    let text = fs::read_to_string(&combo_path).unwrap();
    let rows: Vec<Vec<f64>> = text
        .lines()
        .map(|line| line.split(',').map(|v| v.parse().unwrap()).collect())
        .collect();

    assert_eq!(rows.len(), data.len());
    for (row, features) in rows.iter().zip(data.features.rows()) {
        assert_eq!(row.len(), DEFAULT_N_FEATURES + 1);
        for (written, expected) in row.iter().zip(features.iter()) {
            assert!((written - expected).abs() < 1e-6);
        }
    }
    assert_eq!(rows.iter().filter(|row| row[DEFAULT_N_FEATURES] == 1.0).count(), 1);
}

/// Ranking a batch of masses with an injected scorer
#[test]
fn test_score_batch_ranks_candidates() {
    let registry = SpeciesRegistry::new();
    let resolver = Resolver::with_config(&registry, SearchConfig::strict());

    // Prefer the candidate with the smallest ppm error
    let scorer = |features: &Array2<f64>| -> Result<Vec<f64>, InferenceError> {
        Ok(features
            .rows()
            .into_iter()
            .map(|row| 1.0 / (1.0 + row[DEFAULT_N_FEATURES - 1].abs()))
            .collect())
    };

    let ranked = score_batch(
        &resolver,
        &scorer,
        &[46.041865, 32.026215],
        ReagentIon::Ammonium,
    )
    .unwrap();
    assert!(!ranked.is_empty());
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));

    let top = &ranked[0];
    assert!(top.ppm_error.abs() < 1.0);
    assert_eq!(
        top.formula,
        decode(&registry, &simplify(&registry, &top.compound))
    );
}
