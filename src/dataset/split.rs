//! Reshaping labeled combo files: label balance, negative downsampling and
//! train/test splitting.
//!
//! All sampling draws from a caller-supplied RNG, consumed sequentially, so a
//! seeded [`StdRng`] gives reproducible output.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::error::DatasetError;
use super::stats::{LabelBalance, ReductionStats, SplitStats};

/// Default probability of keeping a negative row during reduction
pub const DEFAULT_KEEP_FRACTION: f64 = 0.08;

/// Default number of positive rows in the test split
pub const DEFAULT_TEST_POSITIVES: usize = 548;

/// Default number of negative rows in the test split
pub const DEFAULT_TEST_NEGATIVES: usize = 10_000;

/// RNG seeded from `seed`, or from OS entropy when no seed is given
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Count positive and negative labels
pub fn check_bias(labels: &[bool]) -> LabelBalance {
    let positives = labels.iter().filter(|&&label| label).count();
    LabelBalance {
        positives,
        negatives: labels.len() - positives,
    }
}

/// Count positive and negative rows of a combo file
pub fn check_bias_file<P: AsRef<Path>>(path: P) -> Result<LabelBalance, DatasetError> {
    let rows = read_rows(BufReader::new(File::open(path)?))?;
    let labels: Vec<bool> = rows.iter().map(|(_, label)| *label).collect();
    Ok(check_bias(&labels))
}

/// Keep every positive row and each negative row with probability
/// `keep_fraction`, writing the survivors to `output`
pub fn negative_sample_reduction<P, Q, R>(
    input: P,
    output: Q,
    keep_fraction: f64,
    rng: &mut R,
) -> Result<ReductionStats, DatasetError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: Rng + ?Sized,
{
    let reader = BufReader::new(File::open(input.as_ref())?);
    let writer = BufWriter::new(File::create(output.as_ref())?);
    let stats = reduce_negatives(reader, writer, keep_fraction, rng)?;
    log::info!("{}", stats);
    Ok(stats)
}

/// Stream form of [`negative_sample_reduction`]
pub fn reduce_negatives<I, W, R>(
    input: I,
    output: W,
    keep_fraction: f64,
    rng: &mut R,
) -> Result<ReductionStats, DatasetError>
where
    I: Read,
    W: Write,
    R: Rng + ?Sized,
{
    if !(0.0..=1.0).contains(&keep_fraction) {
        return Err(DatasetError::InvalidArgument(format!(
            "keep fraction must be within [0, 1], got {}",
            keep_fraction
        )));
    }

    let mut writer = combo_writer(output);
    let mut stats = ReductionStats::default();

    for (record, label) in read_rows(input)? {
        if label {
            stats.positives += 1;
        } else if rng.random_bool(keep_fraction) {
            stats.negatives_kept += 1;
        } else {
            stats.negatives_dropped += 1;
            continue;
        }
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(stats)
}

/// Split a combo file into `<prefix>_test_combos.csv` and
/// `<prefix>_train_combos.csv`.
///
/// `n_test_pos` positive and `n_test_neg` negative rows are sampled without
/// replacement into the test file (positives first). The remaining rows go to
/// the train file, positives first, each group in input order.
pub fn train_test_split<P, R>(
    combo: P,
    output_prefix: &Path,
    n_test_pos: usize,
    n_test_neg: usize,
    rng: &mut R,
) -> Result<SplitStats, DatasetError>
where
    P: AsRef<Path>,
    R: Rng + ?Sized,
{
    let rows = read_rows(BufReader::new(File::open(combo.as_ref())?))?;
    let (positives, negatives): (Vec<_>, Vec<_>) = rows.into_iter().partition(|(_, label)| *label);

    let balance = LabelBalance {
        positives: positives.len(),
        negatives: negatives.len(),
    };
    log::info!("Input label balance: {}", balance);

    for (wanted, available, name) in [
        (n_test_pos, positives.len(), "positive"),
        (n_test_neg, negatives.len(), "negative"),
    ] {
        if wanted > available {
            return Err(DatasetError::InvalidArgument(format!(
                "requested {} {} test rows but only {} exist",
                wanted, name, available
            )));
        }
    }

    let pos_test = rand::seq::index::sample(rng, positives.len(), n_test_pos).into_vec();
    let neg_test = rand::seq::index::sample(rng, negatives.len(), n_test_neg).into_vec();

    let test_path = with_suffix(output_prefix, "_test_combos.csv");
    let train_path = with_suffix(output_prefix, "_train_combos.csv");

    let mut test = combo_writer(BufWriter::new(File::create(&test_path)?));
    for &idx in &pos_test {
        test.write_record(&positives[idx].0)?;
    }
    for &idx in &neg_test {
        test.write_record(&negatives[idx].0)?;
    }
    test.flush()?;

    let mut train = combo_writer(BufWriter::new(File::create(&train_path)?));
    for (group, sampled) in [(&positives, &pos_test), (&negatives, &neg_test)] {
        let mut in_test = vec![false; group.len()];
        for &idx in sampled {
            in_test[idx] = true;
        }
        for (idx, (record, _)) in group.iter().enumerate() {
            if !in_test[idx] {
                train.write_record(record)?;
            }
        }
    }
    train.flush()?;

    let stats = SplitStats {
        test: LabelBalance {
            positives: n_test_pos,
            negatives: n_test_neg,
        },
        train: LabelBalance {
            positives: positives.len() - n_test_pos,
            negatives: negatives.len() - n_test_neg,
        },
    };
    log::info!(
        "Wrote {} and {} ({})",
        test_path.display(),
        train_path.display(),
        stats
    );
    Ok(stats)
}

fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn combo_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(writer)
}

/// Read combo rows together with their label (last field)
fn read_rows<I: Read>(input: I) -> Result<Vec<(csv::StringRecord, bool)>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|pos| pos.line()).unwrap_or_default();
        let field = record.get(record.len().saturating_sub(1)).unwrap_or_default();
        let label = parse_label(field).ok_or_else(|| DatasetError::FormatError {
            line,
            reason: format!("label '{}' is neither 0 nor 1", field),
        })?;
        rows.push((record, label));
    }
    Ok(rows)
}

fn parse_label(field: &str) -> Option<bool> {
    match field.trim() {
        "1" => Some(true),
        "0" => Some(false),
        other => match other.parse::<f64>() {
            Ok(value) if value == 1.0 => Some(true),
            Ok(value) if value == 0.0 => Some(false),
            _ => None,
        },
    }
}
