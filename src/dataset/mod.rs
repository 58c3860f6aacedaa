//! # Dataset Module
//!
//! Building labeled training data from an assigned peak list.
//!
//! ## Combo file
//!
//! One line per search candidate, no header:
//!
//! ```text
//! crit1,crit2,crit3,crit4,<13 scaled counts>,ppm_error,label
//! ```
//!
//! Criteria flags and the label are `0`/`1`; counts and the ppm error carry six
//! decimals. Assigned peaks for which no candidate matches are appended to a
//! separate log with the header `Compound,PPM`.
//!
//! ## Pipeline
//!
//! ```rust,no_run
//! use mzresolve::chemistry::SpeciesRegistry;
//! use mzresolve::dataset::{BuilderConfig, DatasetBuilder, PeakList};
//! use mzresolve::search::Resolver;
//!
//! let registry = SpeciesRegistry::new();
//! let peaks = PeakList::from_tsv_file("peaks.tsv")?;
//! let assignments = peaks.encode_assignments(&registry)?;
//!
//! let builder = DatasetBuilder::new(Resolver::new(&registry), BuilderConfig::default());
//! let stats = builder.create_combo_file(&peaks, &assignments, "combos.csv", "unidentified.csv")?;
//! println!("{}", stats);
//! # Ok::<(), mzresolve::dataset::DatasetError>(())
//! ```

mod builder;
mod error;
mod peak_list;
mod sink;
mod split;
mod stats;


pub use builder::{partition, write_combo_row, BuilderConfig, DatasetBuilder, DEFAULT_THREADS};
pub use error::DatasetError;
pub use peak_list::{AssignedFormula, PeakList, FORMULA_COLUMN, MASS_COLUMN};
pub use sink::{ComboSink, DEFAULT_FLUSH_THRESHOLD, UNIDENTIFIED_HEADER};
pub use split::{
    check_bias, check_bias_file, make_rng, negative_sample_reduction, reduce_negatives,
    train_test_split, DEFAULT_KEEP_FRACTION, DEFAULT_TEST_NEGATIVES, DEFAULT_TEST_POSITIVES,
};
pub use stats::{BatchStats, LabelBalance, ReductionStats, SplitStats};
