//! TOML configuration file support.
//!
//! Every key is optional; command-line flags override file values:
//!
//! ```toml
//! # mzresolve.toml
//! [search]
//! ppm_tolerance = 50.0
//! pruning_slack = 1.5
//! max_nodes = 10000000
//!
//! [dataset]
//! threads = 10
//! flush_threshold = 1024
//! reagent_ion = "NH4"
//!
//! [split]
//! test_positives = 548
//! test_negatives = 10000
//! keep_fraction = 0.08
//! seed = 42
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use mzresolve::chemistry::ReagentIon;
use mzresolve::dataset::BuilderConfig;
use mzresolve::search::SearchConfig;

/// Root configuration structure for mzresolve.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Resolver settings.
    #[serde(default)]
    pub search: SearchSection,

    /// Combo-file builder settings.
    #[serde(default)]
    pub dataset: DatasetSection,

    /// Downsampling and train/test split settings.
    #[serde(default)]
    pub split: SplitSection,
}

/// `[search]` table.
#[derive(Debug, Default, Deserialize)]
pub struct SearchSection {
    /// Acceptance window in ppm.
    pub ppm_tolerance: Option<f64>,

    /// Overshoot tolerated before pruning a branch.
    pub pruning_slack: Option<f64>,

    /// Node budget per searched mass.
    pub max_nodes: Option<usize>,
}

/// `[dataset]` table.
#[derive(Debug, Default, Deserialize)]
pub struct DatasetSection {
    /// Worker threads.
    pub threads: Option<usize>,

    /// Bytes buffered per worker before writing.
    pub flush_threshold: Option<usize>,

    /// Fixed reagent ion; inferred per peak when absent.
    pub reagent_ion: Option<ReagentIon>,
}

/// `[split]` table.
#[derive(Debug, Default, Deserialize)]
pub struct SplitSection {
    /// Positive rows in the test file.
    pub test_positives: Option<usize>,

    /// Negative rows in the test file.
    pub test_negatives: Option<usize>,

    /// Probability of keeping a negative row when reducing.
    pub keep_fraction: Option<f64>,

    /// RNG seed for reproducible sampling.
    pub seed: Option<u64>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load from `path` if given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Resolver configuration with file values applied over the defaults.
    pub fn search_config(&self) -> SearchConfig {
        let defaults = SearchConfig::default();
        SearchConfig {
            ppm_tolerance: self.search.ppm_tolerance.unwrap_or(defaults.ppm_tolerance),
            pruning_slack: self.search.pruning_slack.unwrap_or(defaults.pruning_slack),
            max_nodes: self.search.max_nodes.unwrap_or(defaults.max_nodes),
        }
    }

    /// Builder configuration; `threads` and `reagent_ion` take precedence over the file.
    pub fn builder_config(
        &self,
        threads: Option<usize>,
        reagent_ion: Option<ReagentIon>,
    ) -> BuilderConfig {
        let defaults = BuilderConfig::default();
        BuilderConfig {
            threads: threads.or(self.dataset.threads).unwrap_or(defaults.threads),
            flush_threshold: self
                .dataset
                .flush_threshold
                .unwrap_or(defaults.flush_threshold),
            reagent_ion: reagent_ion.or(self.dataset.reagent_ion),
        }
    }
}
