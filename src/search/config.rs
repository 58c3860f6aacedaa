use serde::{Deserialize, Serialize};

use crate::chemistry::ChemError;

/// Default acceptance window around the target mass, in ppm
pub const DEFAULT_PPM_TOLERANCE: f64 = 50.0;

/// Default overshoot (mass units) tolerated before a branch is pruned
pub const DEFAULT_PRUNING_SLACK: f64 = 1.5;

/// Default cap on visited search nodes per target
pub const DEFAULT_MAX_NODES: usize = 10_000_000;

/// Configuration for the combinatorial resolver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum absolute ppm error for a candidate to be recorded
    pub ppm_tolerance: f64,

    /// A species is skipped when taking it would drive the residual mass to
    /// `-pruning_slack` or below
    pub pruning_slack: f64,

    /// Number of search nodes visited before the search gives up and returns
    /// what it has found so far
    pub max_nodes: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            ppm_tolerance: DEFAULT_PPM_TOLERANCE,
            pruning_slack: DEFAULT_PRUNING_SLACK,
            max_nodes: DEFAULT_MAX_NODES,
        }
    }
}

impl SearchConfig {
    /// Narrow window for well-calibrated instruments
    pub fn strict() -> Self {
        Self {
            ppm_tolerance: 10.0,
            ..Self::default()
        }
    }

    /// Set the ppm tolerance
    pub fn with_ppm_tolerance(mut self, ppm_tolerance: f64) -> Self {
        self.ppm_tolerance = ppm_tolerance;
        self
    }

    /// Set the node budget
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// Reject values the search cannot terminate or prune with
    pub fn validate(&self) -> Result<(), ChemError> {
        if !self.ppm_tolerance.is_finite() || self.ppm_tolerance < 0.0 {
            return Err(ChemError::InvalidArgument(format!(
                "ppm_tolerance must be a finite non-negative number, got {}",
                self.ppm_tolerance
            )));
        }
        if !self.pruning_slack.is_finite() || self.pruning_slack < 0.0 {
            return Err(ChemError::InvalidArgument(format!(
                "pruning_slack must be a finite non-negative number, got {}",
                self.pruning_slack
            )));
        }
        if self.max_nodes == 0 {
            return Err(ChemError::InvalidArgument(
                "max_nodes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
