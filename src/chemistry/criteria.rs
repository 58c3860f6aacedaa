//! Hydrogen-parity and hydrogen-bound plausibility rules.

use serde::Serialize;

use super::compound::EncodedCompound;
use super::registry::{SpeciesRegistry, N_CRITERIA};

/// Outcome of the four plausibility rules for one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CriteriaResult {
    /// Per-rule pass flags; rules whose guard does not apply report `true`
    pub mask: [bool; N_CRITERIA],
    /// Logical AND of all flags
    pub passed: bool,
}

impl CriteriaResult {
    /// Flags as 0.0 / 1.0 feature values
    pub fn as_features(&self) -> [f64; N_CRITERIA] {
        self.mask.map(|flag| if flag { 1.0 } else { 0.0 })
    }
}

/// Evaluate the plausibility rules.
///
/// - NH4 present: rule 1 fails on an odd hydrogen count, rule 2 fails when
///   hydrogen exceeds `2 * carbon + 2`.
/// - No nitrogen, NH4 or NH3: rule 3 fails on an even hydrogen count, rule 4
///   fails when hydrogen exceeds `2 * carbon + 3`.
pub fn check_criteria(registry: &SpeciesRegistry, compound: &EncodedCompound) -> CriteriaResult {
    let count_of = |symbol: &str| {
        registry
            .index_of(symbol)
            .map(|idx| compound.count(idx))
            .unwrap_or_default()
    };

    let contains_nh4 = count_of("NH4") > 0;
    let contains_nh3 = count_of("NH3") > 0;
    let n_hydrogen = u64::from(count_of("H"));
    let n_carbon = u64::from(count_of("C"));
    let n_nitrogen = count_of("N");

    let mut mask = [true; N_CRITERIA];

    if contains_nh4 {
        if n_hydrogen % 2 == 1 {
            mask[0] = false;
        }
        if n_hydrogen > 2 * n_carbon + 2 {
            mask[1] = false;
        }
    }

    if n_nitrogen == 0 && !contains_nh4 && !contains_nh3 {
        if n_hydrogen % 2 == 0 {
            mask[2] = false;
        }
        if n_hydrogen > 2 * n_carbon + 3 {
            mask[3] = false;
        }
    }

    CriteriaResult {
        mask,
        passed: mask.iter().all(|&flag| flag),
    }
}
