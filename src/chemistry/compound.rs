//! Fixed-point encoded compounds.
//!
//! An encoded compound holds one count per registry species. Counts are kept
//! as exact integers of the fixed-point unit; the scaled view (`count * 0.01`)
//! is what feature matrices and combo files carry.

use std::ops::Index;

use serde::{Deserialize, Serialize};

use super::error::ChemError;
use super::registry::{SpeciesRegistry, TOTAL_SPECIES};

/// Size of one fixed-point unit ("hundredths of an atom")
pub const CHEM_SCALE_FACTOR: f64 = 0.01;

/// Fixed-length vector of species counts in registry order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EncodedCompound {
    counts: [u32; TOTAL_SPECIES],
}

impl EncodedCompound {
    /// All-zero compound
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from integer counts
    pub fn from_counts(counts: [u32; TOTAL_SPECIES]) -> Self {
        Self { counts }
    }

    /// Build from a scaled slice (e.g. a feature-matrix row segment).
    ///
    /// Values are rounded to the nearest unit; negative values clamp to zero.
    pub fn from_scaled(values: &[f64]) -> Result<Self, ChemError> {
        if values.len() != TOTAL_SPECIES {
            return Err(ChemError::ShapeError {
                expected: TOTAL_SPECIES,
                actual: values.len(),
            });
        }
        let mut counts = [0u32; TOTAL_SPECIES];
        for (count, value) in counts.iter_mut().zip(values) {
            *count = scaled_to_count(*value);
        }
        Ok(Self { counts })
    }

    /// Count of the species at `idx`
    pub fn count(&self, idx: usize) -> u32 {
        self.counts[idx]
    }

    /// Overwrite the count at `idx`
    pub fn set_count(&mut self, idx: usize, count: u32) {
        self.counts[idx] = count;
    }

    /// Add to the count at `idx`, saturating at `u32::MAX`
    pub fn add_count(&mut self, idx: usize, count: u32) {
        self.counts[idx] = self.counts[idx].saturating_add(count);
    }

    /// Add to the count at `idx`; `None` (and no change) on overflow
    pub fn checked_add_count(&mut self, idx: usize, count: u32) -> Option<u32> {
        let total = self.counts[idx].checked_add(count)?;
        self.counts[idx] = total;
        Some(total)
    }

    /// Integer counts in registry order
    pub fn counts(&self) -> &[u32; TOTAL_SPECIES] {
        &self.counts
    }

    /// Scaled value at `idx`
    pub fn scaled(&self, idx: usize) -> f64 {
        f64::from(self.counts[idx]) * CHEM_SCALE_FACTOR
    }

    /// Scaled values in registry order
    pub fn to_scaled(&self) -> [f64; TOTAL_SPECIES] {
        std::array::from_fn(|idx| self.scaled(idx))
    }

    /// True if every count is zero
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Monoisotopic mass implied by the counts
    pub fn mass(&self, registry: &SpeciesRegistry) -> f64 {
        self.counts
            .iter()
            .zip(registry.all_masses())
            .map(|(&count, mass)| f64::from(count) * mass)
            .sum()
    }
}

impl Index<usize> for EncodedCompound {
    type Output = u32;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.counts[idx]
    }
}

/// Round a scaled value to its integer unit count
pub fn scaled_to_count(value: f64) -> u32 {
    let units = (value / CHEM_SCALE_FACTOR).round();
    if units.is_finite() && units > 0.0 {
        units as u32
    } else {
        0
    }
}

/// Mass of an encoded compound
pub fn compound_mass(registry: &SpeciesRegistry, compound: &EncodedCompound) -> f64 {
    compound.mass(registry)
}

/// Parts-per-million deviation of an observed mass from a theoretical one
///
/// # Examples
///
/// ```
/// use mzresolve::chemistry::get_ppm;
///
/// let ppm = get_ppm(100.0010, 100.0);
/// assert!((ppm - 10.0).abs() < 1e-6);
/// ```
pub fn get_ppm(observed_mz: f64, theoretical_mz: f64) -> f64 {
    const PPM_NORMALIZATION_FACTOR: f64 = 1e6;
    ((observed_mz - theoretical_mz) / theoretical_mz) * PPM_NORMALIZATION_FACTOR
}

/// Per-index fixed-point equality of two compounds
pub fn compounds_are_equal(a: &EncodedCompound, b: &EncodedCompound) -> bool {
    a.counts == b.counts
}

/// Per-index fixed-point equality of two raw scaled slices.
///
/// Counts are rounded to the nearest unit before comparing.
pub fn scaled_compounds_are_equal(a: &[f64], b: &[f64]) -> Result<bool, ChemError> {
    if a.len() != b.len() {
        return Err(ChemError::ShapeError {
            expected: a.len(),
            actual: b.len(),
        });
    }
    if a.len() != TOTAL_SPECIES {
        return Err(ChemError::ShapeError {
            expected: TOTAL_SPECIES,
            actual: a.len(),
        });
    }
    Ok(a
        .iter()
        .zip(b)
        .all(|(x, y)| scaled_to_count(*x) == scaled_to_count(*y)))
}
