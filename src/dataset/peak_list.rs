use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::chemistry::{encode, simplify, EncodedCompound, SpeciesRegistry};

use super::error::DatasetError;

/// Column (0-based) holding the assigned formula
pub const FORMULA_COLUMN: usize = 3;

/// Column (0-based) holding the observed mass
pub const MASS_COLUMN: usize = 4;

/// Observed masses and their assigned formulas, as parallel arrays
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeakList {
    /// Observed m/z of each peak
    pub mz: Vec<f64>,
    /// Assigned formula of each peak; empty when the peak is unassigned
    pub formulas: Vec<String>,
}

/// Both encodings of an assigned formula
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignedFormula {
    /// Formula as written, polyatomic groups kept
    pub unsimplified: EncodedCompound,
    /// Purely elemental form
    pub simplified: EncodedCompound,
}

impl PeakList {
    /// Parse a tab-separated peak list file
    pub fn from_tsv_file<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Parse a tab-separated peak list. The first line is a header.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .has_headers(true)
            .quoting(false)
            .from_reader(reader);

        let mut peaks = PeakList::default();

        for (row_idx, record) in csv_reader.records().enumerate() {
            let record = record?;
            let line = record
                .position()
                .map(|pos| pos.line())
                .unwrap_or(row_idx as u64 + 2);

            let formula = record.get(FORMULA_COLUMN).ok_or_else(|| DatasetError::FormatError {
                line,
                reason: format!("missing formula column {}", FORMULA_COLUMN + 1),
            })?;
            let mass = record.get(MASS_COLUMN).ok_or_else(|| DatasetError::FormatError {
                line,
                reason: format!("missing mass column {}", MASS_COLUMN + 1),
            })?;
            let mass: f64 = mass.trim().parse().map_err(|_| DatasetError::FormatError {
                line,
                reason: format!("cannot convert '{}' to a mass", mass),
            })?;
            if !mass.is_finite() {
                return Err(DatasetError::FormatError {
                    line,
                    reason: format!("mass must be finite, got {}", mass),
                });
            }

            peaks.mz.push(mass);
            peaks.formulas.push(formula.trim().to_string());
        }

        log::info!("Parsed {} peaks", peaks.len());
        Ok(peaks)
    }

    /// Number of peaks
    pub fn len(&self) -> usize {
        self.mz.len()
    }

    /// True when the list holds no peaks
    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }

    /// Number of peaks carrying an assigned formula
    pub fn assigned_count(&self) -> usize {
        self.formulas.iter().filter(|f| !f.is_empty()).count()
    }

    /// Encode every assigned formula; unassigned peaks map to `None`
    pub fn encode_assignments(
        &self,
        registry: &SpeciesRegistry,
    ) -> Result<Vec<Option<AssignedFormula>>, DatasetError> {
        self.formulas
            .iter()
            .map(|formula| {
                if formula.is_empty() {
                    return Ok(None);
                }
                let unsimplified = encode(registry, formula)?;
                Ok(Some(AssignedFormula {
                    unsimplified,
                    simplified: simplify(registry, &unsimplified),
                }))
            })
            .collect()
    }
}
