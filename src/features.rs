//! Per-candidate feature rows.
//!
//! Every candidate produced by the resolver becomes one row of
//! `[4 criteria flags][13 scaled unsimplified counts][zero padding][ppm error]`.
//! The ppm error always occupies the last column, whatever the width.

use ndarray::Array2;

use crate::chemistry::{
    check_criteria, unsimplify, ChemError, CriteriaResult, EncodedCompound, ReagentIon,
    SpeciesRegistry, N_CRITERIA, TOTAL_SPECIES,
};
use crate::search::{CandidatePermutation, Resolver};

/// Default feature row width
pub const DEFAULT_N_FEATURES: usize = N_CRITERIA + TOTAL_SPECIES + 1;

/// Column holding the first scaled species count
pub const COUNTS_OFFSET: usize = N_CRITERIA;

/// Feature rows for the candidates of one observed mass
#[derive(Debug, Clone, PartialEq)]
pub struct MsData {
    /// One row per candidate, `n_features` columns
    pub features: Array2<f64>,
    /// Unsimplified candidate compounds, aligned with the rows
    pub encoded_compounds: Vec<EncodedCompound>,
    /// ppm error of each candidate against the observed mass
    pub ppm_errors: Vec<f64>,
    /// Criteria evaluated on each unsimplified candidate
    pub criteria: Vec<CriteriaResult>,
}

impl MsData {
    /// Empty result with `n_features` columns
    pub fn empty(n_features: usize) -> Self {
        Self {
            features: Array2::zeros((0, n_features)),
            encoded_compounds: Vec::new(),
            ppm_errors: Vec::new(),
            criteria: Vec::new(),
        }
    }

    /// Number of candidate rows
    pub fn len(&self) -> usize {
        self.encoded_compounds.len()
    }

    /// True if no candidate was found
    pub fn is_empty(&self) -> bool {
        self.encoded_compounds.is_empty()
    }
}

/// Search `mz` under `ion` and assemble one feature row per candidate.
///
/// # Examples
///
/// ```
/// use mzresolve::chemistry::{ReagentIon, SpeciesRegistry};
/// use mzresolve::features::{mz_to_data, DEFAULT_N_FEATURES};
/// use mzresolve::search::Resolver;
///
/// let registry = SpeciesRegistry::new();
/// let resolver = Resolver::new(&registry);
/// let data = mz_to_data(&resolver, 46.0419, ReagentIon::Ammonium, DEFAULT_N_FEATURES)?;
/// assert_eq!(data.features.ncols(), 18);
/// assert_eq!(data.features.nrows(), data.ppm_errors.len());
/// # Ok::<(), mzresolve::chemistry::ChemError>(())
/// ```
pub fn mz_to_data(
    resolver: &Resolver<'_>,
    mz: f64,
    ion: ReagentIon,
    n_features: usize,
) -> Result<MsData, ChemError> {
    check_width(n_features)?;
    let candidates = resolver.search(mz, ion)?;
    assemble(resolver.registry(), mz, &candidates, n_features)
}

/// Assemble feature rows from already enumerated candidates
pub fn assemble(
    registry: &SpeciesRegistry,
    mz: f64,
    candidates: &[CandidatePermutation],
    n_features: usize,
) -> Result<MsData, ChemError> {
    check_width(n_features)?;
    if candidates.is_empty() {
        return Ok(MsData::empty(n_features));
    }

    let mut features = Array2::zeros((candidates.len(), n_features));
    let mut encoded_compounds = Vec::with_capacity(candidates.len());
    let mut ppm_errors = Vec::with_capacity(candidates.len());
    let mut criteria = Vec::with_capacity(candidates.len());

    for (row_idx, candidate) in candidates.iter().enumerate() {
        let unsimplified = unsimplify(registry, &candidate.compound);
        let result = check_criteria(registry, &unsimplified);
        let ppm = candidate.ppm_error(mz);

        let mut row = features.row_mut(row_idx);
        for (k, flag) in result.as_features().into_iter().enumerate() {
            row[k] = flag;
        }
        for (k, value) in unsimplified.to_scaled().into_iter().enumerate() {
            row[COUNTS_OFFSET + k] = value;
        }
        row[n_features - 1] = ppm;

        encoded_compounds.push(unsimplified);
        ppm_errors.push(ppm);
        criteria.push(result);
    }

    Ok(MsData {
        features,
        encoded_compounds,
        ppm_errors,
        criteria,
    })
}

fn check_width(n_features: usize) -> Result<(), ChemError> {
    if n_features < DEFAULT_N_FEATURES {
        return Err(ChemError::InvalidArgument(format!(
            "n_features must be at least {}, got {}",
            DEFAULT_N_FEATURES, n_features
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::{encode, scaled_to_count, simplify};

    #[test]
    fn test_row_layout() -> Result<(), ChemError> {
        let registry = SpeciesRegistry::new();
        let resolver = Resolver::new(&registry);
        let mz = encode(&registry, "C2H8N")?.mass(&registry);

        let data = mz_to_data(&resolver, mz, ReagentIon::Ammonium, DEFAULT_N_FEATURES)?;
        assert!(!data.is_empty());
        assert_eq!(data.features.nrows(), data.len());
        assert_eq!(data.criteria.len(), data.len());

        for (row_idx, row) in data.features.rows().into_iter().enumerate() {
            let criteria = &data.criteria[row_idx];
            for k in 0..N_CRITERIA {
                assert_eq!(row[k] == 1.0, criteria.mask[k]);
            }
            let compound = &data.encoded_compounds[row_idx];
            for k in 0..TOTAL_SPECIES {
                assert_eq!(scaled_to_count(row[COUNTS_OFFSET + k]), compound.count(k));
            }
            assert_eq!(row[DEFAULT_N_FEATURES - 1], data.ppm_errors[row_idx]);
        }

        // C2H8N is found and factored into C2H4(NH4)
        let expected = encode(&registry, "C2H4(NH4)")?;
        assert!(data.encoded_compounds.contains(&expected));
        assert_eq!(simplify(&registry, &expected), encode(&registry, "C2H8N")?);

        Ok(())
    }

    #[test]
    fn test_wide_rows_keep_ppm_last() -> Result<(), ChemError> {
        let registry = SpeciesRegistry::new();
        let resolver = Resolver::new(&registry);
        let data = mz_to_data(&resolver, 46.0419, ReagentIon::Ammonium, 24)?;
        assert_eq!(data.features.ncols(), 24);
        for (row_idx, row) in data.features.rows().into_iter().enumerate() {
            assert_eq!(row[23], data.ppm_errors[row_idx]);
            for k in (N_CRITERIA + TOTAL_SPECIES)..23 {
                assert_eq!(row[k], 0.0);
            }
        }
        Ok(())
    }

    #[test]
    fn test_empty_result_keeps_width() -> Result<(), ChemError> {
        let registry = SpeciesRegistry::new();
        let resolver = Resolver::new(&registry);
        let data = mz_to_data(&resolver, 0.5, ReagentIon::Ammonium, DEFAULT_N_FEATURES)?;
        assert!(data.is_empty());
        assert_eq!(data.features.dim(), (0, DEFAULT_N_FEATURES));
        Ok(())
    }

    #[test]
    fn test_narrow_width_rejected() {
        let registry = SpeciesRegistry::new();
        let resolver = Resolver::new(&registry);
        assert!(matches!(
            mz_to_data(&resolver, 46.0, ReagentIon::Ammonium, 17),
            Err(ChemError::InvalidArgument(_))
        ));
    }
}
