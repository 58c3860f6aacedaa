//! Entry points around an external candidate scoring model.
//!
//! The model itself is not part of this crate. It is injected through
//! [`CandidateScorer`], which receives the feature matrix built by
//! [`preprocess`] and returns one score in `[0, 1]` per row. [`postprocess`]
//! ranks the candidates by those scores.

use ndarray::{s, Array2};
use serde::Serialize;

use crate::chemistry::{
    decode, simplify, ChemError, EncodedCompound, ReagentIon, SpeciesRegistry, N_CRITERIA,
};
use crate::features::{mz_to_data, DEFAULT_N_FEATURES};
use crate::search::Resolver;

/// Errors raised around model scoring
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// Error from the chemistry layer
    #[error("Chemistry error: {0}")]
    ChemError(#[from] ChemError),

    /// The scoring model failed
    #[error("Scorer error: {0}")]
    ScorerError(String),

    /// Scores and candidates do not line up
    #[error("Shape mismatch: expected {expected} rows, got {actual}")]
    ShapeError {
        /// Number of candidate rows
        expected: usize,
        /// Number of values supplied
        actual: usize,
    },
}

/// A model that scores feature rows
pub trait CandidateScorer {
    /// One score per row of `features`
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<f64>, InferenceError>;
}

impl<F> CandidateScorer for F
where
    F: Fn(&Array2<f64>) -> Result<Vec<f64>, InferenceError>,
{
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<f64>, InferenceError> {
        self(features)
    }
}

/// Candidates of several peaks stacked into one model input
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedBatch {
    /// Feature rows of every peak, in peak order
    pub features: Array2<f64>,
    /// Unsimplified compound of each row
    pub encoded_compounds: Vec<EncodedCompound>,
    /// ppm error of each row
    pub ppm_errors: Vec<f64>,
    /// Index into the input masses of the peak each row came from
    pub peak_index: Vec<usize>,
    /// Criteria flags of each row as 0.0 / 1.0
    pub criteria: Vec<[f64; N_CRITERIA]>,
}

impl PreprocessedBatch {
    /// Number of candidate rows
    pub fn len(&self) -> usize {
        self.encoded_compounds.len()
    }

    /// True when no peak produced a candidate
    pub fn is_empty(&self) -> bool {
        self.encoded_compounds.is_empty()
    }
}

/// One scored candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    /// Model score as a percentage
    pub score: f64,
    /// Purely elemental formula
    pub formula: String,
    /// Formula with polyatomic groups factored in
    pub unsimplified_formula: String,
    /// ppm error against the observed mass
    pub ppm_error: f64,
    /// Unsimplified compound
    pub compound: EncodedCompound,
}

/// Build the stacked feature matrix for a batch of observed masses
pub fn preprocess(
    resolver: &Resolver<'_>,
    mz_values: &[f64],
    ion: ReagentIon,
) -> Result<PreprocessedBatch, InferenceError> {
    let per_peak = mz_values
        .iter()
        .map(|&mz| mz_to_data(resolver, mz, ion, DEFAULT_N_FEATURES))
        .collect::<Result<Vec<_>, _>>()?;

    let total_rows: usize = per_peak.iter().map(|data| data.len()).sum();
    let mut batch = PreprocessedBatch {
        features: Array2::zeros((total_rows, DEFAULT_N_FEATURES)),
        encoded_compounds: Vec::with_capacity(total_rows),
        ppm_errors: Vec::with_capacity(total_rows),
        peak_index: Vec::with_capacity(total_rows),
        criteria: Vec::with_capacity(total_rows),
    };

    let mut start = 0;
    for (peak, data) in per_peak.into_iter().enumerate() {
        let end = start + data.len();
        batch
            .features
            .slice_mut(s![start..end, ..])
            .assign(&data.features);
        batch.peak_index.extend(std::iter::repeat(peak).take(data.len()));
        batch
            .criteria
            .extend(data.criteria.iter().map(|result| result.as_features()));
        batch.encoded_compounds.extend(data.encoded_compounds);
        batch.ppm_errors.extend(data.ppm_errors);
        start = end;
    }

    log::debug!(
        "Preprocessed {} masses into {} candidate rows",
        mz_values.len(),
        total_rows
    );
    Ok(batch)
}

/// Rank candidates by descending score and decode their formulas.
///
/// Ties keep their input order. Scores are reported multiplied by 100.
pub fn postprocess(
    registry: &SpeciesRegistry,
    scores: &[f64],
    encoded_compounds: &[EncodedCompound],
    ppm_errors: &[f64],
) -> Result<Vec<RankedCandidate>, InferenceError> {
    for actual in [scores.len(), ppm_errors.len()] {
        if actual != encoded_compounds.len() {
            return Err(InferenceError::ShapeError {
                expected: encoded_compounds.len(),
                actual,
            });
        }
    }

    let mut ranked: Vec<RankedCandidate> = scores
        .iter()
        .zip(encoded_compounds)
        .zip(ppm_errors)
        .map(|((&score, compound), &ppm_error)| RankedCandidate {
            score: score * 100.0,
            formula: decode(registry, &simplify(registry, compound)),
            unsimplified_formula: decode(registry, compound),
            ppm_error,
            compound: *compound,
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(ranked)
}

/// Preprocess, score and rank a batch of masses as one model call
pub fn score_batch<S: CandidateScorer + ?Sized>(
    resolver: &Resolver<'_>,
    scorer: &S,
    mz_values: &[f64],
    ion: ReagentIon,
) -> Result<Vec<RankedCandidate>, InferenceError> {
    let batch = preprocess(resolver, mz_values, ion)?;
    if batch.is_empty() {
        return Ok(Vec::new());
    }
    let scores = scorer.predict(&batch.features)?;
    postprocess(
        resolver.registry(),
        &scores,
        &batch.encoded_compounds,
        &batch.ppm_errors,
    )
}

/// Rank the candidates of a single observed mass
pub fn score_peak<S: CandidateScorer + ?Sized>(
    resolver: &Resolver<'_>,
    scorer: &S,
    mz: f64,
    ion: ReagentIon,
) -> Result<Vec<RankedCandidate>, InferenceError> {
    score_batch(resolver, scorer, &[mz], ion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::encode;

    /// Scores rows by how many criteria they pass
    fn criteria_scorer(features: &Array2<f64>) -> Result<Vec<f64>, InferenceError> {
        Ok(features
            .rows()
            .into_iter()
            .map(|row| row.iter().take(N_CRITERIA).sum::<f64>() / N_CRITERIA as f64)
            .collect())
    }

    #[test]
    fn test_preprocess_stacks_peaks() -> Result<(), InferenceError> {
        let registry = SpeciesRegistry::new();
        let resolver = Resolver::new(&registry);
        let masses = [46.0419, 0.5, 32.0262];

        let batch = preprocess(&resolver, &masses, ReagentIon::Ammonium)?;
        assert_eq!(batch.features.nrows(), batch.len());
        assert_eq!(batch.peak_index.len(), batch.len());
        assert_eq!(batch.criteria.len(), batch.len());
        assert!(!batch.peak_index.contains(&1));
        assert!(batch.peak_index.windows(2).all(|w| w[0] <= w[1]));

        for (row_idx, row) in batch.features.rows().into_iter().enumerate() {
            assert_eq!(row[DEFAULT_N_FEATURES - 1], batch.ppm_errors[row_idx]);
            for k in 0..N_CRITERIA {
                assert_eq!(row[k], batch.criteria[row_idx][k]);
            }
        }
        Ok(())
    }

    #[test]
    fn test_postprocess_orders_by_score() -> Result<(), InferenceError> {
        let registry = SpeciesRegistry::new();
        let compounds = vec![
            encode(&registry, "C2H6O")?,
            encode(&registry, "(NH4)CH2")?,
            encode(&registry, "CH4")?,
        ];
        let ranked = postprocess(&registry, &[0.2, 0.9, 0.5], &compounds, &[1.0, 2.0, 3.0])?;

        let expected = [90.0, 50.0, 20.0];
        for (candidate, score) in ranked.iter().zip(expected) {
            assert!((candidate.score - score).abs() < 1e-9);
        }
        assert_eq!(ranked[0].unsimplified_formula, "CH2(NH4)");
        assert_eq!(ranked[0].formula, "CH6N");
        assert_eq!(ranked[0].ppm_error, 2.0);
        assert_eq!(ranked[2].formula, "C2H6O");
        Ok(())
    }

    #[test]
    fn test_postprocess_shape_mismatch() {
        let registry = SpeciesRegistry::new();
        let compounds = vec![EncodedCompound::empty(); 2];
        assert!(matches!(
            postprocess(&registry, &[0.1], &compounds, &[0.0, 0.0]),
            Err(InferenceError::ShapeError {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_score_peak() -> Result<(), InferenceError> {
        let registry = SpeciesRegistry::new();
        let resolver = Resolver::new(&registry);

        let ranked = score_peak(&resolver, &criteria_scorer, 46.0419, ReagentIon::Ammonium)?;
        assert!(!ranked.is_empty());
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(ranked.iter().all(|r| (0.0..=100.0).contains(&r.score)));

        let none = score_peak(&resolver, &criteria_scorer, 0.5, ReagentIon::Ammonium)?;
        assert!(none.is_empty());
        Ok(())
    }

    #[test]
    fn test_scorer_row_count_checked() {
        let registry = SpeciesRegistry::new();
        let resolver = Resolver::new(&registry);
        let off_by_one = |features: &Array2<f64>| -> Result<Vec<f64>, InferenceError> {
            Ok(vec![0.5; features.nrows() + 1])
        };

        let result = score_peak(&resolver, &off_by_one, 60.0211, ReagentIon::Ammonium);
        assert!(matches!(result, Err(InferenceError::ShapeError { .. })));
    }
}
