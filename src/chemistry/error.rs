/// Errors raised by the chemistry layer (registry lookups, formula codec,
/// fixed-point vector handling and the resolver)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ChemError {
    /// Malformed formula string or non-numeric count
    #[error("Malformed formula '{formula}': {reason}")]
    FormatError {
        /// The offending formula text
        formula: String,
        /// What went wrong while scanning it
        reason: String,
    },

    /// Vector or row length does not match the fixed species count
    #[error("Shape mismatch: expected {expected} values, got {actual}")]
    ShapeError {
        /// Required length
        expected: usize,
        /// Length that was supplied
        actual: usize,
    },

    /// Unknown chemical symbol
    #[error("Unknown chemical symbol: {0}")]
    LookupError(String),

    /// Argument outside the supported domain (reagent ion name, mass, width)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ChemError {
    pub(crate) fn format(formula: &str, reason: impl Into<String>) -> Self {
        Self::FormatError {
            formula: formula.to_string(),
            reason: reason.into(),
        }
    }
}
