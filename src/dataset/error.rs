use crate::chemistry::ChemError;

/// Errors that can occur while building or reshaping training data
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reading or writing delimited text
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from the chemistry layer (formula encoding, search)
    #[error("Chemistry error: {0}")]
    ChemError(#[from] ChemError),

    /// Malformed line in a peak list or combo file
    #[error("Malformed input at line {line}: {reason}")]
    FormatError {
        /// 1-based line number in the source file
        line: u64,
        /// What could not be parsed
        reason: String,
    },

    /// Unsupported argument (zero threads, out-of-range fraction, oversized split)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Worker pool could not be created
    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),

    /// A worker panicked while holding the output lock
    #[error("Output sink poisoned by a panicked worker")]
    SinkPoisoned,
}
