use std::fmt;
use std::ops::AddAssign;

/// Statistics from a completed combo-file build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Training rows written to the combo output
    pub rows_written: usize,
    /// Rows labeled `1`
    pub positive_rows: usize,
    /// Rows labeled `0`
    pub negative_rows: usize,
    /// Assigned peaks for which a candidate matched the assignment
    pub identified: usize,
    /// Assigned peaks with no matching candidate (written to the unidentified log)
    pub unidentified: usize,
    /// Peaks without an assignment or without a compatible reagent ion
    pub skipped: usize,
}

impl AddAssign for BatchStats {
    fn add_assign(&mut self, other: Self) {
        self.rows_written += other.rows_written;
        self.positive_rows += other.positive_rows;
        self.negative_rows += other.negative_rows;
        self.identified += other.identified;
        self.unidentified += other.unidentified;
        self.skipped += other.skipped;
    }
}

impl fmt::Display for BatchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Wrote {} rows ({} positive, {} negative); {} identified, {} unidentified, {} skipped",
            self.rows_written,
            self.positive_rows,
            self.negative_rows,
            self.identified,
            self.unidentified,
            self.skipped
        )
    }
}

/// Positive/negative row counts of a labeled dataset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelBalance {
    /// Rows labeled `1`
    pub positives: usize,
    /// Rows labeled `0`
    pub negatives: usize,
}

impl LabelBalance {
    /// Total rows
    pub fn total(&self) -> usize {
        self.positives + self.negatives
    }

    /// Share of positive rows, 0.0 for an empty dataset
    pub fn positive_fraction(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.positives as f64 / self.total() as f64
        }
    }
}

impl fmt::Display for LabelBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} positive, {} negative ({:.2}% positive)",
            self.positives,
            self.negatives,
            self.positive_fraction() * 100.0
        )
    }
}

/// Rows kept and dropped by negative-sample reduction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReductionStats {
    /// Positive rows (always kept)
    pub positives: usize,
    /// Negative rows kept
    pub negatives_kept: usize,
    /// Negative rows dropped
    pub negatives_dropped: usize,
}

impl fmt::Display for ReductionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Kept {} positive and {} negative rows, dropped {} negative rows",
            self.positives, self.negatives_kept, self.negatives_dropped
        )
    }
}

/// Sizes of a train/test split
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitStats {
    /// Label balance of the test file
    pub test: LabelBalance,
    /// Label balance of the train file
    pub train: LabelBalance,
}

impl fmt::Display for SplitStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "test: {}; train: {}", self.test, self.train)
    }
}
