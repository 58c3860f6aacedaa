use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::chemistry::{
    compounds_are_equal, find_reagent_ion, get_ppm, CriteriaResult, EncodedCompound, ReagentIon,
};
use crate::features::{assemble, DEFAULT_N_FEATURES};
use crate::search::Resolver;

use super::error::DatasetError;
use super::peak_list::{AssignedFormula, PeakList};
use super::sink::{ComboSink, WorkerBuffer, DEFAULT_FLUSH_THRESHOLD};
use super::stats::BatchStats;

/// Default number of worker threads
pub const DEFAULT_THREADS: usize = 10;

/// Configuration for the combo-file builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Worker threads; the peak list is split into this many chunks
    pub threads: usize,
    /// Bytes a worker buffers before taking the output lock
    pub flush_threshold: usize,
    /// Reagent ion for every peak; inferred per peak from its assignment when unset
    pub reagent_ion: Option<ReagentIon>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            threads: DEFAULT_THREADS,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
            reagent_ion: None,
        }
    }
}

/// Drives the search over a labeled peak list and writes training rows.
///
/// Each candidate of an assigned peak becomes one combo line; the first
/// candidate equal to the assignment is labeled `1`, every other candidate
/// `0`. Peaks where no candidate matches contribute no rows; they go to the
/// unidentified log instead.
pub struct DatasetBuilder<'a> {
    resolver: Resolver<'a>,
    config: BuilderConfig,
}

impl<'a> DatasetBuilder<'a> {
    /// Create a builder
    pub fn new(resolver: Resolver<'a>, config: BuilderConfig) -> Self {
        Self { resolver, config }
    }

    /// Active configuration
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Build the combo file and unidentified log at the given paths.
    ///
    /// Both files are created before any worker starts.
    pub fn create_combo_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        peaks: &PeakList,
        assignments: &[Option<AssignedFormula>],
        combo_path: P,
        unidentified_path: Q,
    ) -> Result<BatchStats, DatasetError> {
        let combo = BufWriter::new(File::create(combo_path.as_ref())?);
        let unidentified = BufWriter::new(File::create(unidentified_path.as_ref())?);

        log::info!(
            "Building combo file {} from {} peaks",
            combo_path.as_ref().display(),
            peaks.len()
        );
        let (stats, _, _) = self.write_combos(peaks, assignments, combo, unidentified)?;
        log::info!("{}", stats);
        Ok(stats)
    }

    /// Build into arbitrary writers and return them once every worker is done
    pub fn write_combos<C, U>(
        &self,
        peaks: &PeakList,
        assignments: &[Option<AssignedFormula>],
        combo: C,
        unidentified: U,
    ) -> Result<(BatchStats, C, U), DatasetError>
    where
        C: Write + Send,
        U: Write + Send,
    {
        if self.config.threads == 0 {
            return Err(DatasetError::InvalidArgument(
                "thread count must be greater than zero".to_string(),
            ));
        }
        if assignments.len() != peaks.len() || peaks.formulas.len() != peaks.mz.len() {
            return Err(DatasetError::InvalidArgument(format!(
                "peak list has {} masses and {} formulas but {} encodings were supplied",
                peaks.mz.len(),
                peaks.formulas.len(),
                assignments.len()
            )));
        }

        let sink = ComboSink::new(combo, unidentified)?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads)
            .build()
            .map_err(|e| DatasetError::ThreadPoolError(e.to_string()))?;

        let chunks = partition(peaks.len(), self.config.threads);
        let per_chunk: Vec<BatchStats> = pool.install(|| {
            chunks
                .into_par_iter()
                .map(|range| self.process_chunk(range, peaks, assignments, &sink))
                .collect::<Result<Vec<_>, DatasetError>>()
        })?;

        let mut stats = BatchStats::default();
        for chunk_stats in per_chunk {
            stats += chunk_stats;
        }

        let (combo, unidentified) = sink.finish()?;
        Ok((stats, combo, unidentified))
    }

    fn process_chunk<C: Write, U: Write>(
        &self,
        range: Range<usize>,
        peaks: &PeakList,
        assignments: &[Option<AssignedFormula>],
        sink: &ComboSink<C, U>,
    ) -> Result<BatchStats, DatasetError> {
        let registry = self.resolver.registry();
        let mut buffer = WorkerBuffer::new(self.config.flush_threshold);
        let mut stats = BatchStats::default();
        let mut peak_rows = String::new();

        for i in range {
            let mz = peaks.mz[i];
            let Some(assigned) = assignments[i] else {
                stats.skipped += 1;
                continue;
            };

            let ion = match self.config.reagent_ion {
                Some(ion) => ion,
                None => match find_reagent_ion(registry, &assigned.unsimplified) {
                    Some(ion) => ion,
                    None => {
                        log::warn!(
                            "Skipping {} at m/z {}: no reagent ion reaches it",
                            peaks.formulas[i],
                            mz
                        );
                        stats.skipped += 1;
                        continue;
                    }
                },
            };

            let candidates = self.resolver.search(mz, ion)?;
            let data = assemble(registry, mz, &candidates, DEFAULT_N_FEATURES)?;

            // Rows of one peak are kept only if the assignment is among them
            peak_rows.clear();
            let mut is_found = false;
            for (j, candidate) in candidates.iter().enumerate() {
                let label = !is_found && compounds_are_equal(&candidate.compound, &assigned.simplified);
                if label {
                    is_found = true;
                    log::debug!("Matched {} at m/z {}", peaks.formulas[i], mz);
                }

                write_combo_row(
                    &mut peak_rows,
                    &data.criteria[j],
                    &data.encoded_compounds[j],
                    data.ppm_errors[j],
                    label,
                );
            }

            if is_found {
                buffer.combo().push_str(&peak_rows);
                stats.rows_written += candidates.len();
                stats.positive_rows += 1;
                stats.negative_rows += candidates.len() - 1;
                stats.identified += 1;
                buffer.maybe_flush(sink)?;
            } else {
                let ppm = get_ppm(mz, assigned.simplified.mass(registry));
                log::warn!(
                    "No candidate matched {} at m/z {} ({:.2} ppm)",
                    peaks.formulas[i],
                    mz,
                    ppm
                );
                writeln!(buffer.unidentified(), "{},{:.6}", peaks.formulas[i], ppm).ok();
                stats.unidentified += 1;
                buffer.maybe_flush(sink)?;
            }
        }

        buffer.flush(sink)?;
        Ok(stats)
    }
}

/// Format one training row: `crit1..crit4,<13 counts>,ppm,label`
pub fn write_combo_row(
    out: &mut String,
    criteria: &CriteriaResult,
    compound: &EncodedCompound,
    ppm: f64,
    label: bool,
) {
    for flag in criteria.mask {
        out.push_str(if flag { "1," } else { "0," });
    }
    for value in compound.to_scaled() {
        write!(out, "{:.6},", value).ok();
    }
    writeln!(out, "{:.6},{}", ppm, u8::from(label)).ok();
}

/// Split `0..total` into `n` contiguous ranges whose sizes differ by at most one
pub fn partition(total: usize, n: usize) -> Vec<Range<usize>> {
    if n == 0 {
        return Vec::new();
    }
    let base = total / n;
    let extra = total % n;

    let mut ranges = Vec::with_capacity(n);
    let mut start = 0;
    for chunk in 0..n {
        let len = base + usize::from(chunk < extra);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_covers_everything() {
        for (total, n) in [(0, 3), (7, 3), (10, 10), (3, 10), (1000, 7)] {
            let ranges = partition(total, n);
            assert_eq!(ranges.len(), n);
            assert_eq!(ranges.first().map(|r| r.start), Some(0));
            assert_eq!(ranges.last().map(|r| r.end), Some(total));
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
            let lens: Vec<usize> = ranges.iter().map(|r| r.len()).collect();
            let min = lens.iter().min().copied().unwrap_or(0);
            let max = lens.iter().max().copied().unwrap_or(0);
            assert!(max - min <= 1);
        }
        assert!(partition(5, 0).is_empty());
    }

    #[test]
    fn test_combo_row_format() {
        let criteria = CriteriaResult {
            mask: [true, false, true, true],
            passed: false,
        };
        let mut compound = EncodedCompound::empty();
        compound.set_count(0, 4);
        compound.set_count(1, 1);

        let mut out = String::new();
        write_combo_row(&mut out, &criteria, &compound, -1.25, true);
        assert_eq!(
            out,
            "1,0,1,1,0.040000,0.010000,0.000000,0.000000,0.000000,0.000000,0.000000,\
             0.000000,0.000000,0.000000,0.000000,0.000000,0.000000,-1.250000,1\n"
        );
    }
}
