use std::io::Write;
use std::sync::Mutex;

use super::error::DatasetError;

/// Header line of the unidentified-assignment log
pub const UNIDENTIFIED_HEADER: &str = "Compound,PPM";

/// Default per-worker buffer size before a flush, in bytes
pub const DEFAULT_FLUSH_THRESHOLD: usize = 1 << 10;

struct Streams<C, U> {
    combo: C,
    unidentified: U,
}

/// Combo output and unidentified log behind one lock.
///
/// Workers never write directly; they hand over whole buffered chunks so the
/// lock is taken once per flush.
pub struct ComboSink<C: Write, U: Write> {
    streams: Mutex<Streams<C, U>>,
}

impl<C: Write, U: Write> ComboSink<C, U> {
    /// Wrap the two streams and write the unidentified-log header
    pub fn new(combo: C, mut unidentified: U) -> Result<Self, DatasetError> {
        writeln!(unidentified, "{}", UNIDENTIFIED_HEADER)?;
        Ok(Self {
            streams: Mutex::new(Streams {
                combo,
                unidentified,
            }),
        })
    }

    /// Append buffered text to both streams under the lock
    pub fn write_chunk(&self, combo: &str, unidentified: &str) -> Result<(), DatasetError> {
        if combo.is_empty() && unidentified.is_empty() {
            return Ok(());
        }
        let mut streams = self.streams.lock().map_err(|_| DatasetError::SinkPoisoned)?;
        streams.combo.write_all(combo.as_bytes())?;
        streams.unidentified.write_all(unidentified.as_bytes())?;
        Ok(())
    }

    /// Flush both streams and hand them back
    pub fn finish(self) -> Result<(C, U), DatasetError> {
        let mut streams = self
            .streams
            .into_inner()
            .map_err(|_| DatasetError::SinkPoisoned)?;
        streams.combo.flush()?;
        streams.unidentified.flush()?;
        Ok((streams.combo, streams.unidentified))
    }
}

/// Worker-local text buffers, handed to a [`ComboSink`] once they grow past
/// the threshold
pub(crate) struct WorkerBuffer {
    combo: String,
    unidentified: String,
    threshold: usize,
}

impl WorkerBuffer {
    pub(crate) fn new(threshold: usize) -> Self {
        Self {
            combo: String::with_capacity(threshold * 2),
            unidentified: String::new(),
            threshold,
        }
    }

    pub(crate) fn combo(&mut self) -> &mut String {
        &mut self.combo
    }

    pub(crate) fn unidentified(&mut self) -> &mut String {
        &mut self.unidentified
    }

    pub(crate) fn buffered_len(&self) -> usize {
        self.combo.len() + self.unidentified.len()
    }

    /// Flush only if the buffered text exceeds the threshold
    pub(crate) fn maybe_flush<C: Write, U: Write>(
        &mut self,
        sink: &ComboSink<C, U>,
    ) -> Result<(), DatasetError> {
        if self.buffered_len() > self.threshold {
            self.flush(sink)?;
        }
        Ok(())
    }

    pub(crate) fn flush<C: Write, U: Write>(
        &mut self,
        sink: &ComboSink<C, U>,
    ) -> Result<(), DatasetError> {
        sink.write_chunk(&self.combo, &self.unidentified)?;
        self.combo.clear();
        self.unidentified.clear();
        Ok(())
    }
}
