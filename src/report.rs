use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::dispatch::{BenchResult, RunSummary};
use crate::error::ReportError;

/// One CSV line.
#[derive(Debug, Serialize)]
struct ReportRow<'r> {
    timestamp: String,
    backend: &'r str,
    benchmark: &'r str,
    num: usize,
    value_size: usize,
    elapsed_ms: u64,
    ops_per_sec: String,
    success: bool,
}

impl<'r> ReportRow<'r> {
    fn new(backend: &'r str, result: &'r BenchResult) -> Self {
        ReportRow {
            timestamp: result.finished_at.to_rfc3339(),
            backend,
            benchmark: result.name,
            num: result.num,
            value_size: result.value_size,
            elapsed_ms: result.elapsed_ms,
            ops_per_sec: format!("{:.2}", result.ops_per_sec()),
            success: result.success,
        }
    }
}

/// Writes benchmark results as CSV, one row per executed benchmark.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
    backend: String,
}

impl ReportWriter<File> {
    /// Creates (or truncates) the report file at `path`.
    pub fn create(
        path: impl AsRef<Path>,
        backend: impl Into<String>,
    ) -> Result<Self, ReportError> {
        let file = File::create(path)?;
        Ok(Self::from_writer(file, backend))
    }
}

impl<W: Write> ReportWriter<W> {
    pub fn from_writer(writer: W, backend: impl Into<String>) -> Self {
        ReportWriter {
            writer: csv::Writer::from_writer(writer),
            backend: backend.into(),
        }
    }

    pub fn write_result(&mut self, result: &BenchResult) -> Result<(), ReportError> {
        self.writer.serialize(ReportRow::new(&self.backend, result))?;
        Ok(())
    }

    pub fn write_summary(&mut self, summary: &RunSummary) -> Result<(), ReportError> {
        for result in summary.results() {
            self.write_result(result)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W, ReportError> {
        self.writer
            .into_inner()
            .map_err(|e| ReportError::Io(e.into_error()))
    }
}
