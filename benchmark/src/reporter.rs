// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Report generation for benchmark results.
//!
//! The sweep table goes to stdout and to a CSV file. Full reports, including
//! encryption outcomes and system information, are saved as timestamped JSON.

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;

use crate::metrics::{format_secs, BenchmarkReport, TrialResult};

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReporterError {
    #[error("Failed to write report file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to write CSV report: {0}")]
    Csv(#[from] csv::Error),
}

/// CSV reporter for the sweep result table.
pub struct CsvReporter {
    path: PathBuf,
}

impl CsvReporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a header row and one row per trial, replacing any previous file.
    pub fn save(&self, trials: &[TrialResult]) -> Result<&Path, ReporterError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(&self.path)?;
        for trial in trials {
            writer.serialize(trial)?;
        }
        writer.flush()?;

        Ok(&self.path)
    }

    /// Load a previously written result table.
    pub fn load(path: impl AsRef<Path>) -> Result<Vec<TrialResult>, ReporterError> {
        let mut reader = csv::Reader::from_path(path)?;
        let trials = reader.deserialize().collect::<Result<Vec<_>, _>>()?;
        Ok(trials)
    }
}

/// Render the result table for a terminal.
pub fn render_trials(trials: &[TrialResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5} {:>8} {:>5} {:>7} {:>6} {:>9} {:>12} {:>12} {:>7}",
        "trial", "nrows", "ncols", "nappend", "nfiles", "rows_read", "time_delta", "time_pq", "pq/dl"
    );
    for t in trials {
        let ratio = t
            .direct_ratio()
            .map(|r| format!("{:.2}", r))
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            out,
            "{:>5} {:>8} {:>5} {:>7} {:>6} {:>9} {:>12} {:>12} {:>7}",
            t.trial,
            t.nrows,
            t.ncols,
            t.nappend,
            t.nfiles,
            t.rows_read,
            format_secs(t.time_delta),
            format_secs(t.time_pq),
            ratio
        );
    }
    out
}

/// Print the result table to stdout.
pub fn print_trials(trials: &[TrialResult]) {
    print!("{}", render_trials(trials));
}

/// JSON reporter for full benchmark reports.
pub struct JsonReporter {
    /// Output directory for benchmark data
    output_dir: PathBuf,
}

impl JsonReporter {
    /// Create a new JSON reporter with the specified output directory.
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, ReporterError> {
        let output_dir = output_dir.as_ref().to_path_buf();
        fs::create_dir_all(&output_dir)?;
        Ok(Self { output_dir })
    }

    /// Save a benchmark report to a JSON file.
    ///
    /// Returns the path to the created file.
    pub fn save(&self, report: &BenchmarkReport) -> Result<PathBuf, ReporterError> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%SZ");
        let filename = format!("{}_{}.json", report.label(), timestamp);
        let filepath = self.output_dir.join(&filename);

        let file = File::create(&filepath)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, report)?;

        Ok(filepath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use lakebench_core::{DataShape, TrialParams};
    use tempfile::TempDir;

    fn trials() -> Vec<TrialResult> {
        (0..3)
            .map(|i| {
                let params = TrialParams::new(DataShape::new(10, 20 * (i + 1)).unwrap(), 1);
                TrialResult::new(
                    i,
                    &params,
                    2,
                    20,
                    Duration::from_millis(12),
                    Duration::from_millis(4),
                )
            })
            .collect()
    }

    #[test]
    fn test_csv_header_and_rows() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = CsvReporter::new(temp_dir.path().join("nested/delta_benchmark.csv"));

        let path = reporter.save(&trials()).unwrap();
        let content = fs::read_to_string(path).unwrap();
        let mut lines = content.lines();

        assert_eq!(
            lines.next().unwrap(),
            "trial,nrows,ncols,nappend,nfiles,rows_read,time_delta,time_pq"
        );
        assert_eq!(lines.count(), 3);
    }

    #[test]
    fn test_csv_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = CsvReporter::new(temp_dir.path().join("delta_benchmark.csv"));
        reporter.save(&trials()).unwrap();

        let loaded = CsvReporter::load(reporter.path()).unwrap();
        assert_eq!(loaded, trials());
    }

    #[test]
    fn test_csv_write_failure_propagates() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the file should go.
        let reporter = CsvReporter::new(temp_dir.path());
        assert!(reporter.save(&trials()).is_err());
    }

    #[test]
    fn test_render_trials() {
        let table = render_trials(&trials());
        assert!(table.starts_with("trial"));
        assert_eq!(table.lines().count(), 4);
        assert!(table.contains("12.00ms"));
        // 4ms direct against 12ms native.
        assert!(table.lines().nth(1).unwrap().trim_end().ends_with("0.33"));
    }

    #[test]
    fn test_json_report_saved() {
        let temp_dir = TempDir::new().unwrap();
        let reporter = JsonReporter::new(temp_dir.path()).unwrap();

        let mut report = BenchmarkReport::new();
        report.trials = trials();

        let path = reporter.save(&report).unwrap();
        assert!(path.exists());
        assert!(path
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("sweep_"));

        let loaded: BenchmarkReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.trials, report.trials);
    }
}
