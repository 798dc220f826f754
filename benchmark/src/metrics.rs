// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Result types for sweep trials and encryption scenarios.
//!
//! Durations are stored as seconds in `f64`, the unit the CSV report uses.

use std::time::Duration;

use chrono::{DateTime, Utc};
use lakebench_core::TrialParams;
use serde::{Deserialize, Serialize};
use sysinfo::System;

/// One row of the sweep result table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    /// Position of the trial in execution order
    pub trial: usize,
    pub nrows: usize,
    pub ncols: usize,
    pub nappend: usize,
    /// Data files referenced by the table after the last append
    pub nfiles: usize,
    /// Rows returned by each read mode
    pub rows_read: usize,
    /// Native read through the transaction log, in seconds
    pub time_delta: f64,
    /// Direct read of the data files, in seconds
    pub time_pq: f64,
}

impl TrialResult {
    pub fn new(
        trial: usize,
        params: &TrialParams,
        nfiles: usize,
        rows_read: usize,
        time_delta: Duration,
        time_pq: Duration,
    ) -> Self {
        Self {
            trial,
            nrows: params.shape.nrows(),
            ncols: params.shape.ncols(),
            nappend: params.nappend,
            nfiles,
            rows_read,
            time_delta: time_delta.as_secs_f64(),
            time_pq: time_pq.as_secs_f64(),
        }
    }

    /// Direct read time relative to native read time.
    pub fn direct_ratio(&self) -> Option<f64> {
        (self.time_delta > 0.0).then(|| self.time_pq / self.time_delta)
    }
}

/// Encrypted table write and read-back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaEncryptionOutcome {
    pub nrows: usize,
    pub ncols: usize,
    pub nappend: usize,
    pub nfiles: usize,
    /// Data files whose footer is encrypted
    pub encrypted_files: usize,
    pub rows_read: usize,
    /// Read time in seconds, decrypting when the files are encrypted
    pub time_read: f64,
}

impl DeltaEncryptionOutcome {
    /// True when the table writer honoured the encryption properties.
    pub fn encrypted_at_rest(&self) -> bool {
        self.nfiles > 0 && self.encrypted_files == self.nfiles
    }
}

/// Cost of decrypting a standalone Parquet file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParquetEncryptionOverhead {
    pub nrows: usize,
    pub ncols: usize,
    pub time_encrypted: f64,
    pub time_plain: f64,
    /// Encrypted read time as a percentage of plain read time
    pub pct: f64,
}

impl ParquetEncryptionOverhead {
    pub fn new(nrows: usize, ncols: usize, encrypted: Duration, plain: Duration) -> Self {
        let time_encrypted = encrypted.as_secs_f64();
        let time_plain = plain.as_secs_f64();
        let pct = if time_plain > 0.0 {
            time_encrypted / time_plain * 100.0
        } else {
            f64::NAN
        };
        Self {
            nrows,
            ncols,
            time_encrypted,
            time_plain,
            pct,
        }
    }
}

/// Format a duration in human-readable form (auto-selects ns/μs/ms/s).
pub fn format_duration(duration: Duration) -> String {
    let ns = duration.as_nanos();
    if ns < 1_000 {
        format!("{}ns", ns)
    } else if ns < 1_000_000 {
        format!("{:.2}μs", ns as f64 / 1_000.0)
    } else if ns < 1_000_000_000 {
        format!("{:.2}ms", ns as f64 / 1_000_000.0)
    } else {
        format!("{:.2}s", ns as f64 / 1_000_000_000.0)
    }
}

/// Format seconds as stored in result rows.
pub fn format_secs(secs: f64) -> String {
    format_duration(Duration::from_secs_f64(secs.max(0.0)))
}

/// System information captured at benchmark time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system name
    pub os: String,
    /// OS version
    pub os_version: String,
    /// Kernel version (Linux)
    pub kernel_version: Option<String>,
    /// CPU model name
    pub cpu_model: String,
    /// Number of CPU cores
    pub cpu_cores: usize,
    /// Total system memory in bytes
    pub memory_bytes: u64,
    /// Hostname
    pub hostname: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Everything one run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Suite identifier
    pub benchmark_suite: String,
    /// Framework version
    pub version: String,
    /// Timestamp when benchmarks were run
    pub timestamp: DateTime<Utc>,
    /// System information
    pub system_info: SystemInfo,
    /// Seed of the data generator, when fixed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default)]
    pub trials: Vec<TrialResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_encryption: Option<DeltaEncryptionOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parquet_encryption: Option<ParquetEncryptionOverhead>,
}

impl BenchmarkReport {
    /// Create a new benchmark report.
    pub fn new() -> Self {
        Self {
            benchmark_suite: "lakebench".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            system_info: SystemInfo::collect(),
            seed: None,
            trials: Vec::new(),
            delta_encryption: None,
            parquet_encryption: None,
        }
    }

    /// Short label for file names: which scenarios this report holds.
    pub fn label(&self) -> &'static str {
        let encryption = self.delta_encryption.is_some() || self.parquet_encryption.is_some();
        match (self.trials.is_empty(), encryption) {
            (false, false) => "sweep",
            (true, true) => "encryption",
            _ => "mixed",
        }
    }
}

impl Default for BenchmarkReport {
    fn default() -> Self {
        Self::new()
    }
}
