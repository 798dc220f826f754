// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Lakebench Benchmarking Framework
//!
//! Measures what the transaction log costs when reading a Delta table, and
//! what Parquet modular encryption costs when reading columnar files.
//!
//! # Scenarios
//!
//! - **Sweep**: native table read vs direct data-file read over a grid of
//!   column counts and append counts
//! - **Delta encryption**: encrypted table writes, read back with decryption
//! - **Parquet encryption**: encrypted vs plain read of one standalone file
//!
//! # Data Output
//!
//! The sweep table is written as CSV; full runs are also saved as JSON with
//! system information attached.

pub mod encryption;
pub mod harness;
pub mod metrics;
pub mod reporter;
pub mod sweep;

pub use encryption::{run_delta_encrypt, run_parquet_encrypt};
pub use harness::{measure, measure_async};
pub use metrics::{
    BenchmarkReport, DeltaEncryptionOutcome, ParquetEncryptionOverhead, SystemInfo, TrialResult,
};
pub use reporter::{CsvReporter, JsonReporter};
pub use sweep::{run_sweep, run_trial};
