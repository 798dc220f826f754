//! Custom error types for lakebench.
//!
//! Explicit enum error types. Library code never returns `Box<dyn Error>`;
//! collaborator errors are wrapped in dedicated variants.

use std::path::PathBuf;

use arrow::error::ArrowError;
use deltalake::datafusion::error::DataFusionError;
use deltalake::DeltaTableError;
use parquet::errors::ParquetError;
use thiserror::Error;

/// Top-level error type for the benchmark harness.
#[derive(Debug, Error)]
pub enum LakeError {
    // =========================================================================
    // Configuration Errors - Fail-Fast on Invalid Config
    // =========================================================================
    #[error("Hard validation error: {0}")]
    HardValidation(#[from] HardValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // Collaborator Errors - Propagated Unchanged
    // =========================================================================
    #[error("Table storage error: {0}")]
    Table(#[from] DeltaTableError),

    #[error("Table query error: {0}")]
    Query(#[from] DataFusionError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    // =========================================================================
    // Key Management Errors
    // =========================================================================
    #[error("Key management error: {0}")]
    Kms(#[from] KmsError),

    // =========================================================================
    // Harness Errors
    // =========================================================================
    #[error("Invalid data file location: {location}")]
    InvalidLocation { location: String },

    #[error("No data files to read")]
    NoDataFiles,

    #[error("Row count mismatch in {context}: expected {expected}, got {actual}")]
    RowCountMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Rows read in {context} differ from the rows written")]
    RowContentMismatch { context: &'static str },

    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Hard validation errors abort the run before any trial starts.
#[derive(Debug, Error)]
pub enum HardValidationError {
    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid range for {field}: {start}..{stop} step {step} - {reason}")]
    InvalidRange {
        field: &'static str,
        start: usize,
        stop: usize,
        step: usize,
        reason: String,
    },

    #[error("Invalid key length for {key_id}: {len} bytes (expected {expected})")]
    InvalidKeyLength {
        key_id: String,
        len: usize,
        expected: usize,
    },

    #[error("Schema validation failed: {message}")]
    SchemaValidation { message: String },
}

/// Key wrapping errors raised by a [`crate::kms::KmsClient`].
#[derive(Debug, Error)]
pub enum KmsError {
    #[error("Unknown master key identifier: {key_id}")]
    UnknownMasterKey { key_id: String },

    #[error("Incorrect master key used: found {master_key:?}, wrapped key {key:?}")]
    IncorrectMasterKey { master_key: Vec<u8>, key: Vec<u8> },

    #[error("Wrapped key is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    #[error("Wrapped key too short: {len} bytes, need at least {min}")]
    TruncatedKey { len: usize, min: usize },

    #[error("Invalid key material: {reason}")]
    InvalidKeyMaterial { reason: String },
}

/// Result type alias using LakeError.
pub type LakeResult<T> = Result<T, LakeError>;
