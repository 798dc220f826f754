//! Lakebench Core Library
//!
//! Building blocks for benchmarking a transaction-logged table format
//! against reading its columnar data files directly. Provides workspace
//! management, synthetic data, table and file drivers, envelope encryption
//! with an in-memory key service, and strict YAML configuration.

pub mod columnar;
pub mod config;
pub mod crypto;
pub mod datagen;
pub mod error;
pub mod kms;
pub mod table;
pub mod types;
pub mod verify;
pub mod workspace;

// Re-export commonly used types
pub use columnar::{read_direct, ColumnarReader, FileProtection, ParquetFileReader};
pub use config::{BenchConfig, ConfigLoader, EncryptionSettings, SweepConfig, SweepRange};
pub use crypto::{CryptoFactory, DecryptionConfiguration, EncryptionConfiguration};
pub use datagen::{gen_batch, DataGenerator};
pub use error::{HardValidationError, KmsError, LakeError, LakeResult};
pub use kms::{InMemoryKmsClient, KmsClient, KmsConnectionConfig};
pub use table::{DeltaTableStore, TableSnapshot, TableStore, WriteMode, WriteOptions};
pub use types::{DataShape, KeyId, MasterKey, TrialParams};
pub use workspace::{clear_folder, Workspace};
