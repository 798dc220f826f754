// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict schema validation.
//!
//! Every field has a default reproducing the reference benchmark, so an empty
//! file is a valid configuration. Any invalid field results in a
//! HardValidationError before a single trial runs.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::crypto::{DecryptionConfiguration, EncryptionConfiguration, SUPPORTED_DATA_KEY_BITS};
use crate::error::{HardValidationError, LakeError, LakeResult};
use crate::kms::KmsConnectionConfig;
use crate::types::{DataShape, KeyId, MasterKey, TrialParams};

/// 1 GiB of f32 values spread over 128 columns, split across ten writes.
pub const DEFAULT_NROWS: usize = 2_097_152_usize.div_ceil(10);

const QUICK_NROWS: usize = 2_048;

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawWorkspaceConfig {
    root: String,
    table_dir: String,
    parquet_dir: String,
}

impl Default for RawWorkspaceConfig {
    fn default() -> Self {
        Self {
            root: "tmp".to_string(),
            table_dir: "deltars_table".to_string(),
            parquet_dir: "tmp_pq".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawReportConfig {
    csv_path: Option<String>,
    json_dir: Option<String>,
}

impl Default for RawReportConfig {
    fn default() -> Self {
        Self {
            csv_path: None,
            json_dir: Some("data".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct RawRange {
    start: usize,
    stop: usize,
    #[serde(default = "default_step")]
    step: usize,
}

fn default_step() -> usize {
    1
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawSweepConfig {
    nrows: usize,
    ncols: RawRange,
    nappend: RawRange,
    seed: Option<u64>,
    verify_rows: bool,
}

impl Default for RawSweepConfig {
    fn default() -> Self {
        Self {
            nrows: DEFAULT_NROWS,
            ncols: RawRange {
                start: 20,
                stop: 140,
                step: 20,
            },
            nappend: RawRange {
                start: 0,
                stop: 10,
                step: 1,
            },
            seed: None,
            verify_rows: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawEncryptionConfig {
    nrows: usize,
    delta_ncols: usize,
    delta_nappend: usize,
    parquet_ncols: usize,
    footer_key_id: String,
    footer_key: String,
    column_key_id: String,
    column_key: String,
    data_key_length_bits: u32,
    cache_lifetime_secs: u64,
}

impl Default for RawEncryptionConfig {
    fn default() -> Self {
        Self {
            nrows: DEFAULT_NROWS,
            delta_ncols: 20,
            delta_nappend: 1,
            parquet_ncols: 128,
            footer_key_id: "footer_key".to_string(),
            footer_key: "0123456789112345".to_string(),
            column_key_id: "col_key".to_string(),
            column_key: "1234567890123450".to_string(),
            data_key_length_bits: 128,
            cache_lifetime_secs: 300,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    workspace: RawWorkspaceConfig,
    report: RawReportConfig,
    sweep: RawSweepConfig,
    encryption: RawEncryptionConfig,
}

/// Validated workspace layout.
#[derive(Debug, Clone)]
pub struct WorkspaceConfig {
    pub root: PathBuf,
    pub table_dir: String,
    pub parquet_dir: String,
}

/// Validated report destinations.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Explicit CSV path; defaults to `<workspace root>/delta_benchmark.csv`
    pub csv_path: Option<PathBuf>,
    /// Directory for timestamped JSON reports, if any
    pub json_dir: Option<PathBuf>,
}

/// Half-open stepped range, `start..stop` by `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepRange {
    pub start: usize,
    pub stop: usize,
    pub step: usize,
}

impl SweepRange {
    pub fn iter(&self) -> impl Iterator<Item = usize> {
        (self.start..self.stop).step_by(self.step)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.stop
    }
}

/// Validated benchmark grid.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    pub nrows: usize,
    pub ncols: SweepRange,
    pub nappend: SweepRange,
    pub seed: Option<u64>,
    /// Compare full row multisets of both read modes, not only row counts
    pub verify_rows: bool,
}

impl SweepConfig {
    /// Trials in execution order: append count outer, column count inner.
    pub fn trials(&self) -> Result<Vec<TrialParams>, HardValidationError> {
        let mut trials = Vec::with_capacity(self.nappend.len() * self.ncols.len());
        for nappend in self.nappend.iter() {
            for ncols in self.ncols.iter() {
                trials.push(TrialParams::new(DataShape::new(self.nrows, ncols)?, nappend));
            }
        }
        Ok(trials)
    }
}

/// Validated encryption scenario settings.
#[derive(Debug, Clone)]
pub struct EncryptionSettings {
    pub nrows: usize,
    pub delta_ncols: usize,
    pub delta_nappend: usize,
    pub parquet_ncols: usize,
    pub footer_key_id: KeyId,
    pub footer_key: MasterKey,
    pub column_key_id: KeyId,
    pub column_key: MasterKey,
    pub data_key_length_bits: u32,
    pub cache_lifetime: Duration,
}

impl EncryptionSettings {
    pub fn kms_connection_config(&self) -> KmsConnectionConfig {
        KmsConnectionConfig::new()
            .with_master_key(self.footer_key_id.clone(), self.footer_key.clone())
            .with_master_key(self.column_key_id.clone(), self.column_key.clone())
    }

    /// Footer under the footer key, every listed column under the column key.
    pub fn encryption_configuration(
        &self,
        columns: Vec<String>,
    ) -> Result<EncryptionConfiguration, HardValidationError> {
        EncryptionConfiguration::new(self.footer_key_id.clone())
            .with_column_key(self.column_key_id.clone(), columns)
            .with_data_key_length_bits(self.data_key_length_bits)
    }

    pub fn decryption_configuration(&self) -> DecryptionConfiguration {
        DecryptionConfiguration {
            cache_lifetime: self.cache_lifetime,
        }
    }
}

/// Complete validated configuration.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub workspace: WorkspaceConfig,
    pub report: ReportConfig,
    pub sweep: SweepConfig,
    pub encryption: EncryptionSettings,
}

impl BenchConfig {
    /// Where the CSV report is written.
    pub fn csv_path(&self) -> PathBuf {
        self.report
            .csv_path
            .clone()
            .unwrap_or_else(|| self.workspace.root.join("delta_benchmark.csv"))
    }

    /// Shrink the grid and datasets for a smoke run.
    pub fn into_quick(mut self) -> Self {
        self.sweep.nrows = QUICK_NROWS;
        self.sweep.ncols = SweepRange {
            start: 20,
            stop: 60,
            step: 20,
        };
        self.sweep.nappend = SweepRange {
            start: 0,
            stop: 3,
            step: 1,
        };
        self.encryption.nrows = QUICK_NROWS;
        self.encryption.parquet_ncols = self.encryption.parquet_ncols.min(32);
        self
    }
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> LakeResult<BenchConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(LakeError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| LakeError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Built-in configuration, used when no file is given.
    pub fn defaults() -> LakeResult<BenchConfig> {
        Self::validate(RawConfig::default())
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> LakeResult<BenchConfig> {
        if content.trim().is_empty() {
            return Self::defaults();
        }

        let raw: RawConfig =
            serde_yaml::from_str(content).map_err(|e| LakeError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> LakeResult<BenchConfig> {
        Ok(BenchConfig {
            workspace: Self::validate_workspace(raw.workspace)?,
            report: ReportConfig {
                csv_path: raw.report.csv_path.map(PathBuf::from),
                json_dir: raw.report.json_dir.map(PathBuf::from),
            },
            sweep: Self::validate_sweep(raw.sweep)?,
            encryption: Self::validate_encryption(raw.encryption)?,
        })
    }

    fn validate_workspace(raw: RawWorkspaceConfig) -> Result<WorkspaceConfig, HardValidationError> {
        for (field, value) in [
            ("workspace.root", &raw.root),
            ("workspace.table_dir", &raw.table_dir),
            ("workspace.parquet_dir", &raw.parquet_dir),
        ] {
            if value.is_empty() {
                return Err(HardValidationError::InvalidFieldValue {
                    field,
                    value: value.clone(),
                    reason: "Must not be empty".to_string(),
                });
            }
        }

        if raw.table_dir == raw.parquet_dir {
            return Err(HardValidationError::InvalidFieldValue {
                field: "workspace.parquet_dir",
                value: raw.parquet_dir,
                reason: "Must differ from workspace.table_dir".to_string(),
            });
        }

        Ok(WorkspaceConfig {
            root: PathBuf::from(raw.root),
            table_dir: raw.table_dir,
            parquet_dir: raw.parquet_dir,
        })
    }

    fn validate_range(
        field: &'static str,
        raw: RawRange,
        min_start: usize,
    ) -> Result<SweepRange, HardValidationError> {
        let invalid = |reason: &str| HardValidationError::InvalidRange {
            field,
            start: raw.start,
            stop: raw.stop,
            step: raw.step,
            reason: reason.to_string(),
        };

        if raw.step == 0 {
            return Err(invalid("Step must be greater than 0"));
        }
        if raw.start >= raw.stop {
            return Err(invalid("Range must not be empty"));
        }
        if raw.start < min_start {
            return Err(invalid(&format!("Start must be at least {}", min_start)));
        }

        Ok(SweepRange {
            start: raw.start,
            stop: raw.stop,
            step: raw.step,
        })
    }

    fn validate_sweep(raw: RawSweepConfig) -> Result<SweepConfig, HardValidationError> {
        if raw.nrows == 0 {
            return Err(HardValidationError::InvalidFieldValue {
                field: "sweep.nrows",
                value: "0".to_string(),
                reason: "Row count must be greater than 0".to_string(),
            });
        }

        Ok(SweepConfig {
            nrows: raw.nrows,
            ncols: Self::validate_range("sweep.ncols", raw.ncols, 1)?,
            nappend: Self::validate_range("sweep.nappend", raw.nappend, 0)?,
            seed: raw.seed,
            verify_rows: raw.verify_rows,
        })
    }

    fn validate_encryption(raw: RawEncryptionConfig) -> Result<EncryptionSettings, HardValidationError> {
        for (field, value) in [
            ("encryption.nrows", raw.nrows),
            ("encryption.delta_ncols", raw.delta_ncols),
            ("encryption.parquet_ncols", raw.parquet_ncols),
        ] {
            if value == 0 {
                return Err(HardValidationError::InvalidFieldValue {
                    field,
                    value: "0".to_string(),
                    reason: "Must be greater than 0".to_string(),
                });
            }
        }

        if !SUPPORTED_DATA_KEY_BITS.contains(&raw.data_key_length_bits) {
            return Err(HardValidationError::InvalidFieldValue {
                field: "encryption.data_key_length_bits",
                value: raw.data_key_length_bits.to_string(),
                reason: "Must be one of 128, 192 or 256".to_string(),
            });
        }

        let footer_key_id = KeyId::new(raw.footer_key_id)?;
        let footer_key = MasterKey::new(&footer_key_id, raw.footer_key)?;
        let column_key_id = KeyId::new(raw.column_key_id)?;
        let column_key = MasterKey::new(&column_key_id, raw.column_key)?;

        Ok(EncryptionSettings {
            nrows: raw.nrows,
            delta_ncols: raw.delta_ncols,
            delta_nappend: raw.delta_nappend,
            parquet_ncols: raw.parquet_ncols,
            footer_key_id,
            footer_key,
            column_key_id,
            column_key,
            data_key_length_bits: raw.data_key_length_bits,
            cache_lifetime: Duration::from_secs(raw.cache_lifetime_secs),
        })
    }
}
