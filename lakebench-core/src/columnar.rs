// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Direct access to Parquet data files.
//!
//! Reading the data files of a table one by one bypasses the transaction log
//! entirely, so the result only equals the table's logical content when no
//! rows were ever deleted or rewritten.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::{ArrowReaderOptions, ParquetRecordBatchReaderBuilder};
use parquet::arrow::ArrowWriter;
use parquet::encryption::decrypt::{FileDecryptionProperties, KeyRetriever};
use parquet::errors::ParquetError;
use parquet::file::properties::WriterProperties;
use tracing::debug;

use crate::error::{LakeError, LakeResult};

const PLAINTEXT_MAGIC: &[u8; 4] = b"PAR1";
const ENCRYPTED_FOOTER_MAGIC: &[u8; 4] = b"PARE";

/// Reads every row of one columnar file.
pub trait ColumnarReader {
    fn read(&self, location: &Path) -> LakeResult<RecordBatch>;
}

/// Parquet reader, optionally able to decrypt files.
#[derive(Default, Clone)]
pub struct ParquetFileReader {
    key_retriever: Option<Arc<dyn KeyRetriever>>,
}

impl ParquetFileReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decrypt files using data keys resolved by `key_retriever`.
    pub fn with_key_retriever(key_retriever: Arc<dyn KeyRetriever>) -> Self {
        Self {
            key_retriever: Some(key_retriever),
        }
    }

    fn reader_options(&self) -> LakeResult<ArrowReaderOptions> {
        let options = ArrowReaderOptions::new();
        match &self.key_retriever {
            Some(retriever) => {
                let decryption =
                    FileDecryptionProperties::with_key_retriever(retriever.clone()).build()?;
                Ok(options.with_file_decryption_properties(decryption))
            }
            None => Ok(options),
        }
    }
}

impl ColumnarReader for ParquetFileReader {
    fn read(&self, location: &Path) -> LakeResult<RecordBatch> {
        let file = File::open(location).map_err(|e| LakeError::Io {
            context: "opening parquet file",
            source: e,
        })?;
        let builder = ParquetRecordBatchReaderBuilder::try_new_with_options(file, self.reader_options()?)?;
        let schema = builder.schema().clone();
        let batches = builder
            .build()?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(concat_batches(&schema, &batches)?)
    }
}

/// Read every file in order and concatenate all rows into one batch.
///
/// Rows keep their per-file order and files keep their list order.
pub fn read_direct<R>(reader: &R, files: &[PathBuf]) -> LakeResult<RecordBatch>
where
    R: ColumnarReader + ?Sized,
{
    let parts = files
        .iter()
        .map(|file| reader.read(file))
        .collect::<LakeResult<Vec<_>>>()?;
    let schema = parts.first().ok_or(LakeError::NoDataFiles)?.schema();
    debug!(files = parts.len(), "Read data files directly");
    Ok(concat_batches(&schema, &parts)?)
}

/// Write one batch as a standalone Parquet file.
pub fn write_parquet_file(
    path: &Path,
    batch: &RecordBatch,
    properties: Option<WriterProperties>,
) -> LakeResult<()> {
    let file = File::create(path).map_err(|e| LakeError::Io {
        context: "creating parquet file",
        source: e,
    })?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), properties)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

/// Parquet files directly under `dir`, sorted by name.
pub fn list_parquet_files(dir: &Path) -> LakeResult<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| LakeError::Io {
        context: "listing parquet directory",
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| LakeError::Io {
                context: "listing parquet directory",
                source: e,
            })?
            .path();
        if path.is_file() && path.extension().map(|e| e == "parquet").unwrap_or(false) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// How a Parquet file protects its footer, as told by its trailing magic.
///
/// Files written in plaintext-footer encryption mode also end in `PAR1` and
/// are reported as [`FileProtection::Plaintext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileProtection {
    Plaintext,
    EncryptedFooter,
}

impl FileProtection {
    pub fn probe(path: &Path) -> LakeResult<Self> {
        let io_err = |e| LakeError::Io {
            context: "probing parquet footer",
            source: e,
        };
        let mut file = File::open(path).map_err(io_err)?;
        let mut magic = [0u8; 4];
        file.seek(SeekFrom::End(-4)).map_err(io_err)?;
        file.read_exact(&mut magic).map_err(io_err)?;

        match &magic {
            m if m == PLAINTEXT_MAGIC => Ok(Self::Plaintext),
            m if m == ENCRYPTED_FOOTER_MAGIC => Ok(Self::EncryptedFooter),
            _ => Err(ParquetError::General(format!(
                "{} is not a parquet file (trailing magic {:?})",
                path.display(),
                magic
            ))
            .into()),
        }
    }

    pub fn is_encrypted(&self) -> bool {
        matches!(self, Self::EncryptedFooter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{CryptoFactory, DecryptionConfiguration, EncryptionConfiguration};
    use crate::datagen::{column_names, DataGenerator};
    use crate::kms::KmsConnectionConfig;
    use crate::types::{DataShape, KeyId, MasterKey};
    use tempfile::TempDir;

    fn batch(nrows: usize, ncols: usize, seed: u64) -> RecordBatch {
        DataGenerator::new(Some(seed))
            .batch(DataShape::new(nrows, ncols).unwrap())
            .unwrap()
    }

    fn kms_config() -> KmsConnectionConfig {
        let footer_id = KeyId::new("footer_key").unwrap();
        let col_id = KeyId::new("col_key").unwrap();
        KmsConnectionConfig::new()
            .with_master_key(
                footer_id.clone(),
                MasterKey::new(&footer_id, "0123456789112345").unwrap(),
            )
            .with_master_key(
                col_id.clone(),
                MasterKey::new(&col_id, "1234567890123450").unwrap(),
            )
    }

    #[test]
    fn test_read_direct_preserves_file_order() {
        let temp_dir = TempDir::new().unwrap();
        let first = batch(10, 3, 1);
        let second = batch(5, 3, 2);
        let a = temp_dir.path().join("a.parquet");
        let b = temp_dir.path().join("b.parquet");
        write_parquet_file(&a, &first, None).unwrap();
        write_parquet_file(&b, &second, None).unwrap();

        let combined = read_direct(&ParquetFileReader::new(), &[b.clone(), a.clone()]).unwrap();

        assert_eq!(combined.num_rows(), 15);
        assert_eq!(combined.slice(0, 5), second);
        assert_eq!(combined.slice(5, 10), first);
    }

    #[test]
    fn test_read_direct_without_files() {
        assert!(matches!(
            read_direct(&ParquetFileReader::new(), &[]),
            Err(LakeError::NoDataFiles)
        ));
    }

    #[test]
    fn test_list_parquet_files_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let data = batch(4, 2, 3);
        write_parquet_file(&temp_dir.path().join("part-1.parquet"), &data, None).unwrap();
        write_parquet_file(&temp_dir.path().join("part-0.parquet"), &data, None).unwrap();
        fs::write(temp_dir.path().join("notes.txt"), b"skip").unwrap();

        let files = list_parquet_files(temp_dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["part-0.parquet", "part-1.parquet"]);
    }

    #[test]
    fn test_encrypted_roundtrip_and_probe() {
        let temp_dir = TempDir::new().unwrap();
        let data = batch(64, 4, 4);
        let path = temp_dir.path().join("part-0.parquet");
        let factory = CryptoFactory::in_memory();
        let kms = kms_config();
        let encryption = EncryptionConfiguration::new(KeyId::new("footer_key").unwrap())
            .with_column_key(KeyId::new("col_key").unwrap(), column_names(4));
        let props = WriterProperties::builder()
            .with_file_encryption_properties(
                factory.file_encryption_properties(&kms, &encryption).unwrap(),
            )
            .build();

        write_parquet_file(&path, &data, Some(props)).unwrap();

        assert_eq!(
            FileProtection::probe(&path).unwrap(),
            FileProtection::EncryptedFooter
        );
        assert!(ParquetFileReader::new().read(&path).is_err());

        let retriever = factory.key_retriever(&kms, &DecryptionConfiguration::default());
        let decrypted = ParquetFileReader::with_key_retriever(retriever)
            .read(&path)
            .unwrap();
        assert_eq!(decrypted, data);
    }

    #[test]
    fn test_probe_plaintext_and_garbage() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plain.parquet");
        write_parquet_file(&path, &batch(8, 2, 5), None).unwrap();
        assert_eq!(FileProtection::probe(&path).unwrap(), FileProtection::Plaintext);
        assert!(!FileProtection::Plaintext.is_encrypted());

        let junk = temp_dir.path().join("junk.parquet");
        fs::write(&junk, b"definitely not parquet").unwrap();
        assert!(FileProtection::probe(&junk).is_err());
    }
}
