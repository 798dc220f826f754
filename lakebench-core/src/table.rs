// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Table-storage driver.
//!
//! A table is created by one write and grown by appends. Reads go through the
//! table's transaction log and also report which data files the current
//! version references, so the same rows can be read again directly.

use std::fs;
use std::path::{Path, PathBuf};

use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use deltalake::protocol::SaveMode;
use deltalake::DeltaOps;
use futures::TryStreamExt;
use parquet::file::properties::WriterProperties;
use tracing::debug;
use url::Url;

use crate::error::{LakeError, LakeResult};

/// How a write relates to existing table content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Create the table; fails if one already exists
    Create,
    /// Add rows without touching existing ones
    Append,
}

impl WriteMode {
    fn save_mode(self) -> SaveMode {
        match self {
            WriteMode::Create => SaveMode::ErrorIfExists,
            WriteMode::Append => SaveMode::Append,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WriteMode::Create => "create",
            WriteMode::Append => "append",
        }
    }
}

/// Per-file options forwarded to the table writer.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    pub writer_properties: Option<WriterProperties>,
}

impl WriteOptions {
    pub fn with_writer_properties(properties: WriterProperties) -> Self {
        Self {
            writer_properties: Some(properties),
        }
    }
}

/// Full logical content of a table plus the data files backing it.
#[derive(Debug, Clone)]
pub struct TableSnapshot {
    pub files: Vec<PathBuf>,
    pub batches: Vec<RecordBatch>,
}

impl TableSnapshot {
    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(RecordBatch::num_rows).sum()
    }
}

/// A transaction-logged table.
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn write(&self, batch: RecordBatch, mode: WriteMode, options: &WriteOptions)
        -> LakeResult<()>;

    /// Read every live row and the list of data files.
    async fn read(&self) -> LakeResult<TableSnapshot>;

    /// Data files of the current version, without reading any rows.
    async fn list_files(&self) -> LakeResult<Vec<PathBuf>>;
}

/// Delta Lake table on the local filesystem.
#[derive(Debug, Clone)]
pub struct DeltaTableStore {
    path: PathBuf,
}

impl DeltaTableStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn uri(&self) -> LakeResult<&str> {
        self.path.to_str().ok_or_else(|| LakeError::InvalidLocation {
            location: self.path.display().to_string(),
        })
    }
}

#[async_trait]
impl TableStore for DeltaTableStore {
    async fn write(
        &self,
        batch: RecordBatch,
        mode: WriteMode,
        options: &WriteOptions,
    ) -> LakeResult<()> {
        fs::create_dir_all(&self.path).map_err(|e| LakeError::Io {
            context: "creating table directory",
            source: e,
        })?;

        let rows = batch.num_rows();
        let mut builder = DeltaOps::try_from_uri(self.uri()?)
            .await?
            .write(vec![batch])
            .with_save_mode(mode.save_mode());
        if let Some(properties) = &options.writer_properties {
            builder = builder.with_writer_properties(properties.clone());
        }
        builder.await?;

        debug!(
            path = %self.path.display(),
            mode = mode.as_str(),
            rows,
            "Committed table write"
        );
        Ok(())
    }

    async fn read(&self) -> LakeResult<TableSnapshot> {
        let table = deltalake::open_table(self.uri()?).await?;
        let files = table
            .get_file_uris()?
            .map(|uri| location_to_path(&uri))
            .collect::<LakeResult<Vec<_>>>()?;

        let (_, stream) = DeltaOps::from(table).load().await?;
        let batches: Vec<RecordBatch> = stream.try_collect().await?;

        Ok(TableSnapshot { files, batches })
    }

    async fn list_files(&self) -> LakeResult<Vec<PathBuf>> {
        let table = deltalake::open_table(self.uri()?).await?;
        let files = table
            .get_file_uris()?
            .map(|uri| location_to_path(&uri))
            .collect::<LakeResult<Vec<_>>>()?;
        Ok(files)
    }
}

/// Turn a data file location reported by the table into a local path.
pub fn location_to_path(location: &str) -> LakeResult<PathBuf> {
    match Url::parse(location) {
        Ok(url) if url.scheme() == "file" => {
            url.to_file_path()
                .map_err(|_| LakeError::InvalidLocation {
                    location: location.to_string(),
                })
        }
        Ok(_) => Err(LakeError::InvalidLocation {
            location: location.to_string(),
        }),
        Err(_) => Ok(PathBuf::from(location)),
    }
}

/// Create the table from the first dataset, then append each following one.
///
/// Returns the number of writes performed.
pub async fn write_sequence<S, I>(store: &S, datasets: I, options: &WriteOptions) -> LakeResult<usize>
where
    S: TableStore + ?Sized,
    I: IntoIterator<Item = LakeResult<RecordBatch>>,
{
    let mut writes = 0;
    for dataset in datasets {
        let mode = if writes == 0 {
            WriteMode::Create
        } else {
            WriteMode::Append
        };
        store.write(dataset?, mode, options).await?;
        writes += 1;
    }
    Ok(writes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columnar::{read_direct, ParquetFileReader};
    use crate::datagen::{gen_batch, DataGenerator};
    use crate::types::DataShape;
    use crate::verify::same_rows;
    use tempfile::TempDir;

    #[test]
    fn test_location_to_path() {
        assert_eq!(
            location_to_path("file:///tmp/table/part-0.parquet").unwrap(),
            PathBuf::from("/tmp/table/part-0.parquet")
        );
        assert_eq!(
            location_to_path("file:///tmp/my%20table/x.parquet").unwrap(),
            PathBuf::from("/tmp/my table/x.parquet")
        );
        assert_eq!(
            location_to_path("/tmp/table/part-0.parquet").unwrap(),
            PathBuf::from("/tmp/table/part-0.parquet")
        );
        assert!(location_to_path("s3://bucket/table/part-0.parquet").is_err());
    }

    #[tokio::test]
    async fn test_create_and_appends_accumulate_rows() {
        let temp_dir = TempDir::new().unwrap();
        let store = DeltaTableStore::new(temp_dir.path().join("table"));
        let shape = DataShape::new(100, 4).unwrap();
        let mut generator = DataGenerator::new(Some(11));

        let writes = write_sequence(
            &store,
            (0..4).map(|_| generator.batch(shape)),
            &WriteOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(writes, 4);
        let snapshot = store.read().await.unwrap();
        assert_eq!(snapshot.num_rows(), 400);
        assert!(!snapshot.files.is_empty());
        assert_eq!(store.list_files().await.unwrap().len(), snapshot.files.len());
    }

    #[tokio::test]
    async fn test_create_twice_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = DeltaTableStore::new(temp_dir.path().join("table"));
        let shape = DataShape::new(10, 2).unwrap();

        store
            .write(gen_batch(shape).unwrap(), WriteMode::Create, &WriteOptions::default())
            .await
            .unwrap();
        let second = store
            .write(gen_batch(shape).unwrap(), WriteMode::Create, &WriteOptions::default())
            .await;

        assert!(matches!(second, Err(LakeError::Table(_))));
    }

    #[tokio::test]
    async fn test_append_with_other_schema_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = DeltaTableStore::new(temp_dir.path().join("table"));

        store
            .write(
                gen_batch(DataShape::new(10, 2).unwrap()).unwrap(),
                WriteMode::Create,
                &WriteOptions::default(),
            )
            .await
            .unwrap();
        let append = store
            .write(
                gen_batch(DataShape::new(10, 3).unwrap()).unwrap(),
                WriteMode::Append,
                &WriteOptions::default(),
            )
            .await;

        assert!(append.is_err());
    }

    #[tokio::test]
    async fn test_native_and_direct_reads_agree() {
        let temp_dir = TempDir::new().unwrap();
        let store = DeltaTableStore::new(temp_dir.path().join("table"));
        let shape = DataShape::new(64, 3).unwrap();
        let mut generator = DataGenerator::new(Some(5));

        for nappend in 0..3 {
            let _ = std::fs::remove_dir_all(store.path());
            write_sequence(
                &store,
                (0..=nappend).map(|_| generator.batch(shape)),
                &WriteOptions::default(),
            )
            .await
            .unwrap();

            let snapshot = store.read().await.unwrap();
            let direct = read_direct(&ParquetFileReader::new(), &snapshot.files).unwrap();

            assert_eq!(direct.num_rows(), snapshot.num_rows());
            assert!(same_rows(&snapshot.batches, &[direct]).unwrap());
        }
    }
}
