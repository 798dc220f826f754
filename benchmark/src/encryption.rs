// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Encryption scenarios.
//!
//! Both scenarios protect the footer with the footer key and every column with
//! the column key, using the in-memory key service.
//!
//! - **Delta**: writes an encrypted table, then checks on disk whether the
//!   data files actually carry encrypted footers before choosing a read path.
//! - **Parquet**: reads the same dataset from an encrypted and a plain file
//!   and reports the decryption overhead.

use std::path::{Path, PathBuf};
use std::time::Duration;

use lakebench_core::columnar::{list_parquet_files, write_parquet_file};
use lakebench_core::config::EncryptionSettings;
use lakebench_core::datagen::column_names;
use lakebench_core::table::write_sequence;
use lakebench_core::{
    read_direct, CryptoFactory, DataGenerator, DataShape, DeltaTableStore, FileProtection,
    LakeError, LakeResult, ParquetFileReader, TableStore, Workspace, WriteOptions,
};
use parquet::file::properties::WriterProperties;
use tracing::{info, warn};

use crate::harness::{measure, measure_async};
use crate::metrics::{DeltaEncryptionOutcome, ParquetEncryptionOverhead};

const PARQUET_FILE_NAME: &str = "part-0.parquet";

fn encrypted_writer_properties(
    factory: &CryptoFactory,
    settings: &EncryptionSettings,
    ncols: usize,
) -> LakeResult<WriterProperties> {
    let encryption = settings.encryption_configuration(column_names(ncols))?;
    let properties =
        factory.file_encryption_properties(&settings.kms_connection_config(), &encryption)?;
    Ok(WriterProperties::builder()
        .with_file_encryption_properties(properties)
        .build())
}

fn decrypting_reader(factory: &CryptoFactory, settings: &EncryptionSettings) -> ParquetFileReader {
    ParquetFileReader::with_key_retriever(factory.key_retriever(
        &settings.kms_connection_config(),
        &settings.decryption_configuration(),
    ))
}

fn expect_rows(context: &'static str, expected: usize, actual: usize) -> LakeResult<()> {
    if expected != actual {
        return Err(LakeError::RowCountMismatch {
            context,
            expected,
            actual,
        });
    }
    Ok(())
}

/// What a read of the table's current data files found.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TableRead {
    encrypted_files: usize,
    rows_read: usize,
    elapsed: Duration,
}

/// Check every data file's footer, then read the table.
///
/// Encrypted files go through `reader` directly. When no file is encrypted the
/// writer ignored the encryption properties, and the store's own read path is
/// timed instead.
async fn read_table_files<S>(
    store: &S,
    files: &[PathBuf],
    reader: &ParquetFileReader,
) -> LakeResult<TableRead>
where
    S: TableStore + ?Sized,
{
    let mut encrypted_files = 0;
    for file in files {
        if FileProtection::probe(file)?.is_encrypted() {
            encrypted_files += 1;
        }
    }

    let (rows_read, elapsed) = if encrypted_files == 0 {
        warn!(
            files = files.len(),
            "Table writer ignored the encryption properties, data files are plaintext"
        );
        let (snapshot, elapsed) = measure_async(store.read()).await;
        (snapshot?.num_rows(), elapsed)
    } else {
        let (batch, elapsed) = measure(|| read_direct(reader, files));
        (batch?.num_rows(), elapsed)
    };

    Ok(TableRead {
        encrypted_files,
        rows_read,
        elapsed,
    })
}

/// Write an encrypted table with one create and `delta_nappend` appends and
/// read it back.
///
/// Only the table directory is cleared, so reports kept under the workspace
/// root survive the scenario.
pub async fn run_delta_encrypt(
    workspace: &Workspace,
    settings: &EncryptionSettings,
    generator: &mut DataGenerator,
) -> LakeResult<DeltaEncryptionOutcome> {
    workspace.reset_table()?;
    let shape = DataShape::new(settings.nrows, settings.delta_ncols)?;
    let factory = CryptoFactory::in_memory();
    let options = WriteOptions::with_writer_properties(encrypted_writer_properties(
        &factory,
        settings,
        shape.ncols(),
    )?);

    let store = DeltaTableStore::new(workspace.table_path());
    write_sequence(
        &store,
        (0..=settings.delta_nappend).map(|_| generator.batch(shape)),
        &options,
    )
    .await?;

    let files = store.list_files().await?;
    let read = read_table_files(&store, &files, &decrypting_reader(&factory, settings)).await?;

    let expected = shape.nrows() * (settings.delta_nappend + 1);
    expect_rows("encrypted table read", expected, read.rows_read)?;

    let outcome = DeltaEncryptionOutcome {
        nrows: shape.nrows(),
        ncols: shape.ncols(),
        nappend: settings.delta_nappend,
        nfiles: files.len(),
        encrypted_files: read.encrypted_files,
        rows_read: read.rows_read,
        time_read: read.elapsed.as_secs_f64(),
    };
    info!(
        nfiles = outcome.nfiles,
        encrypted_files = outcome.encrypted_files,
        rows_read = outcome.rows_read,
        time_read = outcome.time_read,
        "Encrypted table read back"
    );
    Ok(outcome)
}

fn timed_read(reader: &ParquetFileReader, dir: &Path, expected: usize) -> LakeResult<Duration> {
    let files = list_parquet_files(dir)?;
    let (batch, elapsed) = measure(|| read_direct(reader, &files));
    expect_rows("parquet read", expected, batch?.num_rows())?;
    Ok(elapsed)
}

/// Time reading one dataset from an encrypted file and from a plain file.
pub fn run_parquet_encrypt(
    workspace: &Workspace,
    settings: &EncryptionSettings,
    generator: &mut DataGenerator,
) -> LakeResult<ParquetEncryptionOverhead> {
    let shape = DataShape::new(settings.nrows, settings.parquet_ncols)?;
    let batch = generator.batch(shape)?;
    let factory = CryptoFactory::in_memory();
    let dir = workspace.parquet_path();
    let path = dir.join(PARQUET_FILE_NAME);

    workspace.reset_parquet()?;
    write_parquet_file(
        &path,
        &batch,
        Some(encrypted_writer_properties(&factory, settings, shape.ncols())?),
    )?;
    let time_encrypted = timed_read(&decrypting_reader(&factory, settings), dir, shape.nrows())?;

    workspace.reset_parquet()?;
    write_parquet_file(&path, &batch, None)?;
    let time_plain = timed_read(&ParquetFileReader::new(), dir, shape.nrows())?;

    let overhead =
        ParquetEncryptionOverhead::new(shape.nrows(), shape.ncols(), time_encrypted, time_plain);
    info!(
        time_plain = overhead.time_plain,
        time_encrypted = overhead.time_encrypted,
        pct = overhead.pct,
        "Parquet encryption overhead"
    );
    Ok(overhead)
}
