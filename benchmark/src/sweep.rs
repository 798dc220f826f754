// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Native versus direct read sweep.
//!
//! Every trial starts from an empty workspace, creates a table, appends
//! `nappend` datasets of the same shape and then times both read modes over
//! the finished table.

use std::slice;

use lakebench_core::config::SweepConfig;
use lakebench_core::table::write_sequence;
use lakebench_core::verify::same_rows;
use lakebench_core::{
    read_direct, ColumnarReader, DataGenerator, DeltaTableStore, LakeError, LakeResult,
    ParquetFileReader, TableStore, TrialParams, Workspace, WriteOptions,
};
use tracing::{debug, info, warn};

use crate::harness::{measure, measure_async};
use crate::metrics::TrialResult;

/// Run one trial against an empty table location.
pub async fn run_trial<S, R>(
    index: usize,
    params: &TrialParams,
    store: &S,
    reader: &R,
    generator: &mut DataGenerator,
    verify_rows: bool,
) -> LakeResult<TrialResult>
where
    S: TableStore + ?Sized,
    R: ColumnarReader + ?Sized,
{
    let shape = params.shape;
    let writes = write_sequence(
        store,
        (0..=params.nappend).map(|_| generator.batch(shape)),
        &WriteOptions::default(),
    )
    .await?;
    debug!(trial = index, writes, "Table written");

    let expected = params.expected_rows();

    let (snapshot, time_delta) = measure_async(store.read()).await;
    let snapshot = snapshot?;
    check_rows("native read", expected, snapshot.num_rows())?;

    let (direct, time_pq) = measure(|| read_direct(reader, &snapshot.files));
    let direct = direct?;
    check_rows("direct read", expected, direct.num_rows())?;

    if verify_rows && !same_rows(&snapshot.batches, slice::from_ref(&direct))? {
        return Err(LakeError::RowContentMismatch {
            context: "direct read",
        });
    }

    let result = TrialResult::new(
        index,
        params,
        snapshot.files.len(),
        expected,
        time_delta,
        time_pq,
    );
    info!(
        trial = index,
        nrows = result.nrows,
        ncols = result.ncols,
        nappend = result.nappend,
        nfiles = result.nfiles,
        time_delta = result.time_delta,
        time_pq = result.time_pq,
        "Trial complete"
    );
    Ok(result)
}

fn check_rows(context: &'static str, expected: usize, actual: usize) -> LakeResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(LakeError::RowCountMismatch {
            context,
            expected,
            actual,
        })
    }
}

/// Run every trial of the grid in order, resetting the workspace before each.
pub async fn run_sweep(
    workspace: &Workspace,
    sweep: &SweepConfig,
    generator: &mut DataGenerator,
) -> LakeResult<Vec<TrialResult>> {
    let trials = sweep.trials()?;
    let store = DeltaTableStore::new(workspace.table_path());
    let reader = ParquetFileReader::new();

    info!(
        trials = trials.len(),
        nrows = sweep.nrows,
        workspace = %workspace.root().display(),
        "Starting sweep"
    );

    let mut results = Vec::with_capacity(trials.len());
    for (index, params) in trials.iter().enumerate() {
        let cleanup = workspace.reset()?;
        if !cleanup.is_clean() {
            warn!(
                trial = index,
                failed = cleanup.failed,
                "Workspace not fully cleared before trial"
            );
        }
        results.push(run_trial(index, params, &store, &reader, generator, sweep.verify_rows).await?);
    }
    Ok(results)
}
