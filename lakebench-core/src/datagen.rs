// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Synthetic dataset generation.
//!
//! Datasets are rectangular blocks of uniform `f32` values in `[0, 1)` with
//! columns named `x0..x{ncols-1}`.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float32Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::LakeResult;
use crate::types::DataShape;

/// Prefix of every generated column name.
pub const COLUMN_PREFIX: char = 'x';

/// Column names for a dataset of `ncols` columns.
pub fn column_names(ncols: usize) -> Vec<String> {
    (0..ncols).map(|i| format!("{}{}", COLUMN_PREFIX, i)).collect()
}

/// Schema shared by every dataset of `ncols` columns.
pub fn schema_for(ncols: usize) -> SchemaRef {
    let fields: Vec<Field> = column_names(ncols)
        .into_iter()
        .map(|name| Field::new(name, DataType::Float32, true))
        .collect();
    Arc::new(Schema::new(fields))
}

/// Random dataset source. Seeded generators produce identical sequences of
/// datasets across runs; unseeded ones draw their seed from the OS.
pub struct DataGenerator {
    rng: StdRng,
    seed: Option<u64>,
}

impl DataGenerator {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, seed }
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Generate the next dataset of the given shape.
    pub fn batch(&mut self, shape: DataShape) -> LakeResult<RecordBatch> {
        let columns: Vec<ArrayRef> = (0..shape.ncols())
            .map(|_| {
                let values: Float32Array = (0..shape.nrows())
                    .map(|_| Some(self.rng.gen::<f32>()))
                    .collect();
                Arc::new(values) as ArrayRef
            })
            .collect();

        Ok(RecordBatch::try_new(schema_for(shape.ncols()), columns)?)
    }
}

/// Generate a single unseeded dataset.
pub fn gen_batch(shape: DataShape) -> LakeResult<RecordBatch> {
    DataGenerator::new(None).batch(shape)
}
