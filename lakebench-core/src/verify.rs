//! Row multiset comparison.
//!
//! Rows are encoded with Arrow's row format, which gives every row a byte
//! string that compares equal exactly when the row values do.

use arrow::array::ArrayRef;
use arrow::record_batch::RecordBatch;
use arrow::row::{RowConverter, SortField};

use crate::error::LakeResult;

/// Encoded rows of all batches, sorted. Batches must share column types.
pub fn row_multiset(batches: &[RecordBatch]) -> LakeResult<Vec<Vec<u8>>> {
    let Some(first) = batches.first() else {
        return Ok(Vec::new());
    };

    let fields = first
        .schema()
        .fields()
        .iter()
        .map(|field| SortField::new(field.data_type().clone()))
        .collect();
    let converter = RowConverter::new(fields)?;

    let mut rows = Vec::with_capacity(batches.iter().map(RecordBatch::num_rows).sum());
    for batch in batches {
        let columns: Vec<ArrayRef> = batch.columns().to_vec();
        let encoded = converter.convert_columns(&columns)?;
        rows.extend(encoded.iter().map(|row| row.as_ref().to_vec()));
    }
    rows.sort_unstable();
    Ok(rows)
}

/// True when both sides hold the same rows, in any order.
pub fn same_rows(left: &[RecordBatch], right: &[RecordBatch]) -> LakeResult<bool> {
    let width = |batches: &[RecordBatch]| batches.first().map(RecordBatch::num_columns);
    if width(left) != width(right) {
        return Ok(false);
    }
    Ok(row_multiset(left)? == row_multiset(right)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datagen::DataGenerator;
    use crate::types::DataShape;
    use arrow::compute::take;
    use arrow::array::UInt32Array;

    fn reversed(batch: &RecordBatch) -> RecordBatch {
        let indices = UInt32Array::from_iter_values((0..batch.num_rows() as u32).rev());
        let columns = batch
            .columns()
            .iter()
            .map(|c| take(c.as_ref(), &indices, None).unwrap())
            .collect();
        RecordBatch::try_new(batch.schema(), columns).unwrap()
    }

    #[test]
    fn test_order_does_not_matter() {
        let batch = DataGenerator::new(Some(1))
            .batch(DataShape::new(20, 3).unwrap())
            .unwrap();
        let split = [batch.slice(10, 10), batch.slice(0, 10)];
        assert!(same_rows(&[batch.clone()], &split).unwrap());
        assert!(same_rows(&[batch.clone()], &[reversed(&batch)]).unwrap());
    }

    #[test]
    fn test_different_rows_detected() {
        let mut generator = DataGenerator::new(Some(2));
        let shape = DataShape::new(20, 3).unwrap();
        let a = generator.batch(shape).unwrap();
        let b = generator.batch(shape).unwrap();
        assert!(!same_rows(&[a.clone()], &[b]).unwrap());
        assert!(!same_rows(&[a.clone()], &[a.slice(0, 19)]).unwrap());
    }

    #[test]
    fn test_width_mismatch() {
        let mut generator = DataGenerator::new(Some(3));
        let a = generator.batch(DataShape::new(5, 2).unwrap()).unwrap();
        let b = generator.batch(DataShape::new(5, 3).unwrap()).unwrap();
        assert!(!same_rows(&[a], &[b]).unwrap());
        assert!(same_rows(&[], &[]).unwrap());
    }
}
