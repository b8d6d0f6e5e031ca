//! Parquet writer: one Arrow record batch, column types inferred from values.

use super::{cell_text, export_err, ColumnKind};
use crate::db::{QueryResult, Value};
use crate::error::{ReportError, Result};
use arrow::array::{ArrayRef, BinaryArray, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use ::parquet::arrow::ArrowWriter;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

pub(super) fn write(result: &QueryResult, path: &Path) -> Result<()> {
    let batch = to_record_batch(result)?;

    let file = File::create(path).map_err(export_err)?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).map_err(export_err)?;
    writer.write(&batch).map_err(export_err)?;
    writer.close().map_err(export_err)?;
    Ok(())
}

fn to_record_batch(result: &QueryResult) -> Result<RecordBatch> {
    let labels = result.column_labels();
    if labels.is_empty() {
        return Err(ReportError::export("result has no columns"));
    }

    let mut fields = Vec::with_capacity(labels.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(labels.len());

    for (col, label) in labels.into_iter().enumerate() {
        let kind = ColumnKind::infer(result.column_values(col));
        let (data_type, array) = build_array(kind, result.column_values(col));
        fields.push(Field::new(label, data_type, true));
        arrays.push(array);
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).map_err(export_err)
}

fn build_array<'v>(
    kind: ColumnKind,
    values: impl Iterator<Item = &'v Value>,
) -> (DataType, ArrayRef) {
    match kind {
        ColumnKind::Int => {
            let data: Vec<Option<i64>> = values
                .map(|v| match v {
                    Value::Int(i) => Some(*i),
                    _ => None,
                })
                .collect();
            (DataType::Int64, Arc::new(Int64Array::from(data)))
        }
        ColumnKind::Float => {
            let data: Vec<Option<f64>> = values
                .map(|v| match v {
                    Value::Int(i) => Some(*i as f64),
                    Value::Float(f) => Some(*f),
                    _ => None,
                })
                .collect();
            (DataType::Float64, Arc::new(Float64Array::from(data)))
        }
        ColumnKind::Bool => {
            let data: Vec<Option<bool>> = values
                .map(|v| match v {
                    Value::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            (DataType::Boolean, Arc::new(BooleanArray::from(data)))
        }
        ColumnKind::Binary => {
            let data: Vec<Option<&[u8]>> = values
                .map(|v| match v {
                    Value::Bytes(b) => Some(b.as_slice()),
                    _ => None,
                })
                .collect();
            (DataType::Binary, Arc::new(BinaryArray::from(data)))
        }
        ColumnKind::Utf8 => {
            let data: Vec<Option<String>> = values.map(cell_text).collect();
            (DataType::Utf8, Arc::new(StringArray::from(data)))
        }
    }
}
