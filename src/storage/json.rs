//! JSON writer: column-oriented `{"column": {"row index": value}}`.

use super::export_err;
use crate::db::{QueryResult, Value};
use crate::error::Result;
use base64::Engine;
use serde_json::{Map, Number, Value as JsonValue};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub(super) fn write(result: &QueryResult, path: &Path) -> Result<()> {
    let document = to_document(result);

    let file = File::create(path).map_err(export_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &document).map_err(export_err)?;
    writer.flush().map_err(export_err)?;
    Ok(())
}

/// Builds the column-oriented document; key order follows the result.
fn to_document(result: &QueryResult) -> JsonValue {
    let mut columns = Map::new();

    for (col, label) in result.column_labels().into_iter().enumerate() {
        let cells: Map<String, JsonValue> = result
            .column_values(col)
            .enumerate()
            .map(|(index, value)| (index.to_string(), to_json(value)))
            .collect();
        columns.insert(label, JsonValue::Object(cells));
    }

    JsonValue::Object(columns)
}

fn to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(i) => JsonValue::Number((*i).into()),
        Value::Float(f) => Number::from_f64(*f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Bytes(b) => {
            JsonValue::String(base64::engine::general_purpose::STANDARD.encode(b))
        }
    }
}
