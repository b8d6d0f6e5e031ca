//! Export integration tests.
//!
//! Writes every format through the public exporter; no database needed.

use db_report::db::{ColumnInfo, QueryResult, Value};
use db_report::error::ReportError;
use db_report::storage::{DataExporter, FileType};
use pretty_assertions::assert_eq;

fn sales() -> QueryResult {
    QueryResult::with_data(
        vec![
            ColumnInfo::new("region", "TEXT"),
            ColumnInfo::new("units", "INT8"),
            ColumnInfo::new("revenue", "FLOAT8"),
        ],
        vec![
            vec![Value::String("north".into()), Value::Int(12), Value::Float(340.5)],
            vec![Value::String("south".into()), Value::Int(7), Value::Null],
        ],
    )
}

#[test]
fn test_each_format_written_with_its_extension() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("nested").join("storage");
    let result = sales();
    let exporter = DataExporter::new(&result, &out, "weekly");

    for file_type in [FileType::Csv, FileType::Excel, FileType::Json, FileType::Parquet] {
        let path = exporter.create_file(file_type, None).unwrap();
        assert_eq!(path, out.join(format!("weekly.{}", file_type.extension())));
        assert!(path.is_file(), "{} not written", path.display());
    }
}

#[test]
fn test_csv_contents() {
    let dir = tempfile::tempdir().unwrap();
    let result = sales();

    let path = DataExporter::new(&result, dir.path(), "weekly")
        .create_file(FileType::Csv, None)
        .unwrap();

    assert_eq!(
        std::fs::read_to_string(path).unwrap(),
        ",region,units,revenue\n0,north,12,340.5\n1,south,7,\n"
    );
}

#[test]
fn test_json_contents() {
    let dir = tempfile::tempdir().unwrap();
    let result = sales();

    let path = DataExporter::new(&result, dir.path(), "weekly")
        .create_file(FileType::Json, None)
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "region": {"0": "north", "1": "south"},
            "units": {"0": 12, "1": 7},
            "revenue": {"0": 340.5, "1": null}
        })
    );
}

#[test]
fn test_rewrite_replaces_previous_file() {
    let dir = tempfile::tempdir().unwrap();
    let first = sales();
    let second = QueryResult::with_data(
        vec![ColumnInfo::new("only", "INT4")],
        vec![vec![Value::Int(1)]],
    );

    DataExporter::new(&first, dir.path(), "r")
        .create_file(FileType::Csv, None)
        .unwrap();
    let path = DataExporter::new(&second, dir.path(), "r")
        .create_file(FileType::Csv, None)
        .unwrap();

    assert_eq!(std::fs::read_to_string(path).unwrap(), ",only\n0,1\n");
}

#[test]
fn test_hdf5_without_key_touches_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("storage");
    let result = sales();

    let err = DataExporter::new(&result, &out, "weekly")
        .create_file(FileType::Hdf5, None)
        .unwrap_err();

    assert!(matches!(err, ReportError::Validation(_)));
    assert!(!out.exists());
}
