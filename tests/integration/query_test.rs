//! Query execution integration tests.
//!
//! Runs enquiries against a live database through `QueryExecutor`.

use db_report::config::ConnectionConfig;
use db_report::db::{QueryExecutor, QuerySource, Value};
use db_report::error::ReportError;
use std::path::Path;

/// Helper to create a connected executor.
async fn get_test_executor() -> Option<QueryExecutor> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let config = ConnectionConfig::from_connection_string(&url).ok()?;
    QueryExecutor::connect(&config).await.ok()
}

fn inline(sql: &str) -> QuerySource {
    QuerySource::Inline(sql.to_string())
}

#[tokio::test]
async fn test_execute_simple_select() {
    let Some(executor) = get_test_executor().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = executor
        .enquiry("", "", &inline("SELECT 1 AS num, 'hello' AS greeting"))
        .await
        .unwrap();

    assert_eq!(result.column_labels(), vec!["num", "greeting"]);
    assert_eq!(result.row_count(), 1);
    assert_eq!(result.rows[0][0], Value::Int(1));
    assert_eq!(result.rows[0][1], Value::String("hello".to_string()));
}

#[tokio::test]
async fn test_execute_select_with_null_and_types() {
    let Some(executor) = get_test_executor().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = executor
        .enquiry(
            "",
            "",
            &inline("SELECT NULL::text AS n, true AS b, 2.5::float8 AS f, '\\xdead'::bytea AS raw"),
        )
        .await
        .unwrap();

    let row = &result.rows[0];
    assert_eq!(row[0], Value::Null);
    assert_eq!(row[1], Value::Bool(true));
    assert_eq!(row[2], Value::Float(2.5));
    assert_eq!(row[3], Value::Bytes(vec![0xde, 0xad]));
}

#[tokio::test]
async fn test_empty_result_keeps_columns() {
    let Some(executor) = get_test_executor().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = executor
        .enquiry("", "", &inline("SELECT 1 AS a, 'x' AS b WHERE false"))
        .await
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(result.column_labels(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_file_template_substitutes_schema_and_table() {
    let Some(executor) = get_test_executor().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("tables.sql"),
        "SELECT table_name FROM {0}.{1} WHERE table_schema = 'information_schema' LIMIT 3",
    )
    .unwrap();
    let source = QuerySource::parse("tables.sql", dir.path());

    let result = executor
        .enquiry("information_schema", "tables", &source)
        .await
        .unwrap();

    assert_eq!(result.column_labels(), vec!["table_name"]);
    assert_eq!(result.row_count(), 3);
}

#[tokio::test]
async fn test_syntax_error_is_query_error() {
    let Some(executor) = get_test_executor().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let err = executor
        .enquiry("", "", &inline("SELEC 1"))
        .await
        .unwrap_err();

    assert!(matches!(err, ReportError::Query(_)));
    assert!(err.to_string().contains("syntax error"));
}

#[tokio::test]
async fn test_missing_table_is_query_error() {
    let Some(executor) = get_test_executor().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let err = executor
        .enquiry(
            "public",
            "no_such_table_for_reports",
            &QuerySource::parse("default.sql", Path::new("sql")),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ReportError::Query(_)));
}

#[tokio::test]
async fn test_numeric_and_temporal_columns() {
    let Some(executor) = get_test_executor().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = executor
        .enquiry(
            "",
            "",
            &inline(
                "SELECT 12.50::numeric AS amount, DATE '2024-03-01' AS day, \
                 TIMESTAMP '2024-03-01 08:30:00' AS at, '{\"a\": 1}'::jsonb AS doc",
            ),
        )
        .await
        .unwrap();

    let row = &result.rows[0];
    assert_eq!(row[0], Value::Float(12.5));
    assert_eq!(row[1], Value::String("2024-03-01".to_string()));
    assert_eq!(row[2], Value::String("2024-03-01 08:30:00".to_string()));
    assert_eq!(row[3], Value::String("{\"a\": 1}".to_string()));
}

#[tokio::test]
async fn test_types_without_rust_mapping_keep_server_text() {
    let Some(executor) = get_test_executor().await else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };

    let result = executor
        .enquiry(
            "",
            "",
            &inline(
                "SELECT interval '1 day' AS span, ARRAY[1,2] AS ids, inet '1.2.3.4' AS addr, \
                 'NaN'::numeric AS missing, 'Infinity'::float8 AS big, \
                 TIMESTAMPTZ '2024-03-01 08:30:00+00' AS at",
            ),
        )
        .await
        .unwrap();

    let row = &result.rows[0];
    assert_eq!(row[0], Value::String("1 day".to_string()));
    assert_eq!(row[1], Value::String("{1,2}".to_string()));
    assert_eq!(row[2], Value::String("1.2.3.4".to_string()));
    assert!(matches!(row[3], Value::Float(f) if f.is_nan()));
    assert_eq!(row[4], Value::Float(f64::INFINITY));
    assert_eq!(row[5], Value::String("2024-03-01T08:30:00+00:00".to_string()));
}
