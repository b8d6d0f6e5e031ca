//! Pipeline integration tests.
//!
//! Runs the whole report against a live database with mailing disabled.

use db_report::config::{Config, ConnectionConfig};
use db_report::pipeline;
use db_report::storage::FileType;

/// Helper to build a config pointing at the test database and a temp dir.
fn get_test_config(dir: &std::path::Path) -> Option<Config> {
    let url = std::env::var("DATABASE_URL").ok()?;
    let mut config = Config::default();
    config.database = ConnectionConfig::from_connection_string(&url).ok()?;
    config.export.output_dir = dir.join("storage");
    config.export.formats = vec![FileType::Csv, FileType::Excel, FileType::Parquet];
    config.template.dir = std::path::PathBuf::from("templates");
    Some(config)
}

#[tokio::test]
async fn test_report_with_inline_query() {
    let dir = tempfile::tempdir().unwrap();
    let Some(mut config) = get_test_config(dir.path()) else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    config.query.query = "SELECT g AS n, g * 1.5 AS half FROM generate_series(1, 4) AS g".to_string();

    let report = pipeline::run(&config).await.unwrap();

    assert_eq!(report.rows, 4);
    assert!(report.failed.is_empty());
    assert!(report.mailing.is_none());
    for file_type in [FileType::Csv, FileType::Excel, FileType::Parquet] {
        assert!(report.path_of(file_type).unwrap().is_file());
    }
}

#[tokio::test]
async fn test_report_with_sql_template() {
    let dir = tempfile::tempdir().unwrap();
    let Some(mut config) = get_test_config(dir.path()) else {
        eprintln!("Skipping test: DATABASE_URL not set");
        return;
    };
    config.query.schema = "information_schema".to_string();
    config.query.table = "schemata".to_string();
    config.export.formats = vec![FileType::Json];
    config.export.attach = None;

    let report = pipeline::run(&config).await.unwrap();

    assert!(report.rows > 0);
    assert_eq!(report.written.len(), 1);
    assert!(report.path_of(FileType::Json).unwrap().is_file());
}
