//! Tabular exporters.
//!
//! Serializes a `QueryResult` to one of five file formats. The format is a
//! `FileType` tag and dispatch is an exhaustive match, one writer per format.

mod csv;
mod excel;
mod hdf;
mod json;
mod parquet;

use crate::db::{QueryResult, Value};
use crate::error::{ReportError, Result};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info};

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    /// Comma-separated text with an index column.
    #[serde(rename = "csv")]
    Csv,
    /// Excel workbook with a single `Sheet1`.
    #[serde(rename = "xlsx", alias = "excel")]
    Excel,
    /// HDF5 file; needs a group key.
    #[serde(rename = "h5", alias = "hdf5")]
    Hdf5,
    /// Column-oriented JSON document.
    #[serde(rename = "json")]
    Json,
    /// Apache Parquet file.
    #[serde(rename = "parquet")]
    Parquet,
}

impl FileType {
    pub const ALL: [FileType; 5] = [
        FileType::Csv,
        FileType::Excel,
        FileType::Hdf5,
        FileType::Json,
        FileType::Parquet,
    ];

    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "xlsx",
            Self::Hdf5 => "h5",
            Self::Json => "json",
            Self::Parquet => "parquet",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for FileType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "excel" => Ok(Self::Excel),
            "h5" | "hdf5" | "hdf" => Ok(Self::Hdf5),
            "json" => Ok(Self::Json),
            "parquet" => Ok(Self::Parquet),
            _ => Err(format!(
                "Invalid file type: {s}. Expected: csv, xlsx, h5, json, or parquet"
            )),
        }
    }
}

/// Writes one query result to files named `<output_dir>/<stem>.<ext>`.
pub struct DataExporter<'a> {
    result: &'a QueryResult,
    output_dir: PathBuf,
    stem: String,
}

impl<'a> DataExporter<'a> {
    pub fn new(
        result: &'a QueryResult,
        output_dir: impl Into<PathBuf>,
        stem: impl Into<String>,
    ) -> Self {
        Self {
            result,
            output_dir: output_dir.into(),
            stem: stem.into(),
        }
    }

    /// Path a given format is written to.
    pub fn path_for(&self, file_type: FileType) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", self.stem, file_type.extension()))
    }

    /// Writes the result in `file_type` and returns the file path.
    ///
    /// `key` names the HDF5 group and is ignored by other formats. HDF5 without
    /// a key fails with a validation error before anything is written.
    pub fn create_file(&self, file_type: FileType, key: Option<&str>) -> Result<PathBuf> {
        let path = self.path_for(file_type);

        let hdf_key = match file_type {
            FileType::Hdf5 => Some(
                key.map(str::trim)
                    .filter(|k| !k.is_empty())
                    .ok_or_else(|| {
                        ReportError::validation("Argument 'key' is required for HDF5 files")
                    })?,
            ),
            _ => None,
        };

        info!("Writing {} file: {}", file_type, path.display());
        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            ReportError::export(format!(
                "Failed to create output directory {}: {e}",
                self.output_dir.display()
            ))
        })?;

        let written = match file_type {
            FileType::Csv => csv::write(self.result, &path),
            FileType::Excel => excel::write(self.result, &path),
            FileType::Hdf5 => hdf::write(self.result, &path, hdf_key.unwrap_or_default()),
            FileType::Json => json::write(self.result, &path),
            FileType::Parquet => parquet::write(self.result, &path),
        };
        written.map_err(|e| match e {
            ReportError::Export(msg) => ReportError::export(format!(
                "Failed to write {} file {}: {msg}",
                file_type,
                path.display()
            )),
            other => other,
        })?;

        debug!("Wrote {} rows to {}", self.result.row_count(), path.display());
        Ok(path)
    }
}

/// Maps an I/O or library error to an export error.
pub(crate) fn export_err(e: impl fmt::Display) -> ReportError {
    ReportError::export(e.to_string())
}

/// Text form used by text-based formats; NULL is `None`.
pub(crate) fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Float(f) => Some(format!("{f:?}")),
        Value::Bytes(b) => Some(base64::engine::general_purpose::STANDARD.encode(b)),
        other => Some(other.to_display_string()),
    }
}

/// Storage type shared by the typed binary formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ColumnKind {
    Int,
    Float,
    Bool,
    Binary,
    Utf8,
}

impl ColumnKind {
    /// Infers the narrowest kind that holds every non-null value.
    pub(crate) fn infer<'v>(values: impl IntoIterator<Item = &'v Value>) -> Self {
        let mut kind: Option<ColumnKind> = None;

        for value in values {
            let this = match value {
                Value::Null => continue,
                Value::Int(_) => ColumnKind::Int,
                Value::Float(_) => ColumnKind::Float,
                Value::Bool(_) => ColumnKind::Bool,
                Value::Bytes(_) => ColumnKind::Binary,
                Value::String(_) => ColumnKind::Utf8,
            };

            kind = Some(match (kind, this) {
                (None, k) => k,
                (Some(a), b) if a == b => a,
                (Some(ColumnKind::Int), ColumnKind::Float)
                | (Some(ColumnKind::Float), ColumnKind::Int) => ColumnKind::Float,
                _ => return ColumnKind::Utf8,
            });
        }

        kind.unwrap_or(ColumnKind::Utf8)
    }
}
