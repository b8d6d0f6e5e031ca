//! HDF5 writer: group `<key>` holding one 1-D dataset per column.
//!
//! Files are written as NetCDF-4, which is HDF5 on disk: the group is an
//! HDF5 group and each column an HDF5 dataset over a shared `index`
//! dimension. Needs the native netCDF/HDF5 libraries, so it sits behind the
//! `hdf5` feature.

use crate::db::QueryResult;
use crate::error::Result;
use std::path::Path;

#[cfg(feature = "hdf5")]
pub(super) fn write(result: &QueryResult, path: &Path, key: &str) -> Result<()> {
    native::write(result, path, key)
}

#[cfg(not(feature = "hdf5"))]
pub(super) fn write(_result: &QueryResult, _path: &Path, key: &str) -> Result<()> {
    Err(crate::error::ReportError::export(format!(
        "cannot write group '{key}': built without HDF5 support (enable the `hdf5` feature)"
    )))
}

/// Dataset names cannot contain the path separator or trailing spaces.
#[cfg_attr(not(feature = "hdf5"), allow(dead_code))]
fn dataset_name(label: &str) -> String {
    match label.replace('/', "_").trim_end().to_string() {
        name if name.is_empty() || name == "." => "_".to_string(),
        name => name,
    }
}

#[cfg(feature = "hdf5")]
mod native {
    use super::dataset_name;
    use crate::db::{QueryResult, Value};
    use crate::error::{ReportError, Result};
    use crate::storage::{cell_text, export_err, ColumnKind};
    use netcdf::types::NcVariableType;
    use netcdf::FileMut;
    use std::path::Path;

    /// Dimension every column dataset is laid out along.
    const INDEX_DIM: &str = "index";

    pub(super) fn write(result: &QueryResult, path: &Path, key: &str) -> Result<()> {
        // Truncates an existing file
        let mut file = netcdf::create(path).map_err(export_err)?;
        file.add_group(key).map_err(export_err)?;
        file.add_dimension(&format!("{key}/{INDEX_DIM}"), result.row_count())
            .map_err(export_err)?;

        for (col, label) in result.column_labels().into_iter().enumerate() {
            let name = format!("{key}/{}", dataset_name(&label));
            write_column(&mut file, &name, result, col)
                .map_err(|e| ReportError::export(format!("column '{label}': {e}")))?;
        }

        file.close().map_err(export_err)?;
        Ok(())
    }

    fn write_column(
        file: &mut FileMut,
        name: &str,
        result: &QueryResult,
        col: usize,
    ) -> netcdf::Result<()> {
        let values = || result.column_values(col);
        let has_nulls = values().any(Value::is_null);
        let dims = [INDEX_DIM];

        match ColumnKind::infer(values()) {
            ColumnKind::Int if !has_nulls => {
                let data: Vec<i64> = values()
                    .map(|v| match v {
                        Value::Int(i) => *i,
                        _ => 0,
                    })
                    .collect();
                put(file.add_variable::<i64>(name, &dims)?, &data)
            }
            // NULLs in numeric columns become NaN
            ColumnKind::Int | ColumnKind::Float => {
                let data: Vec<f64> = values()
                    .map(|v| match v {
                        Value::Int(i) => *i as f64,
                        Value::Float(f) => *f,
                        _ => f64::NAN,
                    })
                    .collect();
                put(file.add_variable::<f64>(name, &dims)?, &data)
            }
            // Stored as 0/1
            ColumnKind::Bool if !has_nulls => {
                let data: Vec<i8> = values()
                    .map(|v| i8::from(matches!(v, Value::Bool(true))))
                    .collect();
                put(file.add_variable::<i8>(name, &dims)?, &data)
            }
            _ => {
                let mut var = file.add_variable_with_type(name, &dims, &NcVariableType::String)?;
                for (index, value) in values().enumerate() {
                    var.put_string(&cell_text(value).unwrap_or_default(), index)?;
                }
                Ok(())
            }
        }
    }

    fn put<T: netcdf::NcTypeDescriptor>(
        mut var: netcdf::VariableMut<'_>,
        data: &[T],
    ) -> netcdf::Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        var.put_values(data, ..)
    }

}
