//! XLSX writer: one worksheet named `Sheet1`, header row, no index column.

use super::{cell_text, export_err};
use crate::db::{QueryResult, Value};
use crate::error::{ReportError, Result};
use rust_xlsxwriter::Workbook;
use std::path::Path;

pub(crate) const SHEET_NAME: &str = "Sheet1";

pub(super) fn write(result: &QueryResult, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).map_err(export_err)?;

    for (col, label) in result.column_labels().iter().enumerate() {
        worksheet
            .write_string(0, col_num(col)?, label)
            .map_err(export_err)?;
    }

    for (index, row) in result.rows.iter().enumerate() {
        let row_num = u32::try_from(index + 1)
            .map_err(|_| ReportError::export("too many rows for a worksheet"))?;

        for (col, value) in row.iter().enumerate() {
            let col = col_num(col)?;
            match value {
                Value::Null => {}
                Value::Bool(b) => {
                    worksheet.write_boolean(row_num, col, *b).map_err(export_err)?;
                }
                Value::Int(i) => {
                    worksheet
                        .write_number(row_num, col, *i as f64)
                        .map_err(export_err)?;
                }
                Value::Float(f) => {
                    worksheet.write_number(row_num, col, *f).map_err(export_err)?;
                }
                other => {
                    let text = cell_text(other).unwrap_or_default();
                    worksheet
                        .write_string(row_num, col, text)
                        .map_err(export_err)?;
                }
            }
        }
    }

    workbook.save(path).map_err(export_err)?;
    Ok(())
}

fn col_num(col: usize) -> Result<u16> {
    u16::try_from(col).map_err(|_| ReportError::export("too many columns for a worksheet"))
}
