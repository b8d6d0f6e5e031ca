//! CSV writer: header line, comma separator, leading index column.

use super::{cell_text, export_err};
use crate::db::QueryResult;
use crate::error::Result;
use std::path::Path;

pub(super) fn write(result: &QueryResult, path: &Path) -> Result<()> {
    let mut writer = ::csv::WriterBuilder::new()
        .delimiter(b',')
        .from_path(path)
        .map_err(export_err)?;

    // Index column header is empty
    let header = std::iter::once(String::new()).chain(result.column_labels());
    writer.write_record(header).map_err(export_err)?;

    let width = result.column_count();
    for (index, row) in result.rows.iter().enumerate() {
        let cells = (0..width).map(|col| {
            row.get(col)
                .and_then(cell_text)
                .unwrap_or_default()
        });
        let record = std::iter::once(index.to_string()).chain(cells);
        writer.write_record(record).map_err(export_err)?;
    }

    writer.flush().map_err(export_err)?;
    Ok(())
}
