use crate::error::Result;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use panelcount_core::{CellValue, RowSource};
use std::io::Cursor;
use tracing::debug;

/// Reads the first worksheet of an XLSX/XLS workbook.
///
/// The first row is always treated as a header and dropped; the remaining rows
/// are read by position.
pub fn parse_spreadsheet(data: &[u8]) -> Result<RowSource> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(data.to_vec()))?;
    let Some(range) = workbook.worksheet_range_at(0) else {
        debug!("workbook has no worksheets");
        return Ok(RowSource::Positional(Vec::new()));
    };
    let range = range?;

    // Ranges start at the first used cell; pad so column indexes match the sheet.
    let leading = range.start().map(|(_, col)| col as usize).unwrap_or(0);
    let rows = range
        .rows()
        .skip(1)
        .map(|row| {
            let mut cells = vec![CellValue::Empty; leading];
            cells.extend(row.iter().map(cell_value));
            cells
        })
        .collect();

    Ok(RowSource::Positional(rows))
}

#[allow(unreachable_patterns)]
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(value) => CellValue::text(value.clone()),
        Data::Int(value) => CellValue::Integer(*value),
        Data::Float(value) => CellValue::Float(*value),
        Data::Bool(value) => CellValue::Text(value.to_string()),
        Data::DateTime(value) => CellValue::Float(value.as_f64()),
        Data::DateTimeIso(value) | Data::DurationIso(value) => CellValue::text(value.clone()),
        Data::Error(err) => CellValue::Text(err.to_string()),
        _ => CellValue::Empty,
    }
}
