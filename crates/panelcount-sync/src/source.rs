use crate::csv_file::parse_csv;
use crate::error::{Result, SyncError};
use crate::spreadsheet::parse_spreadsheet;
use panelcount_core::{FileFormat, ProcessingSession, RowSource};
use std::fs;
use std::path::Path;
use tracing::debug;

pub fn detect_format(path: &Path) -> Result<FileFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("csv") => Ok(FileFormat::Csv),
        Some("xlsx") | Some("xls") => Ok(FileFormat::Spreadsheet),
        _ => Err(SyncError::UnsupportedFileType(path.display().to_string())),
    }
}

pub fn parse_table(format: FileFormat, data: &[u8]) -> Result<RowSource> {
    match format {
        FileFormat::Csv => parse_csv(data),
        FileFormat::Spreadsheet => parse_spreadsheet(data),
    }
}

/// Runs one processing pass over a file: detect, parse, normalize, aggregate.
///
/// The file type is checked before anything is read.
pub fn load_session(path: &Path, processed_at: i64) -> Result<ProcessingSession> {
    let format = detect_format(path)?;
    let data = fs::read(path)?;
    let source = parse_table(format, &data)?;
    debug!(
        path = %path.display(),
        format = format.label(),
        positional = source.is_positional(),
        records = source.len(),
        "file parsed"
    );

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(ProcessingSession::from_source(
        file_name,
        format,
        processed_at,
        &source,
    ))
}
