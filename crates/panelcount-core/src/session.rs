use crate::domain::{normalize_rows, RowSource};
use crate::rules::{aggregate, Aggregation, ResultRow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Spreadsheet,
}

impl FileFormat {
    pub fn label(self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Spreadsheet => "spreadsheet",
        }
    }
}

/// Result of processing one file. A new file produces a new session; nothing
/// is carried over from the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingSession {
    pub file_name: String,
    pub format: FileFormat,
    pub processed_at: i64,
    pub rows_read: usize,
    #[serde(flatten)]
    pub aggregation: Aggregation,
}

impl ProcessingSession {
    pub fn from_source(
        file_name: impl Into<String>,
        format: FileFormat,
        processed_at: i64,
        source: &RowSource,
    ) -> Self {
        let rows = normalize_rows(source);
        Self {
            file_name: file_name.into(),
            format,
            processed_at,
            rows_read: rows.len(),
            aggregation: aggregate(&rows),
        }
    }

    pub fn results(&self) -> &[ResultRow] {
        &self.aggregation.users
    }

    pub fn is_empty(&self) -> bool {
        self.aggregation.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{FileFormat, ProcessingSession};
    use crate::domain::{CellValue, RowSource};

    fn row(cells: &[&str]) -> Vec<CellValue> {
        cells.iter().map(|cell| CellValue::from(*cell)).collect()
    }

    #[test]
    fn session_runs_the_full_pass() {
        let source = RowSource::from_table(vec![
            row(&["contactName", "contactNumber", "user"]),
            row(&["Juan", "111", "ana"]),
            row(&["Juan", "1 1 1", "ana"]),
            row(&["Pedro", "222", "bob"]),
            row(&["", "", "bob"]),
        ]);
        let session = ProcessingSession::from_source("export.csv", FileFormat::Csv, 42, &source);
        assert_eq!(session.rows_read, 4);
        assert_eq!(session.aggregation.skipped_rows, 1);
        assert_eq!(session.aggregation.total_users, 2);
        assert_eq!(session.aggregation.total_contacts_all, 2);
        assert_eq!(session.results()[0].user, "ana");
        assert_eq!(session.processed_at, 42);
    }

    #[test]
    fn session_serializes_totals_at_top_level() {
        let source = RowSource::Positional(vec![row(&["Juan", "111", "ana"])]);
        let session =
            ProcessingSession::from_source("export.xlsx", FileFormat::Spreadsheet, 0, &source);
        let value = serde_json::to_value(&session).expect("serialize");
        assert_eq!(value["format"], "spreadsheet");
        assert_eq!(value["total_users"], 1);
        assert_eq!(value["users"][0]["contacts"], 1);
    }
}
