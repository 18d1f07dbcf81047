use crate::domain::cell::CellValue;
use serde::{Deserialize, Serialize};

pub const CONTACT_NAME_HEADER: &str = "contactName";
pub const CONTACT_NUMBER_HEADER: &str = "contactNumber";
pub const USER_HEADER: &str = "user";

/// The three columns a contact export carries, in positional order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Number,
    User,
}

impl ContactField {
    pub const ALL: [ContactField; 3] = [
        ContactField::Name,
        ContactField::Number,
        ContactField::User,
    ];

    pub fn header(self) -> &'static str {
        match self {
            ContactField::Name => CONTACT_NAME_HEADER,
            ContactField::Number => CONTACT_NUMBER_HEADER,
            ContactField::User => USER_HEADER,
        }
    }

    pub fn position(self) -> usize {
        match self {
            ContactField::Name => 0,
            ContactField::Number => 1,
            ContactField::User => 2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub contact_name: CellValue,
    pub contact_number: CellValue,
    pub user: CellValue,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRow {
    pub contact_name: String,
    pub contact_number: String,
    pub user: String,
}

impl From<RawRow> for NormalizedRow {
    fn from(row: RawRow) -> Self {
        Self {
            contact_name: row.contact_name.to_text(),
            contact_number: row.contact_number.to_text(),
            user: row.user.to_text(),
        }
    }
}

/// Shape of a parsed file, decided once for the whole file.
#[derive(Debug, Clone, PartialEq)]
pub enum RowSource {
    Headered {
        header: Vec<String>,
        records: Vec<Vec<CellValue>>,
    },
    Positional(Vec<Vec<CellValue>>),
}

impl RowSource {
    /// Builds a source from a table whose first row may be a header.
    ///
    /// The first row is a header only when it names at least one contact field
    /// and holds more than one field. Otherwise every row, the first included,
    /// is read by position.
    pub fn from_table(mut rows: Vec<Vec<CellValue>>) -> Self {
        if rows.is_empty() {
            return RowSource::Positional(Vec::new());
        }

        let header: Vec<String> = rows[0]
            .iter()
            .map(|cell| cell.to_text().trim().to_string())
            .collect();
        let field_count = header.iter().filter(|name| !name.is_empty()).count();
        let recognized = header.iter().any(|name| {
            ContactField::ALL
                .iter()
                .any(|field| name == field.header())
        });

        if !recognized || field_count <= 1 {
            return RowSource::Positional(rows);
        }

        let records = rows.split_off(1);
        RowSource::Headered { header, records }
    }

    pub fn is_positional(&self) -> bool {
        matches!(self, RowSource::Positional(_))
    }

    pub fn len(&self) -> usize {
        match self {
            RowSource::Headered { records, .. } => records.len(),
            RowSource::Positional(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column index each contact field is read from, in `ContactField::ALL` order.
    pub fn columns(&self) -> [usize; 3] {
        ContactField::ALL.map(|field| match self {
            RowSource::Headered { header, .. } => header
                .iter()
                .position(|name| name == field.header())
                .unwrap_or(field.position()),
            RowSource::Positional(_) => field.position(),
        })
    }

    pub fn raw_rows(&self) -> Vec<RawRow> {
        let [name, number, user] = self.columns();
        let records = match self {
            RowSource::Headered { records, .. } => records,
            RowSource::Positional(records) => records,
        };
        records
            .iter()
            .map(|record| RawRow {
                contact_name: cell_at(record, name),
                contact_number: cell_at(record, number),
                user: cell_at(record, user),
            })
            .collect()
    }
}

fn cell_at(record: &[CellValue], index: usize) -> CellValue {
    record.get(index).cloned().unwrap_or_default()
}

/// Converts every record into a `NormalizedRow`, keeping input order and
/// passing malformed rows through untouched.
pub fn normalize_rows(source: &RowSource) -> Vec<NormalizedRow> {
    source
        .raw_rows()
        .into_iter()
        .map(NormalizedRow::from)
        .collect()
}
