use crate::error::Result;
use panelcount_core::{CellValue, RowSource};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parses comma-separated bytes into a `RowSource`.
///
/// Records may have differing lengths and blank lines are skipped. Whether the
/// first line is a header is decided by `RowSource::from_table`.
pub fn parse_csv(data: &[u8]) -> Result<RowSource> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record?;
        let row: Vec<CellValue> = record
            .iter()
            .map(|field| CellValue::text(String::from_utf8_lossy(field).into_owned()))
            .collect();
        rows.push(row);
    }

    Ok(RowSource::from_table(rows))
}

#[cfg(test)]
mod tests {
    use super::parse_csv;
    use panelcount_core::{aggregate, normalize_rows, NormalizedRow};

    fn normalized(name: &str, number: &str, user: &str) -> NormalizedRow {
        NormalizedRow {
            contact_name: name.to_string(),
            contact_number: number.to_string(),
            user: user.to_string(),
        }
    }

    #[test]
    fn parses_headered_csv() {
        let data = b"contactName,contactNumber,user\nJuan,+54 9 11-2345-6789,ana\n\nPedro,\"(54) 9 1123456789\",ana\n";
        let source = parse_csv(data).expect("parse");
        assert!(!source.is_positional());
        let rows = normalize_rows(&source);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], normalized("Juan", "+54 9 11-2345-6789", "ana"));

        let out = aggregate(&rows);
        assert_eq!(out.users.len(), 1);
        assert_eq!(out.users[0].contacts, 1);
    }

    #[test]
    fn strips_bom_before_reading_header() {
        let data = b"\xEF\xBB\xBFuser,contactNumber\nana,111\n";
        let rows = normalize_rows(&parse_csv(data).expect("parse"));
        assert_eq!(rows, vec![normalized("", "111", "ana")]);
    }

    #[test]
    fn single_column_first_line_is_read_as_data() {
        let data = b"Juan\nPedro,222,bob\n";
        let source = parse_csv(data).expect("parse");
        assert!(source.is_positional());
        let rows = normalize_rows(&source);
        assert_eq!(rows[1], normalized("Pedro", "222", "bob"));
    }

    #[test]
    fn headerless_csv_keeps_first_contact() {
        let source = parse_csv(b"Juan,111,ana\nPedro,222,bob\n").expect("parse");
        assert!(source.is_positional());
        let out = aggregate(&normalize_rows(&source));
        assert_eq!(out.total_users, 2);
        assert_eq!(out.total_contacts_all, 2);

        let single = normalize_rows(&parse_csv(b"Name,555-1,carol\n").expect("parse"));
        assert_eq!(single, vec![normalized("Name", "555-1", "carol")]);
    }

    #[test]
    fn ragged_rows_are_tolerated() {
        let data = b"contactName,contactNumber,user\nJuan,111\nPedro,222,bob,extra\n";
        let rows = normalize_rows(&parse_csv(data).expect("parse"));
        assert_eq!(
            rows,
            vec![normalized("Juan", "111", ""), normalized("Pedro", "222", "bob")]
        );
    }

    #[test]
    fn empty_input_has_no_rows() {
        let source = parse_csv(b"").expect("parse");
        assert!(source.is_empty());
    }
}
