pub mod cell;
pub mod phone;
pub mod row;

pub use cell::CellValue;
pub use phone::normalize_phone;
pub use row::{normalize_rows, ContactField, NormalizedRow, RawRow, RowSource};
