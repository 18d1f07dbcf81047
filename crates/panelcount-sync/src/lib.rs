pub mod collector;
pub mod csv_file;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod source;
pub mod spreadsheet;

pub use collector::{Collector, DeliveryError, MemoryCollector};
pub use dispatch::{dispatch, DeliveryOutcome, DeliveryRecord, DeliveryReport};
pub use error::{Result, SyncError};
pub use http::{HttpCollector, HttpOptions};
pub use source::{detect_format, load_session, parse_table};
