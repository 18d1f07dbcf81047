pub mod delivery;
pub mod domain;
pub mod error;
pub mod rules;
pub mod session;

pub use delivery::{CollectorEndpoint, CollectorLedger, CollectorRecord, DeliveryPayload};
pub use domain::*;
pub use error::CoreError;
pub use rules::*;
pub use session::{FileFormat, ProcessingSession};
