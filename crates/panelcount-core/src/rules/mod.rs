pub mod aggregate;

pub use aggregate::{aggregate, Aggregation, ResultRow};
