use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("panel is required")]
    EmptyPanel,
    #[error("invalid collector name: {0}")]
    InvalidCollectorName(String),
    #[error("invalid collector path: {0}")]
    InvalidCollectorPath(String),
}
