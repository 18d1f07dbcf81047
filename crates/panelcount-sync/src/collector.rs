use panelcount_core::delivery::DEFAULT_ORIGIN;
use panelcount_core::{CollectorLedger, DeliveryPayload};
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("collector responded with status {status}{}", body_suffix(.body))]
    Rejected { status: u16, body: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid payload: {0}")]
    Invalid(String),
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        return String::new();
    }
    format!(": {body}")
}

/// A remote service that accepts per-panel contact counts.
pub trait Collector {
    fn name(&self) -> &str;
    fn deliver(
        &self,
        payload: &DeliveryPayload,
    ) -> impl Future<Output = Result<(), DeliveryError>>;
}

/// Collector that applies deliveries to an in-process ledger.
#[derive(Debug)]
pub struct MemoryCollector {
    name: String,
    origin: String,
    ledger: Mutex<CollectorLedger>,
}

impl MemoryCollector {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_ledger(name, DEFAULT_ORIGIN, CollectorLedger::default())
    }

    pub fn with_ledger(
        name: impl Into<String>,
        origin: impl Into<String>,
        ledger: CollectorLedger,
    ) -> Self {
        Self {
            name: name.into(),
            origin: origin.into(),
            ledger: Mutex::new(ledger),
        }
    }

    pub fn ledger(&self) -> CollectorLedger {
        self.ledger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Collector for MemoryCollector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn deliver(&self, payload: &DeliveryPayload) -> Result<(), DeliveryError> {
        let mut ledger = self.ledger.lock().unwrap_or_else(PoisonError::into_inner);
        ledger
            .apply(payload, &self.origin)
            .map(|_| ())
            .map_err(|err| DeliveryError::Invalid(err.to_string()))
    }
}
