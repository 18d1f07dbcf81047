use crate::error::CoreError;
use crate::rules::ResultRow;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_COLLECTOR_PATH: &str = "/ayer";
pub const DEFAULT_ORIGIN: &str = "whaticket";

/// Body posted to a collector for one panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryPayload {
    pub panel: String,
    #[serde(rename = "contactos_unicos")]
    pub unique_contacts: u64,
}

impl DeliveryPayload {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.panel.trim().is_empty() {
            return Err(CoreError::EmptyPanel);
        }
        Ok(())
    }
}

impl From<&ResultRow> for DeliveryPayload {
    fn from(row: &ResultRow) -> Self {
        Self {
            panel: row.user.clone(),
            unique_contacts: row.contacts as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorEndpoint {
    pub name: String,
    pub base_url: String,
    pub path: String,
}

impl CollectorEndpoint {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        path: Option<String>,
    ) -> Result<Self, CoreError> {
        let name: String = name.into();
        let name = name.trim();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidCollectorName(name.to_string()));
        }
        let path = path.unwrap_or_else(|| DEFAULT_COLLECTOR_PATH.to_string());
        if !path.starts_with('/') {
            return Err(CoreError::InvalidCollectorPath(path));
        }
        Ok(Self {
            name: name.to_string(),
            base_url: base_url.into(),
            path,
        })
    }
}

/// A collector's stored entry for one panel. Fields other than the three
/// known ones are kept as-is across updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorRecord {
    pub panel: String,
    pub total_mensajes_hoy: u64,
    pub detalle_por_origen: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Upsert list of collector records keyed by panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectorLedger {
    records: Vec<CollectorRecord>,
}

impl CollectorLedger {
    pub fn new(records: Vec<CollectorRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[CollectorRecord] {
        &self.records
    }

    pub fn get(&self, panel: &str) -> Option<&CollectorRecord> {
        self.records.iter().find(|record| record.panel == panel)
    }

    pub fn apply(
        &mut self,
        payload: &DeliveryPayload,
        origin: &str,
    ) -> Result<&CollectorRecord, CoreError> {
        payload.validate()?;
        let existing = self
            .records
            .iter()
            .position(|record| record.panel == payload.panel);
        let index = match existing {
            Some(index) => {
                let record = &mut self.records[index];
                record.total_mensajes_hoy = payload.unique_contacts;
                record.detalle_por_origen = vec![origin.to_string()];
                index
            }
            None => {
                self.records.push(CollectorRecord {
                    panel: payload.panel.clone(),
                    total_mensajes_hoy: payload.unique_contacts,
                    detalle_por_origen: vec![origin.to_string()],
                    extra: Map::new(),
                });
                self.records.len() - 1
            }
        };
        Ok(&self.records[index])
    }

    /// Daily reset performed by the collector's housekeeping job.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
