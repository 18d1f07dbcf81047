use crate::collector::Collector;
use futures::stream::{FuturesUnordered, StreamExt};
use panelcount_core::{DeliveryPayload, ResultRow};
use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum DeliveryOutcome {
    Success,
    Failure(String),
}

impl DeliveryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DeliveryOutcome::Success)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryRecord {
    pub panel: String,
    pub contacts: usize,
    pub outcome: DeliveryOutcome,
}

/// Outcomes of one dispatch, in the order deliveries settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub collector: String,
    pub records: Vec<DeliveryRecord>,
}

impl DeliveryReport {
    pub fn succeeded(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.outcome.is_success())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.records.len() - self.succeeded()
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for DeliveryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.records.is_empty() {
            return write!(f, "nothing to send to {}", self.collector);
        }
        for (idx, record) in self.records.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            match &record.outcome {
                DeliveryOutcome::Success => write!(
                    f,
                    "sent to {}: {} ({})",
                    self.collector, record.panel, record.contacts
                )?,
                DeliveryOutcome::Failure(reason) => write!(
                    f,
                    "failed to send to {}: {} ({})",
                    self.collector, record.panel, reason
                )?,
            }
        }
        Ok(())
    }
}

/// Sends one payload per row to `collector`.
///
/// All deliveries are started together and polled on the current task. A
/// failed delivery is recorded and never retried; it does not stop the others.
pub async fn dispatch<C: Collector>(collector: &C, rows: &[ResultRow]) -> DeliveryReport {
    let mut pending: FuturesUnordered<_> = rows
        .iter()
        .map(|row| async move {
            let payload = DeliveryPayload::from(row);
            let outcome = match collector.deliver(&payload).await {
                Ok(()) => DeliveryOutcome::Success,
                Err(err) => DeliveryOutcome::Failure(err.to_string()),
            };
            DeliveryRecord {
                panel: row.user.clone(),
                contacts: row.contacts,
                outcome,
            }
        })
        .collect();

    let mut records = Vec::with_capacity(rows.len());
    while let Some(record) = pending.next().await {
        match &record.outcome {
            DeliveryOutcome::Success => info!(
                collector = collector.name(),
                panel = %record.panel,
                contacts = record.contacts,
                "delivered"
            ),
            DeliveryOutcome::Failure(reason) => warn!(
                collector = collector.name(),
                panel = %record.panel,
                reason = %reason,
                "delivery failed"
            ),
        }
        records.push(record);
    }

    DeliveryReport {
        collector: collector.name().to_string(),
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::{dispatch, DeliveryOutcome};
    use crate::collector::{Collector, DeliveryError, MemoryCollector};
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use panelcount_core::{DeliveryPayload, ResultRow};
    use std::cell::RefCell;

    struct FlakyCollector {
        reject: &'static str,
        attempts: RefCell<Vec<String>>,
    }

    impl Collector for FlakyCollector {
        fn name(&self) -> &str {
            "flaky"
        }

        async fn deliver(&self, payload: &DeliveryPayload) -> Result<(), DeliveryError> {
            self.attempts.borrow_mut().push(payload.panel.clone());
            if payload.panel == self.reject {
                return Err(DeliveryError::Rejected {
                    status: 500,
                    body: String::new(),
                });
            }
            Ok(())
        }
    }

    /// Holds `ana` until `bob` has been delivered.
    struct GatedCollector {
        release: RefCell<Option<oneshot::Sender<()>>>,
        gate: RefCell<Option<oneshot::Receiver<()>>>,
    }

    impl Collector for GatedCollector {
        fn name(&self) -> &str {
            "gate"
        }

        async fn deliver(&self, payload: &DeliveryPayload) -> Result<(), DeliveryError> {
            match payload.panel.as_str() {
                "ana" => {
                    let gate = self.gate.borrow_mut().take();
                    if let Some(gate) = gate {
                        gate.await.map_err(|err| DeliveryError::Transport(err.to_string()))?;
                    }
                }
                "bob" => {
                    if let Some(release) = self.release.borrow_mut().take() {
                        let _ = release.send(());
                    }
                }
                _ => {}
            }
            Ok(())
        }
    }

    fn rows() -> Vec<ResultRow> {
        vec![
            ResultRow {
                user: "ana".to_string(),
                contacts: 3,
            },
            ResultRow {
                user: "bob".to_string(),
                contacts: 2,
            },
            ResultRow {
                user: "carol".to_string(),
                contacts: 1,
            },
        ]
    }

    #[test]
    fn one_failure_does_not_stop_the_batch() {
        let collector = FlakyCollector {
            reject: "bob",
            attempts: RefCell::new(Vec::new()),
        };
        let report = block_on(dispatch(&collector, &rows()));

        assert_eq!(report.records.len(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 1);
        let bob = report
            .records
            .iter()
            .find(|record| record.panel == "bob")
            .expect("bob");
        assert_eq!(
            bob.outcome,
            DeliveryOutcome::Failure("collector responded with status 500".to_string())
        );

        let mut attempts = collector.attempts.borrow().clone();
        attempts.sort();
        assert_eq!(attempts, vec!["ana", "bob", "carol"]);
    }

    #[test]
    fn deliveries_overlap_and_report_in_completion_order() {
        let (release, gate) = oneshot::channel();
        let collector = GatedCollector {
            release: RefCell::new(Some(release)),
            gate: RefCell::new(Some(gate)),
        };
        let rows = rows()[..2].to_vec();
        let report = block_on(dispatch(&collector, &rows));

        assert_eq!(report.failed(), 0);
        let panels: Vec<&str> = report
            .records
            .iter()
            .map(|record| record.panel.as_str())
            .collect();
        assert_eq!(panels, vec!["bob", "ana"]);
        assert_eq!(report.render(), "sent to gate: bob (2)\nsent to gate: ana (3)");
    }

    #[test]
    fn report_renders_one_line_per_row() {
        let collector = FlakyCollector {
            reject: "carol",
            attempts: RefCell::new(Vec::new()),
        };
        let report = block_on(dispatch(&collector, &rows()));
        let rendered = report.render();
        let mut lines: Vec<&str> = rendered.lines().collect();
        lines.sort();
        assert_eq!(
            lines,
            vec![
                "failed to send to flaky: carol (collector responded with status 500)",
                "sent to flaky: ana (3)",
                "sent to flaky: bob (2)",
            ]
        );
    }

    #[test]
    fn memory_collector_records_every_panel() {
        let collector = MemoryCollector::new("dry-run");
        let report = block_on(dispatch(&collector, &rows()));
        assert_eq!(report.failed(), 0);

        let ledger = collector.ledger();
        assert_eq!(ledger.len(), 3);
        assert_eq!(ledger.get("ana").expect("ana").total_mensajes_hoy, 3);
    }

    #[test]
    fn empty_batch_reports_nothing_sent() {
        let collector = MemoryCollector::new("dry-run");
        let report = block_on(dispatch(&collector, &[]));
        assert!(report.records.is_empty());
        assert_eq!(report.render(), "nothing to send to dry-run");
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let value = serde_json::to_value(DeliveryOutcome::Failure("boom".to_string()))
            .expect("serialize");
        assert_eq!(value["status"], "failure");
        assert_eq!(value["reason"], "boom");
    }
}
