//! Admission committer.
//!
//! Marks a validated ticket consumed with one update keyed by ticket id and
//! customer email. [`AdmissionCommitter::admit`] writes unconditionally;
//! [`AdmissionCommitter::admit_validated`] attaches a store-side condition
//! on the scan count the validation observed, so two gates admitting the
//! same ticket at once cannot both succeed.

use crate::metrics;
use crate::types::{AdmissionResult, TicketRecord};
use gatecheck_core::environment::Clock;
use gatecheck_core::store::{StoreError, TicketStore, TicketUpdate, UpdateCondition};
use std::sync::Arc;

/// Writes admissions to the remote store.
#[derive(Clone)]
pub struct AdmissionCommitter {
    store: Arc<dyn TicketStore>,
    clock: Arc<dyn Clock>,
}

impl AdmissionCommitter {
    /// Create a committer over `store`, timestamping with `clock`
    #[must_use]
    pub fn new(store: Arc<dyn TicketStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Mark the ticket scanned with a scan count of one.
    ///
    /// Does not re-validate and does not guard against concurrent writers.
    #[tracing::instrument(skip(self))]
    pub async fn admit(&self, ticket_id: &str, customer_email: &str) -> AdmissionResult {
        let update = self.update(ticket_id, customer_email, 1, None);
        self.commit(update).await
    }

    /// Mark a validated ticket scanned, provided nobody admitted it since.
    ///
    /// The scan count becomes `record.scan_count + 1`, and the store applies
    /// the write only if its scan count still equals `record.scan_count`.
    #[tracing::instrument(skip(self, record), fields(ticket_id = %record.ticket_id, observed = record.scan_count))]
    pub async fn admit_validated(
        &self,
        record: &TicketRecord,
        customer_email: &str,
    ) -> AdmissionResult {
        let update = self.update(
            &record.ticket_id,
            customer_email,
            record.scan_count.saturating_add(1),
            Some(UpdateCondition::ScanCountUnchanged {
                observed: record.scan_count,
            }),
        );
        self.commit(update).await
    }

    fn update(
        &self,
        ticket_id: &str,
        customer_email: &str,
        scan_count: u32,
        condition: Option<UpdateCondition>,
    ) -> TicketUpdate {
        TicketUpdate {
            ticket_id: ticket_id.to_string(),
            customer_email: customer_email.to_string(),
            status: TicketRecord::SCANNED.to_string(),
            scan_count: scan_count.to_string(),
            last_scanned_at: self.clock.now().to_rfc3339(),
            condition,
        }
    }

    async fn commit(&self, update: TicketUpdate) -> AdmissionResult {
        let ticket_id = update.ticket_id.clone();

        match self.store.update_ticket(update).await {
            Ok(Some(row)) => {
                metrics::record_admission("admitted");
                tracing::info!(%ticket_id, "Ticket admitted");
                AdmissionResult::Admitted {
                    ticket: TicketRecord::from_stored(row),
                }
            },
            Ok(None) => {
                metrics::record_admission("failed");
                tracing::warn!(%ticket_id, "Store returned no row for admission");
                AdmissionResult::Failed {
                    message: "Failed to admit ticket: the ticket service returned no updated record"
                        .to_string(),
                }
            },
            Err(StoreError::ConditionFailed(reason)) => {
                metrics::record_admission("conflict");
                tracing::warn!(%ticket_id, %reason, "Admission lost a race with another gate");
                AdmissionResult::Failed {
                    message: format!(
                        "Ticket {ticket_id} was admitted concurrently at another gate"
                    ),
                }
            },
            Err(error) => {
                metrics::record_admission("failed");
                tracing::warn!(%ticket_id, %error, "Admission write failed");
                AdmissionResult::Failed {
                    message: format!("Failed to admit ticket: {error}"),
                }
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Validity;
    use gatecheck_core::store::StoredTicket;
    use gatecheck_testing::{test_clock, ScriptedTicketStore};

    fn committer(store: &ScriptedTicketStore) -> AdmissionCommitter {
        AdmissionCommitter::new(Arc::new(store.clone()), Arc::new(test_clock()))
    }

    fn record(scan_count: u32) -> TicketRecord {
        TicketRecord {
            ticket_id: "T-1".to_string(),
            owner_event_id: Some("EVT-1".to_string()),
            customer_email: Some("fan@example.com".to_string()),
            status: Some("active".to_string()),
            scan_count,
            max_scans: 3,
            validity: Validity::Valid,
            last_scanned_at: None,
        }
    }

    #[tokio::test]
    async fn test_admit_writes_scanned_fields() {
        let store = ScriptedTicketStore::new();

        let result = committer(&store).admit("T-1", "fan@example.com").await;

        assert!(result.is_success());
        let updates = store.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].status, "scanned");
        assert_eq!(updates[0].scan_count, "1");
        assert_eq!(updates[0].last_scanned_at, "2025-01-01T00:00:00+00:00");
        assert_eq!(updates[0].customer_email, "fan@example.com");
        assert!(updates[0].condition.is_none());
    }

    #[tokio::test]
    async fn test_admit_validated_increments_and_guards() {
        let store = ScriptedTicketStore::new();

        let result = committer(&store)
            .admit_validated(&record(2), "fan@example.com")
            .await;

        assert!(result.is_success());
        let update = &store.updates()[0];
        assert_eq!(update.scan_count, "3");
        assert_eq!(
            update.condition,
            Some(UpdateCondition::ScanCountUnchanged { observed: 2 })
        );
        assert_eq!(result.ticket().unwrap().scan_count, 3);
    }

    #[tokio::test]
    async fn test_condition_failure_reports_concurrent_admission() {
        let store = ScriptedTicketStore::new().with_update_result(Err(
            StoreError::ConditionFailed("The conditional request failed".to_string()),
        ));

        let result = committer(&store)
            .admit_validated(&record(0), "fan@example.com")
            .await;

        assert!(!result.is_success());
        assert!(result.error().unwrap().contains("admitted concurrently"));
    }

    #[tokio::test]
    async fn test_missing_row_is_failure() {
        let store = ScriptedTicketStore::new().with_update_result(Ok(None));

        let result = committer(&store).admit("T-1", "fan@example.com").await;

        assert!(!result.is_success());
        assert!(!result.error().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_success_returns_store_row() {
        let store = ScriptedTicketStore::new().with_update_result(Ok(Some(StoredTicket {
            ticket_id: Some("T-1".to_string()),
            status: Some("scanned".to_string()),
            scan_count: Some(serde_json::json!("1")),
            ..StoredTicket::default()
        })));

        let result = committer(&store).admit("T-1", "fan@example.com").await;

        let ticket = result.ticket().unwrap();
        assert_eq!(ticket.status.as_deref(), Some("scanned"));
        assert_eq!(ticket.scan_count, 1);
    }
}
