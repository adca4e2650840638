//! The gate: validation, admission and event lookup over one ticket store.

use crate::admission::AdmissionCommitter;
use crate::lookup::EventDirectory;
use crate::types::{AdmissionResult, TicketReference, ValidationDecision};
use crate::validation::{ValidationConfig, ValidationEngine};
use gatecheck_core::environment::Clock;
use gatecheck_core::store::TicketStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Holder email used when neither the row nor the payload carries one
pub const UNKNOWN_EMAIL: &str = "Unknown";

/// Outcome of a combined validate-and-admit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    /// The validation decision
    pub decision: ValidationDecision,
    /// The admission write, attempted only when the decision was Admit
    pub admission: Option<AdmissionResult>,
}

impl CheckIn {
    /// Whether the holder was validated and the admission was recorded
    #[must_use]
    pub fn is_admitted(&self) -> bool {
        self.admission.as_ref().is_some_and(AdmissionResult::is_success)
    }
}

/// Everything a scanning station needs, sharing one store.
#[derive(Clone)]
pub struct Gate {
    engine: ValidationEngine,
    committer: AdmissionCommitter,
    directory: EventDirectory,
}

impl Gate {
    /// Build the engine, committer and event directory over `store`
    #[must_use]
    pub fn new(store: Arc<dyn TicketStore>, clock: Arc<dyn Clock>, config: ValidationConfig) -> Self {
        Self {
            engine: ValidationEngine::new(Arc::clone(&store), config),
            committer: AdmissionCommitter::new(Arc::clone(&store), clock),
            directory: EventDirectory::with_max_pages(store, config.max_pages),
        }
    }

    /// Validation engine
    #[must_use]
    pub const fn engine(&self) -> &ValidationEngine {
        &self.engine
    }

    /// Admission committer
    #[must_use]
    pub const fn committer(&self) -> &AdmissionCommitter {
        &self.committer
    }

    /// Event directory
    #[must_use]
    pub const fn directory(&self) -> &EventDirectory {
        &self.directory
    }

    /// Validate a parsed reference and, on Admit, record the admission
    /// conditionally on the scan count the validation saw.
    #[tracing::instrument(skip(self, reference), fields(ticket_id = %reference.ticket_id))]
    pub async fn check_in(&self, scanning_event_id: &str, reference: &TicketReference) -> CheckIn {
        let decision = self
            .engine
            .validate(
                scanning_event_id,
                &reference.ticket_id,
                reference.event_id.as_deref(),
            )
            .await;

        let admission = match &decision {
            ValidationDecision::Admit(record) => {
                let email = holder_email(record.customer_email.as_deref(), reference.customer_email.as_deref());
                Some(self.committer.admit_validated(record, email).await)
            },
            ValidationDecision::Reject(_) => None,
        };

        CheckIn {
            decision,
            admission,
        }
    }
}

/// Pick the email to show and admit with: the row's, else the payload's,
/// else [`UNKNOWN_EMAIL`].
#[must_use]
pub fn holder_email<'a>(record_email: Option<&'a str>, qr_email: Option<&'a str>) -> &'a str {
    record_email
        .filter(|email| !email.is_empty())
        .or_else(|| qr_email.filter(|email| !email.is_empty()))
        .unwrap_or(UNKNOWN_EMAIL)
}
