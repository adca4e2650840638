//! Ticket validation engine.
//!
//! A validation runs the security checks in a fixed order and stops at the
//! first one that fails:
//!
//! 1. The event named in the QR payload (if any) must be the scanning event.
//!    This check needs no store call.
//! 2. The ticket must exist for the scanning event. Pages of rows filtered by
//!    ticket id are fetched until a row for the scanning event turns up, a row
//!    for another event proves the ticket belongs elsewhere, or pagination
//!    ends (bounded by [`ValidationConfig::max_pages`]).
//! 3. Business rules on the matched row: not inactive, scans left, not
//!    flagged invalid.
//!
//! Every failure, including store errors and panics inside the call, comes
//! back as a [`ValidationDecision::Reject`]; nothing propagates.

use crate::metrics;
use crate::types::{Rejection, TicketRecord, ValidationDecision, Validity, Violation};
use futures::FutureExt;
use gatecheck_core::store::{StoreError, StoredTicket, TicketFilter, TicketStore};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

/// Default page cap for paginated store lookups
pub const DEFAULT_MAX_PAGES: usize = 50;

/// Engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationConfig {
    /// Maximum number of list pages fetched per lookup
    pub max_pages: usize,
    /// Reject tickets whose validity flag is absent instead of admitting them
    pub require_explicit_validity: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            require_explicit_validity: false,
        }
    }
}

/// Validates tickets against the remote store.
#[derive(Clone)]
pub struct ValidationEngine {
    store: Arc<dyn TicketStore>,
    config: ValidationConfig,
}

impl ValidationEngine {
    /// Create an engine over `store`
    #[must_use]
    pub fn new(store: Arc<dyn TicketStore>, config: ValidationConfig) -> Self {
        Self { store, config }
    }

    /// Engine settings
    #[must_use]
    pub const fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Decide whether `ticket_id` may enter `scanning_event_id`.
    ///
    /// `qr_event_id` is the event named by the scanned payload, when it named
    /// one.
    #[tracing::instrument(skip(self), fields(decision = tracing::field::Empty))]
    pub async fn validate(
        &self,
        scanning_event_id: &str,
        ticket_id: &str,
        qr_event_id: Option<&str>,
    ) -> ValidationDecision {
        let started = Instant::now();

        let decision = AssertUnwindSafe(self.run_checks(scanning_event_id, ticket_id, qr_event_id))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                tracing::error!("Validation panicked");
                system_error()
            });

        metrics::record_validation(decision.outcome_label(), started.elapsed().as_secs_f64());
        tracing::Span::current().record("decision", decision.outcome_label());

        match &decision {
            ValidationDecision::Admit(_) => tracing::info!("Ticket admitted by validation"),
            ValidationDecision::Reject(rejection) if rejection.violation.is_store_failure() => {
                tracing::warn!(violation = %rejection.violation, message = %rejection.message, "Validation failed on store access");
            },
            ValidationDecision::Reject(rejection) => {
                tracing::info!(violation = %rejection.violation, "Ticket rejected");
            },
        }

        decision
    }

    async fn run_checks(
        &self,
        scanning_event_id: &str,
        ticket_id: &str,
        qr_event_id: Option<&str>,
    ) -> ValidationDecision {
        if let Some(qr_event_id) = qr_event_id.filter(|id| *id != scanning_event_id) {
            return ValidationDecision::Reject(Rejection::new(
                Violation::EventIdMismatch,
                format!(
                    "Security Check Failed: This ticket is for event \"{qr_event_id}\" but you are scanning for event \"{scanning_event_id}\""
                ),
            ));
        }

        match self.find_ticket(scanning_event_id, ticket_id).await {
            Ok(record) => self.check_rules(record),
            Err(rejection) => ValidationDecision::Reject(rejection),
        }
    }

    /// Paginate rows for `ticket_id` until ownership is settled.
    async fn find_ticket(
        &self,
        scanning_event_id: &str,
        ticket_id: &str,
    ) -> Result<TicketRecord, Rejection> {
        let mut next_token: Option<String> = None;

        for page_number in 1..=self.config.max_pages {
            let page = match self
                .store
                .list_tickets(TicketFilter::TicketId(ticket_id.to_string()), next_token.take())
                .await
            {
                Ok(Some(page)) => page,
                Ok(None) => {
                    return Err(Rejection::new(
                        Violation::NoData,
                        "Security Check Failed: The ticket service returned no data",
                    ));
                },
                Err(error) => return Err(store_rejection(&error)),
            };

            metrics::record_store_page();
            tracing::debug!(
                page_number,
                items = page.items.len(),
                has_next = page.next_token.is_some(),
                "Fetched ticket page"
            );

            let mut candidates: Vec<StoredTicket> = page
                .items
                .into_iter()
                .filter(|row| row.ticket_id.as_deref() == Some(ticket_id))
                .collect();

            if let Some(position) = candidates
                .iter()
                .position(|row| row.owner_event_id.as_deref() == Some(scanning_event_id))
            {
                return Ok(TicketRecord::from_stored(candidates.swap_remove(position)));
            }

            if let Some(row) = candidates.into_iter().next() {
                let record = TicketRecord::from_stored(row);
                let owner = record.owner_event_id.clone().unwrap_or_default();
                return Err(Rejection::with_ticket(
                    Violation::WrongEvent,
                    format!(
                        "Security Check Failed: This ticket belongs to event \"{owner}\" but you are scanning for event \"{scanning_event_id}\""
                    ),
                    record,
                ));
            }

            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => return Err(not_found()),
            }
        }

        tracing::warn!(
            max_pages = self.config.max_pages,
            "Page cap reached while looking up ticket; the store index may be misbehaving"
        );
        metrics::record_page_cap_hit();
        Err(not_found())
    }

    /// Business rules on a row that belongs to the scanning event.
    fn check_rules(&self, record: TicketRecord) -> ValidationDecision {
        if record.is_inactive() {
            return ValidationDecision::Reject(Rejection::with_ticket(
                Violation::TicketInactive,
                "This ticket is inactive and cannot be used for entry",
                record,
            ));
        }

        if record.is_used_up() {
            let message = format!(
                "This ticket has already been used ({}/{} scans)",
                record.scan_count, record.max_scans
            );
            return ValidationDecision::Reject(Rejection::with_ticket(
                Violation::TicketAlreadyUsed,
                message,
                record,
            ));
        }

        let invalid = match record.validity {
            Validity::Invalid => true,
            Validity::Unspecified => self.config.require_explicit_validity,
            Validity::Valid => false,
        };
        if invalid {
            return ValidationDecision::Reject(Rejection::with_ticket(
                Violation::TicketMarkedInvalid,
                "This ticket has been marked as invalid",
                record,
            ));
        }

        ValidationDecision::Admit(record)
    }
}

fn store_rejection(error: &StoreError) -> Rejection {
    if error.is_reported_by_store() {
        Rejection::new(
            Violation::ApiError,
            format!("Unable to verify ticket with the ticket service: {error}"),
        )
    } else {
        tracing::error!(%error, "Unusable response from ticket store");
        Rejection::new(
            Violation::SystemError,
            "Security validation failed due to system error",
        )
    }
}

fn not_found() -> Rejection {
    Rejection::new(
        Violation::TicketNotFound,
        "Security Check Failed: This ticket does not exist in our database",
    )
}

fn system_error() -> ValidationDecision {
    ValidationDecision::Reject(Rejection::new(
        Violation::SystemError,
        "Security validation failed due to system error",
    ))
}
