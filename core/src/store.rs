//! Ticket store trait and related types.
//!
//! The ticket store is the external, remotely owned table of sold tickets.
//! The gate-check engine reads it through a filtered, paginated list query
//! and writes to it through a single update mutation. Nothing here caches
//! rows: every call goes to the store.
//!
//! # Implementations
//!
//! - `AppSyncTicketStore` (in `gatecheck-appsync`): Production GraphQL client
//! - `ScriptedTicketStore` (in `gatecheck-testing`): Deterministic test double
//!
//! # Example
//!
//! ```no_run
//! use gatecheck_core::store::{StoreError, TicketFilter, TicketStore};
//!
//! async fn first_page<S: TicketStore>(store: &S) -> Result<usize, StoreError> {
//!     let page = store
//!         .list_tickets(TicketFilter::TicketId("T-1001".to_string()), None)
//!         .await?;
//!     Ok(page.map_or(0, |page| page.items.len()))
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by [`TicketStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Errors that can occur while talking to the ticket store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The request never produced a response (connection refused, timeout, TLS).
    #[error("Request failed: {0}")]
    Transport(String),

    /// The store rejected our credentials.
    #[error("Unauthorized - check the ticket store API key")]
    Unauthorized,

    /// Non-success HTTP status.
    #[error("API error (status {status}): {message}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// The store answered with GraphQL errors and no data.
    #[error("Store reported errors: {0}")]
    Api(String),

    /// A conditional update was rejected because the stored row changed.
    #[error("Condition check failed: {0}")]
    ConditionFailed(String),

    /// The response body could not be decoded.
    #[error("Response parsing failed: {0}")]
    Decode(String),
}

impl StoreError {
    /// Whether the store itself reported the failure, as opposed to the
    /// response being unusable on our side.
    #[must_use]
    pub const fn is_reported_by_store(&self) -> bool {
        !matches!(self, Self::Decode(_))
    }
}

/// Filter for the list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketFilter {
    /// Rows whose ticket identifier equals the value.
    TicketId(String),
    /// Rows whose owning event identifier equals the value.
    OwningEvent(String),
}

/// A row as the store returns it.
///
/// Field names follow the store schema. Counters and flags are kept as raw
/// JSON values because the store has returned them as strings, numbers and
/// booleans at different times; decoding into strong types happens in the
/// application crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredTicket {
    /// Ticket identifier
    #[serde(rename = "TicketID", default)]
    pub ticket_id: Option<String>,
    /// Owning event identifier (the partition key of the event index)
    #[serde(rename = "GSI1PK", default)]
    pub owner_event_id: Option<String>,
    /// Email of the ticket holder
    #[serde(rename = "CustomerEmail", default)]
    pub customer_email: Option<String>,
    /// Free-form status ("inactive", "scanned", ...)
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    /// Number of times the ticket was admitted
    #[serde(rename = "ScanCount", default)]
    pub scan_count: Option<Value>,
    /// Maximum admissions allowed
    #[serde(rename = "MaxScans", default)]
    pub max_scans: Option<Value>,
    /// Validity flag (boolean or string)
    #[serde(rename = "IsValid", default)]
    pub is_valid: Option<Value>,
    /// Timestamp of the last admission
    #[serde(rename = "LastScannedAt", default)]
    pub last_scanned_at: Option<String>,
    /// Event poster URL
    #[serde(rename = "EventThumbnail", default)]
    pub event_thumbnail: Option<String>,
    /// Event venue address
    #[serde(rename = "VenueAddress", default)]
    pub venue_address: Option<String>,
    /// Event start date
    #[serde(rename = "EventDate", default)]
    pub event_date: Option<String>,
}

/// One page of a list query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicketPage {
    /// Rows on this page (may be empty even when more pages follow)
    #[serde(default)]
    pub items: Vec<StoredTicket>,
    /// Continuation token for the next page
    #[serde(rename = "nextToken", default)]
    pub next_token: Option<String>,
}

/// Store-side guard attached to an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateCondition {
    /// Only apply the update if the stored scan count still equals the
    /// value read during validation (absent counts as zero).
    ScanCountUnchanged {
        /// Scan count observed by the validation step
        observed: u32,
    },
}

/// State-changing write marking a ticket consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketUpdate {
    /// Ticket identifier (key)
    pub ticket_id: String,
    /// Customer email (key)
    pub customer_email: String,
    /// New status
    pub status: String,
    /// New scan count, as the store keeps it
    pub scan_count: String,
    /// RFC 3339 admission timestamp
    pub last_scanned_at: String,
    /// Optional guard evaluated atomically by the store
    pub condition: Option<UpdateCondition>,
}

/// Ticket store abstraction.
///
/// # Dyn Compatibility
///
/// This trait uses explicit `Pin<Box<dyn Future>>` returns instead of `async fn`
/// so it can be shared as `Arc<dyn TicketStore>` and captured by effects.
pub trait TicketStore: Send + Sync {
    /// Fetch one page of rows matching `filter`.
    ///
    /// Returns `Ok(None)` when the store answered without a data payload.
    ///
    /// # Errors
    ///
    /// Transport, HTTP, API-reported and decoding failures.
    fn list_tickets(
        &self,
        filter: TicketFilter,
        next_token: Option<String>,
    ) -> StoreFuture<'_, Option<TicketPage>>;

    /// Apply an update and return the updated row.
    ///
    /// Returns `Ok(None)` when the store answered without a row.
    ///
    /// # Errors
    ///
    /// `ConditionFailed` when the update's condition did not hold, otherwise
    /// the same failures as [`TicketStore::list_tickets`].
    fn update_ticket(&self, update: TicketUpdate) -> StoreFuture<'_, Option<StoredTicket>>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn stored_ticket_accepts_mixed_wire_types() {
        let json = r#"{
            "TicketID": "T-1",
            "GSI1PK": "EVT-1",
            "ScanCount": "0",
            "MaxScans": 2,
            "IsValid": "false"
        }"#;

        let ticket: StoredTicket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.ticket_id.as_deref(), Some("T-1"));
        assert_eq!(ticket.scan_count, Some(Value::String("0".to_string())));
        assert_eq!(ticket.max_scans, Some(Value::from(2)));
        assert!(ticket.customer_email.is_none());
    }

    #[test]
    fn page_defaults_missing_fields() {
        let page: TicketPage = serde_json::from_str(r#"{"items": []}"#).unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_token.is_none());
    }

    #[test]
    fn decode_errors_are_not_reported_by_store() {
        assert!(!StoreError::Decode("bad json".to_string()).is_reported_by_store());
        assert!(StoreError::Api("boom".to_string()).is_reported_by_store());
        assert!(StoreError::Unauthorized.is_reported_by_store());
    }

    #[test]
    fn http_error_display() {
        let error = StoreError::Http {
            status: 502,
            message: "bad gateway".to_string(),
        };
        let display = format!("{error}");
        assert!(display.contains("502"));
        assert!(display.contains("bad gateway"));
    }
}
