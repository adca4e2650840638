//! Wire row normalization.
//!
//! The store returns counters as strings or numbers and the validity flag as
//! a boolean or a string. Everything loosely typed is resolved here so the
//! decision logic only ever sees a [`TicketRecord`].

use crate::types::{EventSummary, TicketRecord, Validity};
use gatecheck_core::store::StoredTicket;
use serde_json::Value;

/// Scan count when the row has none (or an unreadable one)
pub const DEFAULT_SCAN_COUNT: u32 = 0;

/// Scan limit when the row has none (or an unreadable one)
pub const DEFAULT_MAX_SCANS: u32 = 1;

impl TicketRecord {
    /// Decode a wire row, applying the documented defaults.
    #[must_use]
    pub fn from_stored(row: StoredTicket) -> Self {
        Self {
            ticket_id: row.ticket_id.unwrap_or_default(),
            owner_event_id: row.owner_event_id,
            customer_email: non_empty(row.customer_email),
            status: row.status,
            scan_count: parse_count(row.scan_count.as_ref()).unwrap_or(DEFAULT_SCAN_COUNT),
            max_scans: parse_count(row.max_scans.as_ref()).unwrap_or(DEFAULT_MAX_SCANS),
            validity: parse_validity(row.is_valid.as_ref()),
            last_scanned_at: row.last_scanned_at,
        }
    }
}

impl EventSummary {
    /// Summarise an event from one of its ticket rows.
    #[must_use]
    pub fn from_stored(event_id: &str, row: &StoredTicket) -> Self {
        let venue = non_empty(row.venue_address.clone());
        let description = format!(
            "Event at {}",
            venue.as_deref().unwrap_or("venue location")
        );

        Self {
            event_id: row
                .owner_event_id
                .clone()
                .unwrap_or_else(|| event_id.to_string()),
            name: format!("Event {event_id}"),
            venue: venue.unwrap_or_else(|| "Venue not specified".to_string()),
            start_date: non_empty(row.event_date.clone())
                .unwrap_or_else(|| "Date not specified".to_string()),
            poster_url: non_empty(row.event_thumbnail.clone()),
            description,
        }
    }
}

/// Read a non-negative integer counter from a string or number.
fn parse_count(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        _ => None,
    }
}

fn parse_validity(value: Option<&Value>) -> Validity {
    match value {
        Some(Value::Bool(true)) => Validity::Valid,
        Some(Value::Bool(false)) => Validity::Invalid,
        Some(Value::String(s)) if s == "true" => Validity::Valid,
        Some(Value::String(s)) if s == "false" => Validity::Invalid,
        _ => Validity::Unspecified,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
