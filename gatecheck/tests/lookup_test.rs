//! Event lookup integration tests.
//!
//! Run with: `cargo test --test lookup_test`

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use gatecheck::{EventDirectory, EventLookup};
use gatecheck_core::store::{StoreError, StoredTicket, TicketFilter};
use gatecheck_testing::{stored_ticket, InMemoryTicketStore, ScriptedTicketStore};
use std::sync::Arc;

#[tokio::test]
async fn test_event_found_on_later_page() {
    let store = InMemoryTicketStore::new(2)
        .with_row(stored_ticket("T-1", "EVT-0", "a@example.com"))
        .with_row(stored_ticket("T-2", "EVT-0", "b@example.com"))
        .with_row(StoredTicket {
            venue_address: Some("Main Hall, 1 Harbour Road".to_string()),
            event_date: Some("2025-06-01T19:00:00Z".to_string()),
            event_thumbnail: Some("https://cdn.example.com/poster.png".to_string()),
            ..stored_ticket("T-3", "EVT-7", "c@example.com")
        });
    let store = Arc::new(store);
    let directory = EventDirectory::new(store.clone());

    let lookup = directory.lookup_event("EVT-7").await;

    let summary = lookup.summary().expect("event should be found");
    assert_eq!(summary.event_id, "EVT-7");
    assert_eq!(summary.name, "Event EVT-7");
    assert_eq!(summary.venue, "Main Hall, 1 Harbour Road");
    assert_eq!(summary.start_date, "2025-06-01T19:00:00Z");
    assert_eq!(summary.description, "Event at Main Hall, 1 Harbour Road");
    assert_eq!(
        summary.poster_url.as_deref(),
        Some("https://cdn.example.com/poster.png")
    );

    let calls = store.list_calls();
    assert_eq!(calls.len(), 2);
    assert!(calls
        .iter()
        .all(|call| call.filter == TicketFilter::OwningEvent("EVT-7".to_string())));
}

#[tokio::test]
async fn test_missing_details_use_defaults() {
    let store = InMemoryTicketStore::new(10).with_row(StoredTicket {
        owner_event_id: Some("EVT-3".to_string()),
        venue_address: Some(String::new()),
        ..StoredTicket::default()
    });

    let lookup = EventDirectory::new(Arc::new(store)).lookup_event("EVT-3").await;

    let summary = lookup.summary().unwrap();
    assert_eq!(summary.venue, "Venue not specified");
    assert_eq!(summary.start_date, "Date not specified");
    assert_eq!(summary.description, "Event at venue location");
    assert!(summary.poster_url.is_none());
}

#[tokio::test]
async fn test_unknown_event_is_not_found() {
    let store = InMemoryTicketStore::new(2)
        .with_row(stored_ticket("T-1", "EVT-1", "a@example.com"))
        .with_row(stored_ticket("T-2", "EVT-1", "b@example.com"))
        .with_row(stored_ticket("T-3", "EVT-1", "c@example.com"));

    let lookup = EventDirectory::new(Arc::new(store)).lookup_event("EVT-404").await;

    assert_eq!(lookup, EventLookup::NotFound);
}

#[tokio::test]
async fn test_store_failures_are_reported_as_fetch_failures() {
    let failing = [
        ScriptedTicketStore::new().with_list_error(StoreError::Unauthorized),
        ScriptedTicketStore::new().with_no_data(),
        ScriptedTicketStore::new()
            .with_page(Vec::new(), Some("next"))
            .with_list_error(StoreError::Decode("unexpected end of input".to_string())),
    ];

    for store in failing {
        let lookup = EventDirectory::new(Arc::new(store)).lookup_event("EVT-1").await;

        assert_eq!(
            lookup,
            EventLookup::Failed {
                message: "Failed to fetch event data".to_string()
            }
        );
    }
}

#[tokio::test]
async fn test_lookup_respects_page_cap() {
    let store = ScriptedTicketStore::new().endless();
    let directory = EventDirectory::with_max_pages(Arc::new(store.clone()), 4);

    let lookup = directory.lookup_event("EVT-1").await;

    assert_eq!(lookup, EventLookup::NotFound);
    assert_eq!(store.list_call_count(), 4);
}
