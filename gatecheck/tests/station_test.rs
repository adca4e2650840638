//! Station runtime integration tests.
//!
//! Drives the station through the runtime store with a ticket store that
//! holds list queries until released, so a second scan can arrive while the
//! first is still in flight.
//!
//! Run with: `cargo test --test station_test`

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use gatecheck::station::{station_store, StationAction, StationEnvironment, StationOutcome};
use gatecheck::{EventLookup, EventSummary, Gate, ValidationConfig};
use gatecheck_core::store::{
    StoreFuture, StoredTicket, TicketFilter, TicketPage, TicketStore, TicketUpdate,
};
use gatecheck_testing::{stored_ticket, test_clock, InMemoryTicketStore};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Ticket store whose list queries wait for [`GatedStore::release`].
struct GatedStore {
    inner: InMemoryTicketStore,
    release: Notify,
    entered: AtomicUsize,
}

impl GatedStore {
    fn new(inner: InMemoryTicketStore) -> Self {
        Self {
            inner,
            release: Notify::new(),
            entered: AtomicUsize::new(0),
        }
    }

    fn release(&self) {
        self.release.notify_one();
    }

    fn entered(&self) -> usize {
        self.entered.load(Ordering::SeqCst)
    }
}

impl TicketStore for GatedStore {
    fn list_tickets(
        &self,
        filter: TicketFilter,
        next_token: Option<String>,
    ) -> StoreFuture<'_, Option<TicketPage>> {
        Box::pin(async move {
            self.entered.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            self.inner.list_tickets(filter, next_token).await
        })
    }

    fn update_ticket(&self, update: TicketUpdate) -> StoreFuture<'_, Option<StoredTicket>> {
        self.inner.update_ticket(update)
    }
}

fn summary(event_id: &str) -> EventSummary {
    EventSummary {
        event_id: event_id.to_string(),
        name: format!("Event {event_id}"),
        venue: "Main Hall".to_string(),
        start_date: "2025-06-01".to_string(),
        poster_url: None,
        description: "Event at Main Hall".to_string(),
    }
}

#[tokio::test]
async fn test_scan_while_validating_is_ignored() {
    let store = Arc::new(GatedStore::new(
        InMemoryTicketStore::new(10)
            .with_row(stored_ticket("T-1", "EVT-1", "a@example.com"))
            .with_row(stored_ticket("T-2", "EVT-1", "b@example.com")),
    ));
    let gate = Gate::new(store.clone(), Arc::new(test_clock()), ValidationConfig::default());
    let station = Arc::new(station_store(StationEnvironment::new(Arc::new(gate))));

    station
        .send(StationAction::EventLookedUp {
            event_id: "EVT-1".to_string(),
            result: EventLookup::Found(summary("EVT-1")),
        })
        .await;

    let first = tokio::spawn({
        let station = Arc::clone(&station);
        async move {
            station
                .send(StationAction::Scan {
                    raw: "T-1".to_string(),
                })
                .await
        }
    });

    while !station.state(|s| s.in_flight).await {
        tokio::task::yield_now().await;
    }

    let reduced = station
        .send(StationAction::Scan {
            raw: "T-2".to_string(),
        })
        .await;
    assert_eq!(reduced, 1);

    store.release();
    assert_eq!(first.await.unwrap(), 2);

    assert_eq!(store.entered(), 1);
    let outcome = station.state(|s| s.outcome.clone()).await;
    let Some(StationOutcome::PendingAdmission { ticket, .. }) = outcome else {
        panic!("expected pending admission, got {outcome:?}");
    };
    assert_eq!(ticket.ticket_id, "T-1");
    assert!(!station.state(|s| s.in_flight).await);
}

#[tokio::test]
async fn test_station_admits_after_release() {
    let store = Arc::new(GatedStore::new(
        InMemoryTicketStore::new(10).with_row(stored_ticket("T-1", "EVT-1", "a@example.com")),
    ));
    let gate = Gate::new(store.clone(), Arc::new(test_clock()), ValidationConfig::default());
    let station = station_store(StationEnvironment::new(Arc::new(gate)));

    station
        .send(StationAction::EventLookedUp {
            event_id: "EVT-1".to_string(),
            result: EventLookup::Found(summary("EVT-1")),
        })
        .await;

    store.release();
    station
        .send(StationAction::EnterTicketNumber {
            number: " T-1 ".to_string(),
        })
        .await;
    station.send(StationAction::ConfirmAdmission).await;

    let outcome = station.state(|s| s.outcome.clone()).await;
    let Some(StationOutcome::Admitted { ticket }) = outcome else {
        panic!("expected admission, got {outcome:?}");
    };
    assert_eq!(ticket.scan_count, 1);
    assert_eq!(ticket.status.as_deref(), Some("scanned"));
}
