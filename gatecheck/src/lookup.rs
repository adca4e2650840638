//! Event lookup.
//!
//! The store has no event table; an event is known through its ticket rows.
//! Looking one up pages through rows filtered by owning event id and builds
//! an [`EventSummary`] from the first row found.

use crate::metrics;
use crate::types::{EventLookup, EventSummary};
use crate::validation::DEFAULT_MAX_PAGES;
use gatecheck_core::store::{TicketFilter, TicketStore};
use std::sync::Arc;

const FETCH_FAILED: &str = "Failed to fetch event data";

/// Resolves event ids typed by operators.
#[derive(Clone)]
pub struct EventDirectory {
    store: Arc<dyn TicketStore>,
    max_pages: usize,
}

impl EventDirectory {
    /// Create a directory over `store` with the default page cap
    #[must_use]
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self::with_max_pages(store, DEFAULT_MAX_PAGES)
    }

    /// Create a directory with an explicit page cap
    #[must_use]
    pub fn with_max_pages(store: Arc<dyn TicketStore>, max_pages: usize) -> Self {
        Self { store, max_pages }
    }

    /// Find the event with id `event_id`.
    #[tracing::instrument(skip(self))]
    pub async fn lookup_event(&self, event_id: &str) -> EventLookup {
        let mut next_token: Option<String> = None;

        for page_number in 1..=self.max_pages {
            let page = match self
                .store
                .list_tickets(TicketFilter::OwningEvent(event_id.to_string()), next_token.take())
                .await
            {
                Ok(Some(page)) => page,
                Ok(None) => {
                    tracing::warn!("Event lookup returned no data");
                    return failed();
                },
                Err(error) => {
                    tracing::warn!(%error, "Event lookup failed");
                    return failed();
                },
            };

            metrics::record_store_page();
            tracing::debug!(page_number, items = page.items.len(), "Fetched event page");

            if let Some(row) = page
                .items
                .iter()
                .find(|row| row.owner_event_id.as_deref() == Some(event_id))
            {
                let summary = EventSummary::from_stored(event_id, row);
                tracing::info!(venue = %summary.venue, "Event found");
                return EventLookup::Found(summary);
            }

            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => return EventLookup::NotFound,
            }
        }

        tracing::warn!(
            max_pages = self.max_pages,
            "Page cap reached while looking up event; the store index may be misbehaving"
        );
        metrics::record_page_cap_hit();
        EventLookup::NotFound
    }
}

fn failed() -> EventLookup {
    EventLookup::Failed {
        message: FETCH_FAILED.to_string(),
    }
}
