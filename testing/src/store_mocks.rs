//! In-memory ticket store doubles
//!
//! Two implementations of [`TicketStore`] for deterministic tests:
//! - [`InMemoryTicketStore`]: a small table with real filtering, pagination
//!   and conditional updates, for end-to-end flows and race scenarios
//! - [`ScriptedTicketStore`]: replays queued responses, for injecting
//!   errors, empty payloads and pathological pagination
//!
//! Both record every call so tests can assert how many round trips a
//! decision cost.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on a poisoned lock

use gatecheck_core::store::{
    StoreError, StoreFuture, StoredTicket, TicketFilter, TicketPage, TicketStore, TicketUpdate,
    UpdateCondition,
};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Build a stored row the way the store usually returns it (counters as strings).
///
/// # Example
///
/// ```
/// use gatecheck_testing::stored_ticket;
///
/// let row = stored_ticket("T-1", "EVT-1", "fan@example.com");
/// assert_eq!(row.ticket_id.as_deref(), Some("T-1"));
/// ```
#[must_use]
pub fn stored_ticket(ticket_id: &str, event_id: &str, email: &str) -> StoredTicket {
    StoredTicket {
        ticket_id: Some(ticket_id.to_string()),
        owner_event_id: Some(event_id.to_string()),
        customer_email: Some(email.to_string()),
        status: Some("active".to_string()),
        scan_count: Some(Value::String("0".to_string())),
        max_scans: Some(Value::String("1".to_string())),
        is_valid: Some(Value::Bool(true)),
        ..StoredTicket::default()
    }
}

/// Recorded list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCall {
    /// Filter sent to the store
    pub filter: TicketFilter,
    /// Continuation token sent to the store
    pub next_token: Option<String>,
}

#[derive(Debug, Default)]
struct TableState {
    rows: Vec<StoredTicket>,
    list_calls: Vec<ListCall>,
    updates: Vec<TicketUpdate>,
}

/// Table-backed ticket store with offset pagination.
///
/// Continuation tokens are the stringified offset of the next row. Pages are
/// cut from the *unfiltered* table and filtered afterwards, the way a
/// scan-with-filter behaves on the real store: a page may come back empty
/// while later pages still hold matches.
///
/// # Example
///
/// ```
/// use gatecheck_testing::{stored_ticket, InMemoryTicketStore};
///
/// let store = InMemoryTicketStore::new(2)
///     .with_row(stored_ticket("T-1", "EVT-1", "a@example.com"));
/// assert_eq!(store.row_count(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct InMemoryTicketStore {
    page_size: usize,
    state: Arc<Mutex<TableState>>,
}

impl InMemoryTicketStore {
    /// Create an empty table returning at most `page_size` scanned rows per page
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            state: Arc::new(Mutex::new(TableState::default())),
        }
    }

    /// Add a row
    #[must_use]
    pub fn with_row(self, row: StoredTicket) -> Self {
        self.state.lock().unwrap().rows.push(row);
        self
    }

    /// Number of rows in the table
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.state.lock().unwrap().rows.len()
    }

    /// Current copy of the row for `ticket_id`
    #[must_use]
    pub fn row(&self, ticket_id: &str) -> Option<StoredTicket> {
        self.state
            .lock()
            .unwrap()
            .rows
            .iter()
            .find(|row| row.ticket_id.as_deref() == Some(ticket_id))
            .cloned()
    }

    /// All list queries received so far
    #[must_use]
    pub fn list_calls(&self) -> Vec<ListCall> {
        self.state.lock().unwrap().list_calls.clone()
    }

    /// All updates received so far, including rejected ones
    #[must_use]
    pub fn updates(&self) -> Vec<TicketUpdate> {
        self.state.lock().unwrap().updates.clone()
    }

    fn matches(filter: &TicketFilter, row: &StoredTicket) -> bool {
        match filter {
            TicketFilter::TicketId(id) => row.ticket_id.as_deref() == Some(id.as_str()),
            TicketFilter::OwningEvent(id) => row.owner_event_id.as_deref() == Some(id.as_str()),
        }
    }

    fn stored_count(row: &StoredTicket) -> u32 {
        match &row.scan_count {
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            Some(Value::Number(n)) => n.as_u64().and_then(|n| u32::try_from(n).ok()).unwrap_or(0),
            _ => 0,
        }
    }
}

impl TicketStore for InMemoryTicketStore {
    fn list_tickets(
        &self,
        filter: TicketFilter,
        next_token: Option<String>,
    ) -> StoreFuture<'_, Option<TicketPage>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.list_calls.push(ListCall {
                filter: filter.clone(),
                next_token: next_token.clone(),
            });

            let offset = match next_token {
                Some(token) => token
                    .parse::<usize>()
                    .map_err(|_| StoreError::Api(format!("invalid nextToken: {token}")))?,
                None => 0,
            };
            let end = (offset + self.page_size).min(state.rows.len());
            let items = state
                .rows
                .get(offset..end)
                .unwrap_or_default()
                .iter()
                .filter(|row| Self::matches(&filter, row))
                .cloned()
                .collect();
            let next_token = (end < state.rows.len()).then(|| end.to_string());

            Ok(Some(TicketPage { items, next_token }))
        })
    }

    fn update_ticket(&self, update: TicketUpdate) -> StoreFuture<'_, Option<StoredTicket>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.updates.push(update.clone());

            let Some(row) = state.rows.iter_mut().find(|row| {
                row.ticket_id.as_deref() == Some(update.ticket_id.as_str())
                    && row.customer_email.as_deref() == Some(update.customer_email.as_str())
            }) else {
                return Err(StoreError::Api(format!(
                    "no ticket {} for {}",
                    update.ticket_id, update.customer_email
                )));
            };

            if let Some(UpdateCondition::ScanCountUnchanged { observed }) = update.condition {
                let current = Self::stored_count(row);
                if current != observed {
                    return Err(StoreError::ConditionFailed(format!(
                        "ScanCount is {current}, expected {observed}"
                    )));
                }
            }

            row.status = Some(update.status);
            row.scan_count = Some(Value::String(update.scan_count));
            row.last_scanned_at = Some(update.last_scanned_at);
            Ok(Some(row.clone()))
        })
    }
}

#[derive(Debug, Default)]
struct ScriptState {
    list_responses: VecDeque<Result<Option<TicketPage>, StoreError>>,
    update_responses: VecDeque<Result<Option<StoredTicket>, StoreError>>,
    endless: bool,
    list_calls: Vec<ListCall>,
    updates: Vec<TicketUpdate>,
}

/// Ticket store that replays queued responses in order.
///
/// When the list queue runs dry it answers with an empty final page, or with
/// an empty page carrying a fresh token if [`ScriptedTicketStore::endless`]
/// was set. When the update queue runs dry it echoes the update back as the
/// updated row.
#[derive(Clone, Debug, Default)]
pub struct ScriptedTicketStore {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedTicketStore {
    /// Create a store with nothing queued
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a page of rows
    #[must_use]
    pub fn with_page(self, items: Vec<StoredTicket>, next_token: Option<&str>) -> Self {
        self.with_list_result(Ok(Some(TicketPage {
            items,
            next_token: next_token.map(str::to_string),
        })))
    }

    /// Queue a response without a data payload
    #[must_use]
    pub fn with_no_data(self) -> Self {
        self.with_list_result(Ok(None))
    }

    /// Queue a list failure
    #[must_use]
    pub fn with_list_error(self, error: StoreError) -> Self {
        self.with_list_result(Err(error))
    }

    /// Queue an arbitrary list result
    #[must_use]
    pub fn with_list_result(self, result: Result<Option<TicketPage>, StoreError>) -> Self {
        self.state.lock().unwrap().list_responses.push_back(result);
        self
    }

    /// Queue an arbitrary update result
    #[must_use]
    pub fn with_update_result(self, result: Result<Option<StoredTicket>, StoreError>) -> Self {
        self.state.lock().unwrap().update_responses.push_back(result);
        self
    }

    /// Keep returning empty pages with a continuation token once the queue is empty
    #[must_use]
    pub fn endless(self) -> Self {
        self.state.lock().unwrap().endless = true;
        self
    }

    /// Number of list queries received
    #[must_use]
    pub fn list_call_count(&self) -> usize {
        self.state.lock().unwrap().list_calls.len()
    }

    /// All list queries received so far
    #[must_use]
    pub fn list_calls(&self) -> Vec<ListCall> {
        self.state.lock().unwrap().list_calls.clone()
    }

    /// All updates received so far
    #[must_use]
    pub fn updates(&self) -> Vec<TicketUpdate> {
        self.state.lock().unwrap().updates.clone()
    }
}

impl TicketStore for ScriptedTicketStore {
    fn list_tickets(
        &self,
        filter: TicketFilter,
        next_token: Option<String>,
    ) -> StoreFuture<'_, Option<TicketPage>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.list_calls.push(ListCall { filter, next_token });
            let call = state.list_calls.len();

            match state.list_responses.pop_front() {
                Some(result) => result,
                None if state.endless => Ok(Some(TicketPage {
                    items: Vec::new(),
                    next_token: Some(format!("page-{call}")),
                })),
                None => Ok(Some(TicketPage::default())),
            }
        })
    }

    fn update_ticket(&self, update: TicketUpdate) -> StoreFuture<'_, Option<StoredTicket>> {
        Box::pin(async move {
            let mut state = self.state.lock().unwrap();
            state.updates.push(update.clone());

            state.update_responses.pop_front().unwrap_or_else(|| {
                Ok(Some(StoredTicket {
                    ticket_id: Some(update.ticket_id),
                    customer_email: Some(update.customer_email),
                    status: Some(update.status),
                    scan_count: Some(Value::String(update.scan_count)),
                    last_scanned_at: Some(update.last_scanned_at),
                    ..StoredTicket::default()
                }))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(ticket_id: &str, email: &str, condition: Option<UpdateCondition>) -> TicketUpdate {
        TicketUpdate {
            ticket_id: ticket_id.to_string(),
            customer_email: email.to_string(),
            status: "scanned".to_string(),
            scan_count: "1".to_string(),
            last_scanned_at: "2025-01-01T00:00:00+00:00".to_string(),
            condition,
        }
    }

    #[tokio::test]
    async fn table_paginates_before_filtering() {
        let store = InMemoryTicketStore::new(2)
            .with_row(stored_ticket("T-1", "EVT-1", "a@example.com"))
            .with_row(stored_ticket("T-2", "EVT-1", "b@example.com"))
            .with_row(stored_ticket("T-3", "EVT-2", "c@example.com"));

        let filter = TicketFilter::TicketId("T-3".to_string());
        let first = store.list_tickets(filter.clone(), None).await.unwrap().unwrap();
        assert!(first.items.is_empty());
        assert_eq!(first.next_token.as_deref(), Some("2"));

        let second = store.list_tickets(filter, first.next_token).await.unwrap().unwrap();
        assert_eq!(second.items.len(), 1);
        assert!(second.next_token.is_none());
        assert_eq!(store.list_calls().len(), 2);
    }

    #[tokio::test]
    async fn table_rejects_stale_condition() {
        let store =
            InMemoryTicketStore::new(10).with_row(stored_ticket("T-1", "EVT-1", "a@example.com"));
        let condition = Some(UpdateCondition::ScanCountUnchanged { observed: 0 });

        let first = store.update_ticket(update("T-1", "a@example.com", condition)).await;
        assert!(first.is_ok());

        let second = store.update_ticket(update("T-1", "a@example.com", condition)).await;
        assert!(matches!(second, Err(StoreError::ConditionFailed(_))));
        assert_eq!(store.updates().len(), 2);
    }

    #[tokio::test]
    async fn table_rejects_unknown_key() {
        let store =
            InMemoryTicketStore::new(10).with_row(stored_ticket("T-1", "EVT-1", "a@example.com"));

        let result = store.update_ticket(update("T-1", "other@example.com", None)).await;
        assert!(matches!(result, Err(StoreError::Api(_))));
    }

    #[tokio::test]
    async fn scripted_replays_then_ends() {
        let store = ScriptedTicketStore::new()
            .with_no_data()
            .with_list_error(StoreError::Unauthorized);
        let filter = TicketFilter::TicketId("T-1".to_string());

        assert_eq!(store.list_tickets(filter.clone(), None).await, Ok(None));
        assert_eq!(
            store.list_tickets(filter.clone(), None).await,
            Err(StoreError::Unauthorized)
        );
        let last = store.list_tickets(filter, None).await.unwrap().unwrap();
        assert!(last.next_token.is_none());
        assert_eq!(store.list_call_count(), 3);
    }

    #[tokio::test]
    async fn scripted_endless_keeps_paginating() {
        let store = ScriptedTicketStore::new().endless();
        let filter = TicketFilter::OwningEvent("EVT-1".to_string());

        let page = store.list_tickets(filter, None).await.unwrap().unwrap();
        assert_eq!(page.next_token.as_deref(), Some("page-1"));
    }

    #[tokio::test]
    async fn scripted_update_echoes_by_default() {
        let store = ScriptedTicketStore::new();

        let row = store
            .update_ticket(update("T-9", "z@example.com", None))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(row.status.as_deref(), Some("scanned"));
        assert_eq!(store.updates().len(), 1);
    }
}
