//! AppSync ticket store implementation

use crate::{
    error::AppSyncError,
    graphql::{GraphQlError, GraphQlRequest, GraphQlResponse, ListData, UpdateData},
};
use gatecheck_core::store::{
    StoreError, StoreFuture, StoredTicket, TicketFilter, TicketPage, TicketStore, TicketUpdate,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default request timeout when none is configured
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// AppSync GraphQL client for the sales-tickets table
#[derive(Clone)]
pub struct AppSyncTicketStore {
    client: Client,
    api_url: String,
    api_key: String,
}

impl std::fmt::Debug for AppSyncTicketStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppSyncTicketStore")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl AppSyncTicketStore {
    /// Create a client with an explicit endpoint and key
    ///
    /// # Errors
    ///
    /// Returns `MissingEndpoint` / `MissingApiKey` for blank values.
    pub fn new(api_url: String, api_key: String) -> Result<Self, AppSyncError> {
        Self::with_timeout(api_url, api_key, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit per-request timeout
    ///
    /// # Errors
    ///
    /// Returns `MissingEndpoint` / `MissingApiKey` for blank values and
    /// `ClientBuild` if the TLS backend cannot be initialised.
    pub fn with_timeout(
        api_url: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, AppSyncError> {
        if api_url.trim().is_empty() {
            return Err(AppSyncError::MissingEndpoint);
        }
        if api_key.trim().is_empty() {
            return Err(AppSyncError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppSyncError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }

    /// Post one GraphQL operation and decode the envelope
    async fn execute<T: DeserializeOwned>(
        &self,
        request: &GraphQlRequest,
    ) -> Result<GraphQlResponse<T>, StoreError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => response
                .json::<GraphQlResponse<T>>()
                .await
                .map_err(|e| StoreError::Decode(e.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(StoreError::Unauthorized),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(StoreError::Http {
                    status: status.as_u16(),
                    message: body,
                })
            },
        }
    }

    /// Apply the error policy to an operation's payload.
    ///
    /// Any reported error fails the operation, even when data came back with it.
    fn resolve<T>(
        operation: &'static str,
        payload: Option<T>,
        errors: &[GraphQlError],
    ) -> Result<Option<T>, StoreError> {
        if errors.is_empty() {
            return Ok(payload);
        }

        let message = errors
            .iter()
            .map(|error| error.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");

        tracing::warn!(
            operation,
            error_count = errors.len(),
            errors = %message,
            discarded_data = payload.is_some(),
            "Store reported errors"
        );

        if errors.iter().any(GraphQlError::is_condition_failure) {
            Err(StoreError::ConditionFailed(message))
        } else {
            Err(StoreError::Api(message))
        }
    }
}

impl TicketStore for AppSyncTicketStore {
    fn list_tickets(
        &self,
        filter: TicketFilter,
        next_token: Option<String>,
    ) -> StoreFuture<'_, Option<TicketPage>> {
        Box::pin(async move {
            let request = GraphQlRequest::list_tickets(&filter, next_token.as_deref());
            tracing::debug!(
                filter = ?filter,
                has_next_token = next_token.is_some(),
                "Querying listSalesTickets"
            );

            let response = self.execute::<ListData>(&request).await?;
            let page = response.data.and_then(|data| data.page);
            Self::resolve("listSalesTickets", page, &response.errors)
        })
    }

    fn update_ticket(&self, update: TicketUpdate) -> StoreFuture<'_, Option<StoredTicket>> {
        Box::pin(async move {
            let request = GraphQlRequest::update_ticket(&update);
            tracing::debug!(
                ticket_id = %update.ticket_id,
                conditional = update.condition.is_some(),
                "Sending updateSalesTickets"
            );

            let response = self.execute::<UpdateData>(&request).await?;
            let ticket = response.data.and_then(|data| data.ticket);
            Self::resolve("updateSalesTickets", ticket, &response.errors)
        })
    }
}
