//! Error types for building the AppSync client

use thiserror::Error;

/// Errors that can occur while constructing an [`AppSyncTicketStore`](crate::AppSyncTicketStore)
///
/// Errors raised while *talking* to the store are
/// [`StoreError`](gatecheck_core::store::StoreError)s.
#[derive(Debug, Error)]
pub enum AppSyncError {
    /// Missing `TICKET_APPSYNC_API_URL`
    #[error("Missing TICKET_APPSYNC_API_URL (ticket store endpoint)")]
    MissingEndpoint,

    /// Missing `TICKET_APPSYNC_API_KEY`
    #[error("Missing TICKET_APPSYNC_API_KEY (ticket store API key)")]
    MissingApiKey,

    /// The HTTP client could not be built
    #[error("HTTP client construction failed: {0}")]
    ClientBuild(String),
}
