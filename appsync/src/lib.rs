//! # AppSync Ticket Store
//!
//! GraphQL client for the sales-tickets table, implementing
//! [`TicketStore`](gatecheck_core::store::TicketStore).
//!
//! ## Example
//!
//! ```no_run
//! use gatecheck_appsync::AppSyncTicketStore;
//! use gatecheck_core::store::{TicketFilter, TicketStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = AppSyncTicketStore::new(
//!         "https://example.appsync-api.eu-west-1.amazonaws.com/graphql".to_string(),
//!         "da2-example-key".to_string(),
//!     )?;
//!
//!     let page = store
//!         .list_tickets(TicketFilter::TicketId("T-1001".to_string()), None)
//!         .await?;
//!
//!     println!("Page: {page:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Error policy
//!
//! - Any GraphQL error fails the operation, whether or not data came with it
//! - `ConditionalCheckFailed` resolver errors become `StoreError::ConditionFailed`
//! - All other GraphQL errors become `StoreError::Api`

pub mod client;
pub mod error;
pub mod graphql;

// Re-export main types for convenience
pub use client::AppSyncTicketStore;
pub use error::AppSyncError;
