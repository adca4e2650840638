//! Ticket gate-check engine.
//!
//! Staff pick an event, scan or type a ticket identifier, and get an
//! admit/reject decision backed by the remote ticket store.
//!
//! # Architecture
//!
//! ```text
//! raw scan ──▶ qr::parse ──▶ TicketReference
//!                                 │
//!                                 ▼
//!                       ValidationEngine ──▶ TicketStore (list, paginated)
//!                                 │
//!                        ValidationDecision
//!                                 │ Admit + operator confirms
//!                                 ▼
//!                      AdmissionCommitter ──▶ TicketStore (conditional update)
//! ```
//!
//! The [`gate::Gate`] bundles the engine, the committer and the
//! [`lookup::EventDirectory`] over one store; the [`station`] module drives
//! them from operator input through a reducer.
//!
//! # Security checks
//!
//! In order, first failure wins:
//!
//! 1. QR event id matches the scanning event (no store call)
//! 2. The ticket exists for the scanning event, not for another one
//! 3. Status is not `"inactive"`
//! 4. Scan count is below the scan limit
//! 5. The ticket is not flagged invalid
//!
//! # Usage
//!
//! See [`gate::Gate::check_in`] for the one-call flow and the [`station`]
//! module for the interactive one.

#![forbid(unsafe_code)]

pub mod admission;
pub mod config;
pub mod decode;
pub mod gate;
pub mod lookup;
pub mod metrics;
pub mod qr;
pub mod station;
pub mod types;
pub mod validation;

pub use admission::AdmissionCommitter;
pub use config::Config;
pub use gate::{CheckIn, Gate};
pub use lookup::EventDirectory;
pub use types::{
    AdmissionResult, EventLookup, EventSummary, Rejection, SourceFormat, TicketRecord,
    TicketReference, ValidationDecision, Validity, Violation,
};
pub use validation::{ValidationConfig, ValidationEngine};
