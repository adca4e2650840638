//! Gate station: the state machine behind one scanning device.
//!
//! An operator selects an event, then scans QR codes or types ticket
//! numbers. Each input becomes a validation; an Admit waits for the operator
//! to confirm before the admission is written.
//!
//! # Flow
//!
//! ```text
//! LookupEvent ──▶ (EventDirectory) ──▶ EventLookedUp
//!                                          │ selected event
//!                                          ▼
//! Scan / EnterTicketNumber ──▶ (ValidationEngine) ──▶ Validated
//!                                                        │ Admit pending
//!                                                        ▼
//! ConfirmAdmission ──▶ (AdmissionCommitter) ──▶ Admitted
//! ```
//!
//! While a call is in flight the station ignores further input. It never
//! cancels the call that is running.

pub mod actions;
pub mod environment;
pub mod reducer;
pub mod types;

pub use actions::StationAction;
pub use environment::StationEnvironment;
pub use reducer::StationReducer;
pub use types::{SelectedEvent, StationOutcome, StationState};

use gatecheck_runtime::Store;

/// Runtime store driving a [`StationReducer`]
pub type StationStore = Store<StationState, StationAction, StationEnvironment, StationReducer>;

/// Create a station with no event selected.
#[must_use]
pub fn station_store(environment: StationEnvironment) -> StationStore {
    Store::new(StationState::default(), StationReducer::new(), environment)
}
