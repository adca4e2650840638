//! State types for the gate station.

use crate::types::{EventSummary, Rejection, TicketRecord};

/// Message shown for blank manual entry
pub const BLANK_TICKET_NUMBER: &str = "Please enter a ticket number";

/// Message shown for blank event id entry
pub const BLANK_EVENT_ID: &str = "Please enter an event ID";

/// Message shown for a QR payload without a ticket id
pub const INVALID_QR: &str = "Invalid QR code: No ticket ID found";

/// Event the station is scanning for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedEvent {
    /// Event id
    pub event_id: String,
    /// Display details
    pub summary: EventSummary,
}

/// What the operator currently sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationOutcome {
    /// Input rejected before any store call
    InputError {
        /// Message to display
        message: String,
    },
    /// The looked-up event does not exist
    EventNotFound {
        /// Event id as typed
        event_id: String,
    },
    /// The event lookup could not reach the store
    EventLookupFailed {
        /// Message to display
        message: String,
    },
    /// The ticket validated; waiting for the operator to confirm entry
    PendingAdmission {
        /// Validated row
        ticket: TicketRecord,
        /// Email shown to the operator and used for the admission write
        customer_email: String,
    },
    /// The ticket was rejected
    Rejected {
        /// Ticket id that was validated
        ticket_id: String,
        /// Why
        rejection: Rejection,
    },
    /// The admission was recorded
    Admitted {
        /// Row after the write
        ticket: TicketRecord,
    },
    /// The admission write did not go through
    AdmissionFailed {
        /// Ticket id
        ticket_id: String,
        /// Message to display
        message: String,
    },
}

/// Station state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationState {
    /// Event being scanned for
    pub event: Option<SelectedEvent>,
    /// A store call is running; new input is ignored
    pub in_flight: bool,
    /// Last thing shown to the operator
    pub outcome: Option<StationOutcome>,
}

impl StationState {
    /// Station with `summary` already selected
    #[must_use]
    pub fn scanning(summary: EventSummary) -> Self {
        Self {
            event: Some(SelectedEvent {
                event_id: summary.event_id.clone(),
                summary,
            }),
            in_flight: false,
            outcome: None,
        }
    }

    /// Event id being scanned for
    #[must_use]
    pub fn event_id(&self) -> Option<&str> {
        self.event.as_ref().map(|event| event.event_id.as_str())
    }

    /// Whether new scans and entries are accepted
    #[must_use]
    pub const fn accepts_input(&self) -> bool {
        !self.in_flight && self.event.is_some()
    }
}
