//! Actions for the gate station.

use crate::types::{AdmissionResult, EventLookup, ValidationDecision};

/// Operator input and the results of the calls it triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationAction {
    /// Operator typed an event id to scan for
    LookupEvent {
        /// Event id as typed
        event_id: String,
    },

    /// Event lookup finished
    EventLookedUp {
        /// Event id that was looked up
        event_id: String,
        /// Lookup result
        result: EventLookup,
    },

    /// Camera decoded a QR payload
    Scan {
        /// Raw payload
        raw: String,
    },

    /// Operator typed a ticket number
    EnterTicketNumber {
        /// Ticket number as typed
        number: String,
    },

    /// Validation finished
    Validated {
        /// Ticket id that was validated
        ticket_id: String,
        /// Email carried by the scanned payload
        qr_email: Option<String>,
        /// Decision
        decision: ValidationDecision,
    },

    /// Operator confirmed a pending admission
    ConfirmAdmission,

    /// Admission write finished
    Admitted {
        /// Ticket id that was admitted
        ticket_id: String,
        /// Write result
        result: AdmissionResult,
    },

    /// Clear the last outcome, keeping the selected event
    Reset,
}
