//! Domain types for the gate-check engine.
//!
//! These types are shared by the parser, the validation engine, the
//! admission committer and the gate station. None of them carries identity
//! beyond the call that produced it: references are parsed per scan,
//! records are decoded per query and decisions are made per validation.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Ticket reference (parsed scan payload)
// ============================================================================

/// Payload format a [`TicketReference`] was recognised as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceFormat {
    /// JSON object with ticket/event/email keys
    Json,
    /// `email,event,ticket`
    Csv,
    /// `email|event|ticket`
    Pipe,
    /// The whole input is the ticket id
    TicketIdOnly,
    /// Malformed JSON-looking input treated as a bare ticket id
    Fallback,
}

impl SourceFormat {
    /// Wire name of the format
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Csv => "CSV",
            Self::Pipe => "PIPE",
            Self::TicketIdOnly => "TICKET_ID_ONLY",
            Self::Fallback => "FALLBACK",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a scanned or typed payload says about a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketReference {
    /// Ticket identifier (may be empty when a JSON payload had none)
    pub ticket_id: String,
    /// Event the payload claims the ticket is for
    pub event_id: Option<String>,
    /// Holder email embedded in the payload
    pub customer_email: Option<String>,
    /// How the payload was recognised
    pub source_format: SourceFormat,
}

impl TicketReference {
    /// Whether the payload yielded a usable ticket id
    #[must_use]
    pub fn has_ticket_id(&self) -> bool {
        !self.ticket_id.is_empty()
    }
}

// ============================================================================
// Ticket record (decoded store row)
// ============================================================================

/// Decoded validity flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validity {
    /// Explicitly `true` / `"true"`
    Valid,
    /// Explicitly `false` / `"false"`
    Invalid,
    /// Absent, null or any other value
    Unspecified,
}

/// A ticket row with counters and flags decoded to strong types.
///
/// Built from the wire row by [`TicketRecord::from_stored`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    /// Ticket identifier
    pub ticket_id: String,
    /// Event the ticket was sold for
    pub owner_event_id: Option<String>,
    /// Holder email
    pub customer_email: Option<String>,
    /// Free-form status, notably `"inactive"` and `"scanned"`
    pub status: Option<String>,
    /// Admissions so far (default 0)
    pub scan_count: u32,
    /// Admissions allowed (default 1)
    pub max_scans: u32,
    /// Validity flag
    pub validity: Validity,
    /// Timestamp of the last admission
    pub last_scanned_at: Option<String>,
}

impl TicketRecord {
    /// Status value that blocks entry
    pub const INACTIVE: &'static str = "inactive";
    /// Status written on admission
    pub const SCANNED: &'static str = "scanned";

    /// Whether the status blocks entry
    #[must_use]
    pub fn is_inactive(&self) -> bool {
        self.status.as_deref() == Some(Self::INACTIVE)
    }

    /// Whether the ticket has no admissions left
    #[must_use]
    pub const fn is_used_up(&self) -> bool {
        self.scan_count >= self.max_scans
    }
}

// ============================================================================
// Validation decision
// ============================================================================

/// Why a ticket was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Violation {
    /// The payload names a different event than the one being scanned
    EventIdMismatch,
    /// The ticket exists but belongs to another event
    WrongEvent,
    /// No row with this ticket id was found
    TicketNotFound,
    /// The ticket's status is `"inactive"`
    TicketInactive,
    /// Scan count reached the maximum
    TicketAlreadyUsed,
    /// The ticket is flagged invalid
    TicketMarkedInvalid,
    /// The store reported an error
    ApiError,
    /// The store answered without a data payload
    NoData,
    /// Anything unexpected on our side
    SystemError,
}

impl Violation {
    /// Wire name of the violation
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EventIdMismatch => "EVENT_ID_MISMATCH",
            Self::WrongEvent => "WRONG_EVENT",
            Self::TicketNotFound => "TICKET_NOT_FOUND",
            Self::TicketInactive => "TICKET_INACTIVE",
            Self::TicketAlreadyUsed => "TICKET_ALREADY_USED",
            Self::TicketMarkedInvalid => "TICKET_MARKED_INVALID",
            Self::ApiError => "API_ERROR",
            Self::NoData => "NO_DATA",
            Self::SystemError => "SYSTEM_ERROR",
        }
    }

    /// Whether the rejection came from store trouble rather than the ticket
    #[must_use]
    pub const fn is_store_failure(self) -> bool {
        matches!(self, Self::ApiError | Self::NoData | Self::SystemError)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// Reason code
    pub violation: Violation,
    /// Message suitable for direct display
    pub message: String,
    /// The offending row, when one was found
    pub ticket: Option<TicketRecord>,
}

impl Rejection {
    /// Rejection without a row
    #[must_use]
    pub fn new(violation: Violation, message: impl Into<String>) -> Self {
        Self {
            violation,
            message: message.into(),
            ticket: None,
        }
    }

    /// Rejection carrying the row that caused it
    #[must_use]
    pub fn with_ticket(violation: Violation, message: impl Into<String>, ticket: TicketRecord) -> Self {
        Self {
            violation,
            message: message.into(),
            ticket: Some(ticket),
        }
    }
}

/// Result of one validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ValidationDecision {
    /// Let the holder in
    Admit(TicketRecord),
    /// Turn the holder away
    Reject(Rejection),
}

impl ValidationDecision {
    /// Whether the ticket was accepted
    #[must_use]
    pub const fn is_admit(&self) -> bool {
        matches!(self, Self::Admit(_))
    }

    /// Reason code of a rejection
    #[must_use]
    pub const fn violation(&self) -> Option<Violation> {
        match self {
            Self::Admit(_) => None,
            Self::Reject(rejection) => Some(rejection.violation),
        }
    }

    /// Display message of a rejection
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Admit(_) => None,
            Self::Reject(rejection) => Some(&rejection.message),
        }
    }

    /// The row the decision was made on, if any
    #[must_use]
    pub const fn ticket(&self) -> Option<&TicketRecord> {
        match self {
            Self::Admit(ticket) => Some(ticket),
            Self::Reject(rejection) => rejection.ticket.as_ref(),
        }
    }

    /// Metric label for the outcome
    #[must_use]
    pub const fn outcome_label(&self) -> &'static str {
        match self {
            Self::Admit(_) => "ADMIT",
            Self::Reject(rejection) => rejection.violation.as_str(),
        }
    }
}

// ============================================================================
// Admission result
// ============================================================================

/// Result of marking a ticket consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdmissionResult {
    /// The store applied the write
    Admitted {
        /// Row as the store returned it after the write
        ticket: TicketRecord,
    },
    /// The write was not applied
    Failed {
        /// Message suitable for direct display
        message: String,
    },
}

impl AdmissionResult {
    /// Whether the write was applied
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Admitted { .. })
    }

    /// Updated row on success
    #[must_use]
    pub const fn ticket(&self) -> Option<&TicketRecord> {
        match self {
            Self::Admitted { ticket } => Some(ticket),
            Self::Failed { .. } => None,
        }
    }

    /// Failure message
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Admitted { .. } => None,
            Self::Failed { message } => Some(message),
        }
    }
}

// ============================================================================
// Events
// ============================================================================

/// Display details of an event, derived from any of its ticket rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    /// Event identifier
    pub event_id: String,
    /// Display name
    pub name: String,
    /// Venue address
    pub venue: String,
    /// Start date as stored
    pub start_date: String,
    /// Poster image URL
    pub poster_url: Option<String>,
    /// One-line description
    pub description: String,
}

/// Result of looking up an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum EventLookup {
    /// A ticket row for the event was found
    Found(EventSummary),
    /// No row names this event
    NotFound,
    /// The store could not be queried
    Failed {
        /// Message suitable for direct display
        message: String,
    },
}

impl EventLookup {
    /// The summary when found
    #[must_use]
    pub const fn summary(&self) -> Option<&EventSummary> {
        match self {
            Self::Found(summary) => Some(summary),
            Self::NotFound | Self::Failed { .. } => None,
        }
    }
}
