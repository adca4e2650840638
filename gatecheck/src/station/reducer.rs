//! Reducer for the gate station.

use crate::gate::holder_email;
use crate::qr;
use crate::station::types::{BLANK_EVENT_ID, BLANK_TICKET_NUMBER, INVALID_QR};
use crate::station::{
    SelectedEvent, StationAction, StationEnvironment, StationOutcome, StationState,
};
use crate::types::{AdmissionResult, EventLookup, ValidationDecision};
use gatecheck_core::{effect::Effect, reducer::Reducer};
use smallvec::{smallvec, SmallVec};

/// Station business logic.
///
/// Pure: decides state transitions and describes the store calls to make;
/// the runtime runs them and feeds their results back as actions.
#[derive(Debug, Clone, Copy)]
pub struct StationReducer;

impl StationReducer {
    /// Create a new station reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn input_error(state: &mut StationState, message: &str) -> SmallVec<[Effect<StationAction>; 4]> {
        state.outcome = Some(StationOutcome::InputError {
            message: message.to_string(),
        });
        smallvec![Effect::None]
    }

    /// Start a validation for `ticket_id` against the selected event.
    fn validate(
        state: &mut StationState,
        env: &StationEnvironment,
        ticket_id: String,
        qr_event_id: Option<String>,
        qr_email: Option<String>,
    ) -> SmallVec<[Effect<StationAction>; 4]> {
        let Some(event_id) = state.event_id().map(str::to_string) else {
            return smallvec![Effect::None];
        };
        state.in_flight = true;

        let gate = env.gate();
        smallvec![Effect::future(async move {
            let decision = gate
                .engine()
                .validate(&event_id, &ticket_id, qr_event_id.as_deref())
                .await;
            Some(StationAction::Validated {
                ticket_id,
                qr_email,
                decision,
            })
        })]
    }
}

impl Default for StationReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for StationReducer {
    type State = StationState;
    type Action = StationAction;
    type Environment = StationEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            StationAction::LookupEvent { event_id } => {
                if state.in_flight {
                    tracing::debug!("Ignoring event lookup while a call is in flight");
                    return smallvec![Effect::None];
                }
                let event_id = event_id.trim().to_string();
                if event_id.is_empty() {
                    return Self::input_error(state, BLANK_EVENT_ID);
                }

                state.in_flight = true;
                let gate = env.gate();
                smallvec![Effect::future(async move {
                    let result = gate.directory().lookup_event(&event_id).await;
                    Some(StationAction::EventLookedUp { event_id, result })
                })]
            },

            StationAction::EventLookedUp { event_id, result } => {
                state.in_flight = false;
                match result {
                    EventLookup::Found(summary) => {
                        tracing::info!(%event_id, "Station scanning for event");
                        state.event = Some(SelectedEvent { event_id, summary });
                        state.outcome = None;
                    },
                    EventLookup::NotFound => {
                        state.outcome = Some(StationOutcome::EventNotFound { event_id });
                    },
                    EventLookup::Failed { message } => {
                        state.outcome = Some(StationOutcome::EventLookupFailed { message });
                    },
                }
                smallvec![Effect::None]
            },

            StationAction::Scan { raw } => {
                if !state.accepts_input() {
                    tracing::debug!(
                        in_flight = state.in_flight,
                        "Ignoring scan: station busy or no event selected"
                    );
                    return smallvec![Effect::None];
                }

                let reference = qr::parse(&raw);
                tracing::debug!(format = %reference.source_format, "Parsed QR payload");
                if !reference.has_ticket_id() {
                    return Self::input_error(state, INVALID_QR);
                }

                Self::validate(
                    state,
                    env,
                    reference.ticket_id,
                    reference.event_id,
                    reference.customer_email,
                )
            },

            StationAction::EnterTicketNumber { number } => {
                if !state.accepts_input() {
                    tracing::debug!("Ignoring ticket number: station busy or no event selected");
                    return smallvec![Effect::None];
                }

                let ticket_id = number.trim();
                if ticket_id.is_empty() {
                    return Self::input_error(state, BLANK_TICKET_NUMBER);
                }

                Self::validate(state, env, ticket_id.to_string(), None, None)
            },

            StationAction::Validated {
                ticket_id,
                qr_email,
                decision,
            } => {
                state.in_flight = false;
                state.outcome = Some(match decision {
                    ValidationDecision::Admit(ticket) => {
                        let customer_email =
                            holder_email(ticket.customer_email.as_deref(), qr_email.as_deref())
                                .to_string();
                        StationOutcome::PendingAdmission {
                            ticket,
                            customer_email,
                        }
                    },
                    ValidationDecision::Reject(rejection) => StationOutcome::Rejected {
                        ticket_id,
                        rejection,
                    },
                });
                smallvec![Effect::None]
            },

            StationAction::ConfirmAdmission => {
                if state.in_flight {
                    return smallvec![Effect::None];
                }
                let Some(StationOutcome::PendingAdmission {
                    ticket,
                    customer_email,
                }) = state.outcome.clone()
                else {
                    tracing::debug!("Nothing to confirm");
                    return smallvec![Effect::None];
                };

                state.in_flight = true;
                let gate = env.gate();
                smallvec![Effect::future(async move {
                    let result = gate
                        .committer()
                        .admit_validated(&ticket, &customer_email)
                        .await;
                    Some(StationAction::Admitted {
                        ticket_id: ticket.ticket_id,
                        result,
                    })
                })]
            },

            StationAction::Admitted { ticket_id, result } => {
                state.in_flight = false;
                state.outcome = Some(match result {
                    AdmissionResult::Admitted { ticket } => {
                        StationOutcome::Admitted { ticket }
                    },
                    AdmissionResult::Failed { message } => {
                        StationOutcome::AdmissionFailed { ticket_id, message }
                    },
                });
                smallvec![Effect::None]
            },

            StationAction::Reset => {
                state.outcome = None;
                smallvec![Effect::None]
            },
        }
    }
}
