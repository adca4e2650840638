//! QR payload parsing.
//!
//! Ticket QR codes in circulation come in several shapes:
//!
//! ```text
//! {"ticketId":"T-1","eventId":"EVT-1","customerEmail":"fan@example.com"}   JSON
//! fan@example.com,EVT-1,T-1                                                CSV
//! fan@example.com|EVT-1|T-1                                                PIPE
//! T-1                                                                      TICKET_ID_ONLY
//! ```
//!
//! [`parse`] never fails. Input that looks like JSON but is not is retried
//! as CSV and PIPE before being taken verbatim as a ticket id (`FALLBACK`).

use crate::types::{SourceFormat, TicketReference};
use serde_json::{Map, Value};

const TICKET_ID_KEYS: [&str; 2] = ["ticketId", "TicketID"];
const EVENT_ID_KEYS: [&str; 3] = ["eventId", "EventID", "GSI1PK"];
const EMAIL_KEYS: [&str; 2] = ["customerEmail", "CustomerEmail"];

/// Parse a raw scan payload into a [`TicketReference`].
#[must_use]
pub fn parse(raw: &str) -> TicketReference {
    if raw.starts_with('{') {
        return match serde_json::from_str::<Map<String, Value>>(raw) {
            Ok(object) => from_json(&object),
            Err(error) => {
                tracing::debug!(%error, "QR payload is not valid JSON, trying delimited formats");
                parse_delimited(raw).unwrap_or_else(|| bare(raw, SourceFormat::Fallback))
            },
        };
    }

    parse_delimited(raw).unwrap_or_else(|| bare(raw, SourceFormat::TicketIdOnly))
}

fn from_json(object: &Map<String, Value>) -> TicketReference {
    TicketReference {
        ticket_id: first_field(object, &TICKET_ID_KEYS).unwrap_or_default(),
        event_id: first_field(object, &EVENT_ID_KEYS),
        customer_email: first_field(object, &EMAIL_KEYS),
        source_format: SourceFormat::Json,
    }
}

/// First key holding a non-empty string or a number.
fn first_field(object: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match object.get(*key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn parse_delimited(raw: &str) -> Option<TicketReference> {
    [(',', SourceFormat::Csv), ('|', SourceFormat::Pipe)]
        .into_iter()
        .find_map(|(separator, format)| {
            let mut parts = raw.split(separator).map(str::trim);
            let (email, event, ticket) = (parts.next()?, parts.next()?, parts.next()?);

            Some(TicketReference {
                ticket_id: ticket.to_string(),
                event_id: optional(event),
                customer_email: optional(email),
                source_format: format,
            })
        })
}

fn bare(raw: &str, format: SourceFormat) -> TicketReference {
    TicketReference {
        ticket_id: raw.trim().to_string(),
        event_id: None,
        customer_email: None,
        source_format: format,
    }
}

fn optional(field: &str) -> Option<String> {
    (!field.is_empty()).then(|| field.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_camel_case() {
        let reference =
            parse(r#"{"ticketId":"T-1","eventId":"EVT-1","customerEmail":"fan@example.com"}"#);

        assert_eq!(reference.source_format, SourceFormat::Json);
        assert_eq!(reference.ticket_id, "T-1");
        assert_eq!(reference.event_id.as_deref(), Some("EVT-1"));
        assert_eq!(reference.customer_email.as_deref(), Some("fan@example.com"));
    }

    #[test]
    fn test_json_store_casing() {
        let reference =
            parse(r#"{"TicketID":"T-2","GSI1PK":"EVT-2","CustomerEmail":"a@b.c"}"#);

        assert_eq!(reference.ticket_id, "T-2");
        assert_eq!(reference.event_id.as_deref(), Some("EVT-2"));
        assert_eq!(reference.customer_email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn test_json_key_precedence() {
        let reference = parse(r#"{"EventID":"second","eventId":"first","GSI1PK":"third","ticketId":"T"}"#);
        assert_eq!(reference.event_id.as_deref(), Some("first"));

        let reference = parse(r#"{"eventId":"","GSI1PK":"third","ticketId":"T"}"#);
        assert_eq!(reference.event_id.as_deref(), Some("third"));
    }

    #[test]
    fn test_json_numeric_ticket_id() {
        let reference = parse(r#"{"ticketId": 1042}"#);
        assert_eq!(reference.ticket_id, "1042");
        assert!(reference.event_id.is_none());
    }

    #[test]
    fn test_json_without_ticket_id() {
        let reference = parse(r#"{"eventId":"EVT-1"}"#);
        assert_eq!(reference.source_format, SourceFormat::Json);
        assert!(!reference.has_ticket_id());
    }

    #[test]
    fn test_malformed_json_retries_csv() {
        let reference = parse("{broken,EVT-1,T-1");
        assert_eq!(reference.source_format, SourceFormat::Csv);
        assert_eq!(reference.customer_email.as_deref(), Some("{broken"));
        assert_eq!(reference.ticket_id, "T-1");
    }

    #[test]
    fn test_malformed_json_falls_back() {
        let reference = parse("{not json ");
        assert_eq!(reference.source_format, SourceFormat::Fallback);
        assert_eq!(reference.ticket_id, "{not json");
    }

    #[test]
    fn test_csv_field_order() {
        let reference = parse(" fan@example.com , EVT-1 , T-1 ,extra");
        assert_eq!(reference.source_format, SourceFormat::Csv);
        assert_eq!(reference.customer_email.as_deref(), Some("fan@example.com"));
        assert_eq!(reference.event_id.as_deref(), Some("EVT-1"));
        assert_eq!(reference.ticket_id, "T-1");
    }

    #[test]
    fn test_csv_empty_fields_absent() {
        let reference = parse(",,T-1");
        assert_eq!(reference.source_format, SourceFormat::Csv);
        assert!(reference.customer_email.is_none());
        assert!(reference.event_id.is_none());
        assert_eq!(reference.ticket_id, "T-1");
    }

    #[test]
    fn test_pipe() {
        let reference = parse("fan@example.com|EVT-1|T-1");
        assert_eq!(reference.source_format, SourceFormat::Pipe);
        assert_eq!(reference.event_id.as_deref(), Some("EVT-1"));
        assert_eq!(reference.ticket_id, "T-1");
    }

    #[test]
    fn test_comma_wins_over_pipe() {
        let reference = parse("a|b,c|d,e|f");
        assert_eq!(reference.source_format, SourceFormat::Csv);
        assert_eq!(reference.ticket_id, "e|f");
    }

    #[test]
    fn test_two_parts_is_bare_id() {
        let reference = parse("  EVT-1,T-1  ");
        assert_eq!(reference.source_format, SourceFormat::TicketIdOnly);
        assert_eq!(reference.ticket_id, "EVT-1,T-1");
    }

    #[test]
    fn test_bare_id_trimmed() {
        let reference = parse("\tT-77 \n");
        assert_eq!(reference.source_format, SourceFormat::TicketIdOnly);
        assert_eq!(reference.ticket_id, "T-77");
    }
}
