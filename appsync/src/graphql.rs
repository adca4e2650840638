//! GraphQL documents and envelope types for the sales-tickets schema

use gatecheck_core::store::{StoredTicket, TicketFilter, TicketPage, TicketUpdate, UpdateCondition};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Paginated, filtered listing of ticket rows.
pub const LIST_SALES_TICKETS: &str = r"query ListSalesTickets($filter: TableSalesTicketsFilterInput, $nextToken: String) {
  listSalesTickets(filter: $filter, nextToken: $nextToken) {
    items {
      TicketID
      GSI1PK
      CustomerEmail
      Status
      ScanCount
      MaxScans
      IsValid
      LastScannedAt
      EventThumbnail
      VenueAddress
      EventDate
    }
    nextToken
  }
}";

/// Update of a single row keyed by ticket id and customer email.
pub const UPDATE_SALES_TICKETS: &str = r"mutation UpdateSalesTickets($input: UpdateSalesTicketsInput!, $condition: TableSalesTicketsConditionInput) {
  updateSalesTickets(input: $input, condition: $condition) {
    TicketID
    GSI1PK
    CustomerEmail
    Status
    ScanCount
    MaxScans
    IsValid
    LastScannedAt
  }
}";

/// Request body posted to the endpoint
#[derive(Clone, Debug, Serialize)]
pub struct GraphQlRequest {
    /// Query or mutation document
    pub query: &'static str,
    /// Operation variables
    pub variables: Value,
}

impl GraphQlRequest {
    /// Build the list query for one page
    #[must_use]
    pub fn list_tickets(filter: &TicketFilter, next_token: Option<&str>) -> Self {
        let filter = match filter {
            TicketFilter::TicketId(id) => json!({ "TicketID": { "eq": id } }),
            TicketFilter::OwningEvent(id) => json!({ "GSI1PK": { "eq": id } }),
        };

        Self {
            query: LIST_SALES_TICKETS,
            variables: json!({ "filter": filter, "nextToken": next_token }),
        }
    }

    /// Build the update mutation, including its store-side condition.
    ///
    /// `ScanCount` is compared as a string: the condition input only takes a
    /// string filter, and every admission writes the count as a string. A row
    /// whose count another writer stored as a number never satisfies the
    /// condition, and the admission is reported as a conflict.
    #[must_use]
    pub fn update_ticket(update: &TicketUpdate) -> Self {
        let condition = update.condition.map(|condition| match condition {
            UpdateCondition::ScanCountUnchanged { observed: 0 } => json!({
                "or": [
                    { "ScanCount": { "eq": "0" } },
                    { "ScanCount": { "attributeExists": false } }
                ]
            }),
            UpdateCondition::ScanCountUnchanged { observed } => {
                json!({ "ScanCount": { "eq": observed.to_string() } })
            },
        });

        Self {
            query: UPDATE_SALES_TICKETS,
            variables: json!({
                "input": {
                    "TicketID": update.ticket_id,
                    "CustomerEmail": update.customer_email,
                    "Status": update.status,
                    "ScanCount": update.scan_count,
                    "LastScannedAt": update.last_scanned_at,
                },
                "condition": condition,
            }),
        }
    }
}

/// Response envelope
#[derive(Clone, Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    /// Operation result, absent when the whole operation failed
    pub data: Option<T>,
    /// Errors reported alongside (or instead of) data
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

/// One entry of the `errors` array
#[derive(Clone, Debug, Deserialize)]
pub struct GraphQlError {
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// Resolver error classification, e.g. `DynamoDB:ConditionalCheckFailedException`
    #[serde(rename = "errorType", default)]
    pub error_type: Option<String>,
}

impl GraphQlError {
    /// Whether the resolver rejected a conditional write
    #[must_use]
    pub fn is_condition_failure(&self) -> bool {
        self.error_type
            .as_deref()
            .is_some_and(|kind| kind.contains("ConditionalCheckFailed"))
    }
}

/// `data` payload of the list query
#[derive(Clone, Debug, Deserialize)]
pub struct ListData {
    /// The page, null when the resolver failed
    #[serde(rename = "listSalesTickets", default)]
    pub page: Option<TicketPage>,
}

/// `data` payload of the update mutation
#[derive(Clone, Debug, Deserialize)]
pub struct UpdateData {
    /// The updated row, null when the resolver failed
    #[serde(rename = "updateSalesTickets", default)]
    pub ticket: Option<StoredTicket>,
}
