use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::Ticket;

#[derive(Debug, Error, PartialEq)]
pub enum ProofError {
    #[error("proof payload is unreadable")]
    Unreadable,
}

/// Scannable proof-of-purchase. The payload is only a pointer to the
/// canonical ticket record: it never carries status or check-in state, so
/// a stale or screenshotted code cannot misrepresent anything. Every
/// validity decision re-reads the store at scan time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofPayload {
    pub ticket_id: Uuid,
    pub event_id: Uuid,
    pub event_title: String,
    pub quantity: i32,
    pub verify_url: String,
}

impl ProofPayload {
    pub fn for_ticket(ticket: &Ticket, event_title: &str, public_base_url: &str) -> Self {
        Self {
            ticket_id: ticket.id,
            event_id: ticket.event_id,
            event_title: event_title.to_string(),
            quantity: ticket.quantity,
            verify_url: verify_url(public_base_url, ticket.id),
        }
    }

    /// The exact string a QR rendering of this proof contains.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

pub fn verify_url(public_base_url: &str, ticket_id: Uuid) -> String {
    format!(
        "{}/api/verify/{ticket_id}",
        public_base_url.trim_end_matches('/')
    )
}

/// Resolve any presented proof to a ticket identity. Accepted forms, in
/// order: the structured JSON payload, a bare ticket id (manual entry at
/// the door), and a verification URL whose last path segment is the id.
pub fn decode(input: &str) -> Result<Uuid, ProofError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ProofError::Unreadable);
    }

    if input.starts_with('{') {
        let payload: ProofPayload =
            serde_json::from_str(input).map_err(|_| ProofError::Unreadable)?;
        return Ok(payload.ticket_id);
    }

    if let Ok(id) = Uuid::parse_str(input) {
        return Ok(id);
    }

    if input.contains('/') {
        let path = input
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or(input);
        if let Some(segment) = path.rsplit('/').find(|s| !s.is_empty()) {
            if let Ok(id) = Uuid::parse_str(segment) {
                return Ok(id);
            }
        }
    }

    Err(ProofError::Unreadable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CheckInStatus, TicketStatus};
    use chrono::Utc;

    fn ticket() -> Ticket {
        Ticket {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            event_id: Uuid::new_v4(),
            ticket_type_id: None,
            quantity: 2,
            status: TicketStatus::Confirmed,
            check_in_status: CheckInStatus::NotCheckedIn,
            checked_in_at: None,
            checked_in_by: None,
            payment_reference: None,
            amount_paid: None,
            currency: None,
            flagged_for_review: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn round_trip_preserves_identities() {
        let ticket = ticket();
        let payload = ProofPayload::for_ticket(&ticket, "Harvest Dinner", "https://example.org");
        let encoded = payload.encode().unwrap();

        let decoded: ProofPayload = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, payload);
        assert_eq!(decode(&encoded).unwrap(), ticket.id);
        assert_eq!(decoded.event_id, ticket.event_id);
    }

    #[test]
    fn bare_id_and_url_forms_resolve_to_the_same_ticket() {
        let ticket = ticket();
        let payload = ProofPayload::for_ticket(&ticket, "Harvest Dinner", "https://example.org/");

        let from_payload = decode(&payload.encode().unwrap()).unwrap();
        let from_bare = decode(&format!("  {}  ", ticket.id)).unwrap();
        let from_url = decode(&payload.verify_url).unwrap();

        assert_eq!(from_payload, ticket.id);
        assert_eq!(from_bare, ticket.id);
        assert_eq!(from_url, ticket.id);
    }

    #[test]
    fn verify_url_embeds_the_ticket_id_once() {
        let id = Uuid::new_v4();
        assert_eq!(
            verify_url("https://example.org/", id),
            format!("https://example.org/api/verify/{id}")
        );
    }

    #[test]
    fn garbage_is_unreadable() {
        assert_eq!(decode(""), Err(ProofError::Unreadable));
        assert_eq!(decode("not-a-ticket"), Err(ProofError::Unreadable));
        assert_eq!(decode("{\"ticket_id\": 42}"), Err(ProofError::Unreadable));
        assert_eq!(
            decode("https://example.org/api/verify/oops"),
            Err(ProofError::Unreadable)
        );
    }

    #[test]
    fn payload_never_carries_ticket_state() {
        let payload = ProofPayload::for_ticket(&ticket(), "Vigil", "https://example.org");
        let json = payload.encode().unwrap();
        assert!(!json.contains("status"));
        assert!(!json.contains("checked_in"));
    }
}
