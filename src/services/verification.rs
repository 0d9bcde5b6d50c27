use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::directory::EventDirectory;
use crate::models::TicketStatus;
use crate::store::TicketStore;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct TicketSummary {
    pub id: Uuid,
    pub event_id: Uuid,
    pub quantity: i32,
    pub status: TicketStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventBrief {
    pub id: Uuid,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub location: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub ticket: TicketSummary,
    /// Absent when the event can no longer be resolved.
    pub event: Option<EventBrief>,
    pub is_valid: bool,
    pub is_checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
}

/// Public, read-only validity lookup. Deliberately performs no mutation so
/// a holder (or door staff) can confirm a ticket any number of times
/// without consuming it; the ticket id is the only credential.
pub struct VerificationService {
    store: Arc<dyn TicketStore>,
    directory: Arc<dyn EventDirectory>,
}

impl VerificationService {
    pub fn new(store: Arc<dyn TicketStore>, directory: Arc<dyn EventDirectory>) -> Self {
        Self { store, directory }
    }

    pub async fn verify(&self, ticket_id: Uuid) -> Result<VerificationReport, AppError> {
        let ticket = self
            .store
            .get(ticket_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Ticket '{ticket_id}' was not found")))?;

        let event = self
            .directory
            .get_event(ticket.event_id)
            .await?
            .map(|e| EventBrief {
                id: e.id,
                title: e.title,
                starts_at: e.starts_at,
                location: e.location,
            });

        Ok(VerificationReport {
            is_valid: ticket.is_confirmed(),
            is_checked_in: ticket.is_checked_in(),
            checked_in_at: ticket.checked_in_at,
            ticket: TicketSummary {
                id: ticket.id,
                event_id: ticket.event_id,
                quantity: ticket.quantity,
                status: ticket.status,
            },
            event,
        })
    }
}
