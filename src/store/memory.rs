use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{CheckInStatus, Ticket, TicketStatus};

use super::{CheckInClaim, Issued, NewFreeTicket, NewPaidTicket, StoreError, TicketStore};

/// Mutex-guarded map honoring the exact [`TicketStore`] contracts. This is
/// the reference implementation of the store's atomicity guarantees and
/// what the test suite runs against; the mutex plays the role the unique
/// indexes and conditional update play in Postgres.
#[derive(Default)]
pub struct InMemoryTicketStore {
    tickets: Mutex<HashMap<Uuid, Ticket>>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Ticket>> {
        match self.tickets.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl TicketStore for InMemoryTicketStore {
    async fn insert_free(&self, new: NewFreeTicket) -> Result<Issued, StoreError> {
        let mut tickets = self.lock();

        // Same predicate as the partial unique index.
        let existing = tickets
            .values()
            .find(|t| {
                t.event_id == new.event_id
                    && t.user_id == new.user_id
                    && t.status == TicketStatus::Confirmed
                    && t.payment_reference.is_none()
            })
            .cloned();
        if let Some(ticket) = existing {
            return Ok(Issued::Existing(ticket));
        }

        let ticket = Ticket {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            event_id: new.event_id,
            ticket_type_id: None,
            quantity: new.quantity,
            status: TicketStatus::Confirmed,
            check_in_status: CheckInStatus::NotCheckedIn,
            checked_in_at: None,
            checked_in_by: None,
            payment_reference: None,
            amount_paid: None,
            currency: None,
            flagged_for_review: false,
            created_at: Utc::now(),
        };
        tickets.insert(ticket.id, ticket.clone());
        Ok(Issued::Created(ticket))
    }

    async fn insert_paid(&self, new: NewPaidTicket) -> Result<Issued, StoreError> {
        let mut tickets = self.lock();

        let existing = tickets
            .values()
            .find(|t| t.payment_reference.as_deref() == Some(new.payment_reference.as_str()))
            .cloned();
        if let Some(ticket) = existing {
            return Ok(Issued::Existing(ticket));
        }

        let ticket = Ticket {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            event_id: new.event_id,
            ticket_type_id: new.ticket_type_id,
            quantity: new.quantity,
            status: TicketStatus::Confirmed,
            check_in_status: CheckInStatus::NotCheckedIn,
            checked_in_at: None,
            checked_in_by: None,
            payment_reference: Some(new.payment_reference),
            amount_paid: Some(new.amount_paid),
            currency: Some(new.currency),
            flagged_for_review: new.flagged_for_review,
            created_at: Utc::now(),
        };
        tickets.insert(ticket.id, ticket.clone());
        Ok(Issued::Created(ticket))
    }

    async fn find_by_payment_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Ticket>, StoreError> {
        let tickets = self.lock();
        Ok(tickets
            .values()
            .find(|t| t.payment_reference.as_deref() == Some(reference))
            .cloned())
    }

    async fn get(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StoreError> {
        Ok(self.lock().get(&ticket_id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Ticket>, StoreError> {
        let tickets = self.lock();
        let mut owned: Vec<Ticket> = tickets
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }

    async fn claim_check_in(
        &self,
        ticket_id: Uuid,
        operator_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<CheckInClaim>, StoreError> {
        let mut tickets = self.lock();
        let Some(ticket) = tickets.get_mut(&ticket_id) else {
            return Ok(None);
        };

        if ticket.status != TicketStatus::Confirmed
            || ticket.check_in_status != CheckInStatus::NotCheckedIn
        {
            return Ok(Some(CheckInClaim::NotClaimed(ticket.clone())));
        }

        ticket.check_in_status = CheckInStatus::CheckedIn;
        ticket.checked_in_at = Some(at);
        ticket.checked_in_by = Some(operator_id);
        Ok(Some(CheckInClaim::Claimed(ticket.clone())))
    }

    async fn cancel(&self, ticket_id: Uuid, user_id: Uuid) -> Result<Option<Ticket>, StoreError> {
        let mut tickets = self.lock();
        let Some(ticket) = tickets.get_mut(&ticket_id) else {
            return Ok(None);
        };
        if ticket.user_id != user_id
            || !matches!(
                ticket.status,
                TicketStatus::Pending | TicketStatus::Confirmed
            )
        {
            return Ok(None);
        }
        ticket.status = TicketStatus::Cancelled;
        Ok(Some(ticket.clone()))
    }
}
