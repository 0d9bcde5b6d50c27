pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Ticket;

pub use memory::InMemoryTicketStore;
pub use postgres::PgTicketStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct NewFreeTicket {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct NewPaidTicket {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    pub ticket_type_id: Option<Uuid>,
    pub payment_reference: String,
    pub amount_paid: Decimal,
    pub currency: String,
    pub flagged_for_review: bool,
}

/// Insert result distinguishing a fresh row from an idempotent hit on a
/// uniqueness constraint. A conflict is resolved to the existing ticket,
/// never surfaced as an error.
#[derive(Debug, Clone)]
pub enum Issued {
    Created(Ticket),
    Existing(Ticket),
}

impl Issued {
    pub fn into_ticket(self) -> Ticket {
        match self {
            Issued::Created(t) | Issued::Existing(t) => t,
        }
    }

    pub fn is_existing(&self) -> bool {
        matches!(self, Issued::Existing(_))
    }
}

/// Result of the conditional check-in update. `NotClaimed` carries the
/// row as it was when the condition failed, so the caller can tell an
/// already-used ticket from one that is no longer confirmed.
#[derive(Debug, Clone)]
pub enum CheckInClaim {
    Claimed(Ticket),
    NotClaimed(Ticket),
}

/// Durable record of tickets and the single source of truth for their
/// state. All cross-request coordination happens through the atomicity
/// guarantees of these methods; callers hold no state between requests.
///
/// Three operations carry the subsystem's concurrency contracts:
/// `insert_free` and `insert_paid` must resolve uniqueness at insert time
/// (conflict-as-success, never check-then-insert), and `claim_check_in`
/// must be a single conditional update, never a read-modify-write.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Insert a confirmed free ticket. At most one confirmed free ticket
    /// may exist per (event, user); hitting that constraint returns the
    /// existing ticket as `Issued::Existing`.
    async fn insert_free(&self, new: NewFreeTicket) -> Result<Issued, StoreError>;

    /// Insert a confirmed paid ticket. At most one ticket may exist per
    /// payment reference; a duplicate reference returns the existing
    /// ticket as `Issued::Existing`.
    async fn insert_paid(&self, new: NewPaidTicket) -> Result<Issued, StoreError>;

    async fn find_by_payment_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Ticket>, StoreError>;

    async fn get(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StoreError>;

    /// Newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Ticket>, StoreError>;

    /// Atomically set `checked_in` with timestamp and operator, only if the
    /// ticket is currently confirmed and not checked in. Returns `None`
    /// when no such ticket exists at all.
    async fn claim_check_in(
        &self,
        ticket_id: Uuid,
        operator_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<CheckInClaim>, StoreError>;

    /// Move a pending or confirmed ticket owned by `user_id` to cancelled,
    /// leaving the check-in audit columns untouched. Returns `None` when
    /// there is no matching row to cancel.
    async fn cancel(&self, ticket_id: Uuid, user_id: Uuid) -> Result<Option<Ticket>, StoreError>;
}
