use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle status of a ticket. Legal transitions are
/// `pending -> confirmed` and `pending|confirmed -> cancelled`;
/// a confirmed ticket never goes back to pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "ticket_status", rename_all = "snake_case")]
pub enum TicketStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Pending => "pending",
            TicketStatus::Confirmed => "confirmed",
            TicketStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-directional: `not_checked_in -> checked_in`, no undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "check_in_status", rename_all = "snake_case")]
pub enum CheckInStatus {
    NotCheckedIn,
    CheckedIn,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub ticket_type_id: Option<Uuid>,
    pub quantity: i32,
    pub status: TicketStatus,
    pub check_in_status: CheckInStatus,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_in_by: Option<Uuid>,
    pub payment_reference: Option<String>,
    pub amount_paid: Option<Decimal>,
    pub currency: Option<String>,
    pub flagged_for_review: bool,
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    pub fn is_confirmed(&self) -> bool {
        self.status == TicketStatus::Confirmed
    }

    pub fn is_checked_in(&self) -> bool {
        self.check_in_status == CheckInStatus::CheckedIn
    }

    /// Free registrations carry no payment linkage.
    pub fn is_paid(&self) -> bool {
        self.payment_reference.is_some()
    }

    pub fn payment_metadata(&self) -> Option<PaymentMetadata> {
        let reference = self.payment_reference.clone()?;
        Some(PaymentMetadata {
            reference,
            amount: self.amount_paid.unwrap_or_default(),
            currency: self.currency.clone().unwrap_or_default(),
            quantity: self.quantity,
        })
    }
}

/// The external-payment linkage of a paid ticket. The `reference` is the
/// gateway session id and doubles as the reconciliation idempotency key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMetadata {
    pub reference: String,
    pub amount: Decimal,
    pub currency: String,
    pub quantity: i32,
}

/// Priced admission tier for an event, owned by the event's organizer.
/// A ticket references at most one tier, or none for the implicit
/// general admission.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TicketType {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub price: Decimal,
}
