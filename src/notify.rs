use async_trait::async_trait;

use crate::models::Ticket;

/// Best-effort receipt delivery. Notification is an external collaborator
/// with no contract here: failures must never block or roll back an
/// issuance, so callers fire these from a spawned task and drop the result.
#[async_trait]
pub trait ReceiptNotifier: Send + Sync {
    async fn ticket_issued(&self, ticket: &Ticket);
}

/// Stand-in delivery that only records the receipt in the log stream. The
/// real mailer lives in the notifications service and subscribes the same
/// way.
pub struct LogNotifier;

#[async_trait]
impl ReceiptNotifier for LogNotifier {
    async fn ticket_issued(&self, ticket: &Ticket) {
        tracing::info!(
            ticket_id = %ticket.id,
            user_id = %ticket.user_id,
            event_id = %ticket.event_id,
            quantity = ticket.quantity,
            paid = ticket.is_paid(),
            "Ticket receipt queued"
        );
    }
}
