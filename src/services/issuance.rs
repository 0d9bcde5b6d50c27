use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::directory::EventDirectory;
use crate::models::{EventSummary, Ticket};
use crate::notify::ReceiptNotifier;
use crate::payments::{
    CheckoutSession, GatewayError, NewCheckoutSession, PaymentConfirmation, PaymentGateway,
    SessionMetadata,
};
use crate::store::{Issued, NewFreeTicket, NewPaidTicket, TicketStore};
use crate::utils::error::AppError;

/// Result of the free/instant path. `already_issued` marks the idempotent
/// hit on an earlier registration; the API layer phrases it differently
/// but it is never an error.
#[derive(Debug)]
pub struct IssuedTicket {
    pub ticket: Ticket,
    pub already_issued: bool,
}

/// Result of correlating a payment confirmation to a ticket. `flagged`
/// mirrors the ticket's review flag: the paid session referenced event or
/// tier data that no longer resolves, so an operator needs to look.
#[derive(Debug)]
pub struct ReconciledTicket {
    pub ticket: Ticket,
    pub already_issued: bool,
    pub flagged: bool,
}

/// Creates tickets. The free path issues instantly and is idempotent by
/// the (event, user) natural key; the paid path hands off to the external
/// checkout and later reconciles the confirmation into a ticket exactly
/// once, keyed by the payment reference.
pub struct IssuanceService {
    store: Arc<dyn TicketStore>,
    directory: Arc<dyn EventDirectory>,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn ReceiptNotifier>,
}

impl IssuanceService {
    pub fn new(
        store: Arc<dyn TicketStore>,
        directory: Arc<dyn EventDirectory>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn ReceiptNotifier>,
    ) -> Self {
        Self {
            store,
            directory,
            gateway,
            notifier,
        }
    }

    async fn open_event(&self, event_id: Uuid) -> Result<EventSummary, AppError> {
        let event = self
            .directory
            .get_event(event_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event '{event_id}' was not found")))?;
        if event.sales_closed(Utc::now()) {
            return Err(AppError::SalesEnded(format!(
                "Sales for '{}' closed when the event started",
                event.title
            )));
        }
        Ok(event)
    }

    pub async fn issue_free(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        quantity: i32,
    ) -> Result<IssuedTicket, AppError> {
        if quantity < 1 {
            return Err(AppError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }
        let event = self.open_event(event_id).await?;
        if !event.is_free() {
            return Err(AppError::ValidationError(
                "This event requires payment; use checkout instead".to_string(),
            ));
        }

        let issued = self
            .store
            .insert_free(NewFreeTicket {
                event_id,
                user_id,
                quantity,
            })
            .await?;

        match issued {
            Issued::Created(ticket) => {
                info!(ticket_id = %ticket.id, event_id = %event_id, "Free ticket issued");
                self.send_receipt(&ticket);
                Ok(IssuedTicket {
                    ticket,
                    already_issued: false,
                })
            }
            Issued::Existing(ticket) => Ok(IssuedTicket {
                ticket,
                already_issued: true,
            }),
        }
    }

    /// Start a paid purchase. No ticket row is written here: the pending
    /// state lives only in the external session, so an abandoned checkout
    /// leaves nothing behind.
    pub async fn begin_paid(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        quantity: i32,
        ticket_type_id: Option<Uuid>,
    ) -> Result<CheckoutSession, AppError> {
        if quantity < 1 {
            return Err(AppError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }
        let event = self.open_event(event_id).await?;

        let unit_price = match ticket_type_id {
            Some(tt_id) => {
                let tier = self.directory.get_ticket_type(tt_id).await?.ok_or_else(|| {
                    AppError::NotFound(format!("Ticket type '{tt_id}' was not found"))
                })?;
                if tier.event_id != event_id {
                    return Err(AppError::ValidationError(
                        "Ticket type does not belong to this event".to_string(),
                    ));
                }
                tier.price
            }
            None => event.price.unwrap_or(Decimal::ZERO),
        };
        if unit_price <= Decimal::ZERO {
            return Err(AppError::ValidationError(
                "This event is free; register directly instead of paying".to_string(),
            ));
        }

        let session = self
            .gateway
            .create_session(NewCheckoutSession {
                metadata: SessionMetadata {
                    event_id,
                    user_id,
                    quantity,
                    ticket_type_id,
                },
                amount: unit_price * Decimal::from(quantity),
                currency: "usd".to_string(),
                description: format!("{} x{}", event.title, quantity),
            })
            .await
            .map_err(|e| AppError::ExternalServiceError(format!("Checkout unavailable: {e}")))?;

        info!(reference = %session.reference, event_id = %event_id, "Checkout session opened");
        Ok(session)
    }

    /// Correlate a reported payment to a ticket, exactly once. Safe to call
    /// from the gateway webhook and the post-redirect page concurrently:
    /// the payment-reference uniqueness at the store resolves the race.
    pub async fn reconcile(&self, reference: &str) -> Result<ReconciledTicket, AppError> {
        if let Some(ticket) = self.store.find_by_payment_reference(reference).await? {
            let flagged = ticket.flagged_for_review;
            return Ok(ReconciledTicket {
                ticket,
                already_issued: true,
                flagged,
            });
        }

        let payment = match self.gateway.confirm(reference).await {
            Ok(PaymentConfirmation::Paid(payment)) => payment,
            Ok(PaymentConfirmation::NotPaid) | Err(GatewayError::UnknownSession) => {
                return Err(AppError::PaymentNotConfirmed(
                    "Payment has not been confirmed yet".to_string(),
                ));
            }
            Err(e) => {
                return Err(AppError::ExternalServiceError(format!(
                    "Could not reach the payment provider: {e}"
                )));
            }
        };

        // The money has been taken, so a ticket is issued no matter what;
        // references that no longer resolve only flag it for review.
        let meta = &payment.metadata;
        let mut stale_parts = Vec::new();
        if self.directory.get_event(meta.event_id).await?.is_none() {
            stale_parts.push("event");
        }
        if let Some(tt_id) = meta.ticket_type_id {
            match self.directory.get_ticket_type(tt_id).await? {
                Some(tier) if tier.event_id == meta.event_id => {}
                _ => stale_parts.push("ticket type"),
            }
        }
        let flagged = !stale_parts.is_empty();
        if flagged {
            warn!(
                reference,
                stale = stale_parts.join(", "),
                "Paid session references stale data; issuing flagged ticket"
            );
        }

        let issued = self
            .store
            .insert_paid(NewPaidTicket {
                event_id: meta.event_id,
                user_id: meta.user_id,
                quantity: meta.quantity,
                ticket_type_id: meta.ticket_type_id,
                payment_reference: payment.reference.clone(),
                amount_paid: payment.amount,
                currency: payment.currency.clone(),
                flagged_for_review: flagged,
            })
            .await?;

        match issued {
            Issued::Created(ticket) => {
                info!(ticket_id = %ticket.id, reference, "Payment reconciled into ticket");
                self.send_receipt(&ticket);
                let flagged = ticket.flagged_for_review;
                Ok(ReconciledTicket {
                    ticket,
                    already_issued: false,
                    flagged,
                })
            }
            // A concurrent reconciliation of the same reference won the
            // insert; its ticket is the one and only.
            Issued::Existing(ticket) => {
                let flagged = ticket.flagged_for_review;
                Ok(ReconciledTicket {
                    ticket,
                    already_issued: true,
                    flagged,
                })
            }
        }
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Ticket>, AppError> {
        Ok(self.store.list_for_user(user_id).await?)
    }

    pub async fn cancel(&self, ticket_id: Uuid, user_id: Uuid) -> Result<Ticket, AppError> {
        let cancelled = self.store.cancel(ticket_id, user_id).await?.ok_or_else(|| {
            AppError::NotFound("No cancellable ticket with that id".to_string())
        })?;
        info!(ticket_id = %ticket_id, "Ticket cancelled");
        Ok(cancelled)
    }

    /// Receipts are best-effort: spawned and forgotten so a slow or failing
    /// mailer can never block issuance.
    fn send_receipt(&self, ticket: &Ticket) {
        let notifier = Arc::clone(&self.notifier);
        let ticket = ticket.clone();
        tokio::spawn(async move {
            notifier.ticket_issued(&ticket).await;
        });
    }
}
