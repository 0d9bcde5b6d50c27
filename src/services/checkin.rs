use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::directory::EventDirectory;
use crate::models::Ticket;
use crate::proof;
use crate::store::{CheckInClaim, TicketStore};
use crate::utils::error::AppError;

/// Every way a scan can land, as shown to the operator. All four are
/// ordinary outcomes at a busy door, not errors; `already_used` in
/// particular must read differently from `invalid` so stewards can wave
/// through someone re-scanning their own ticket by mistake.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CheckInOutcome {
    Success {
        ticket_id: Uuid,
        quantity: i32,
        checked_in_at: DateTime<Utc>,
    },
    AlreadyUsed {
        ticket_id: Uuid,
        checked_in_at: Option<DateTime<Utc>>,
        checked_in_by: Option<Uuid>,
    },
    WrongEvent {
        ticket_id: Uuid,
        ticket_event_id: Uuid,
    },
    Invalid {
        reason: String,
    },
}

impl CheckInOutcome {
    fn already_used(ticket: &Ticket) -> Self {
        CheckInOutcome::AlreadyUsed {
            ticket_id: ticket.id,
            checked_in_at: ticket.checked_in_at,
            checked_in_by: ticket.checked_in_by,
        }
    }

    fn invalid_status(ticket: &Ticket) -> Self {
        CheckInOutcome::Invalid {
            reason: format!("Ticket status: {}, cannot check in", ticket.status),
        }
    }
}

/// Validates a presented proof against the store and the target event,
/// then flips check-in state through the store's conditional claim. Holds
/// no state of its own; two scanners on two instances coordinate purely
/// through the store.
pub struct CheckInService {
    store: Arc<dyn TicketStore>,
    directory: Arc<dyn EventDirectory>,
}

impl CheckInService {
    pub fn new(store: Arc<dyn TicketStore>, directory: Arc<dyn EventDirectory>) -> Self {
        Self { store, directory }
    }

    pub async fn check_in(
        &self,
        raw_proof: &str,
        target_event_id: Uuid,
        operator_id: Uuid,
    ) -> Result<CheckInOutcome, AppError> {
        let event = self
            .directory
            .get_event(target_event_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Event '{target_event_id}' was not found"))
            })?;
        if event.organizer_id != operator_id {
            return Err(AppError::Forbidden(
                "Only the event's organizer may check tickets in".to_string(),
            ));
        }

        let ticket_id = match proof::decode(raw_proof) {
            Ok(id) => id,
            Err(_) => {
                return Ok(CheckInOutcome::Invalid {
                    reason: "Could not read a ticket from the scanned code".to_string(),
                });
            }
        };

        let Some(ticket) = self.store.get(ticket_id).await? else {
            return Ok(CheckInOutcome::Invalid {
                reason: "Ticket not found".to_string(),
            });
        };

        // A scanner configured for event A must reject event B's tickets,
        // whatever their state.
        if ticket.event_id != target_event_id {
            return Ok(CheckInOutcome::WrongEvent {
                ticket_id: ticket.id,
                ticket_event_id: ticket.event_id,
            });
        }

        if !ticket.is_confirmed() {
            return Ok(CheckInOutcome::invalid_status(&ticket));
        }

        if ticket.is_checked_in() {
            return Ok(CheckInOutcome::already_used(&ticket));
        }

        // The conditional claim decides the winner; everything above was
        // only for friendlier messages and could race harmlessly.
        let now = Utc::now();
        match self.store.claim_check_in(ticket_id, operator_id, now).await? {
            Some(CheckInClaim::Claimed(claimed)) => {
                info!(
                    ticket_id = %claimed.id,
                    event_id = %target_event_id,
                    operator_id = %operator_id,
                    quantity = claimed.quantity,
                    "Ticket checked in"
                );
                Ok(CheckInOutcome::Success {
                    ticket_id: claimed.id,
                    quantity: claimed.quantity,
                    checked_in_at: claimed.checked_in_at.unwrap_or(now),
                })
            }
            Some(CheckInClaim::NotClaimed(current)) => {
                if current.is_checked_in() {
                    info!(ticket_id = %current.id, "Ticket already used");
                    Ok(CheckInOutcome::already_used(&current))
                } else {
                    Ok(CheckInOutcome::invalid_status(&current))
                }
            }
            None => Ok(CheckInOutcome::Invalid {
                reason: "Ticket not found".to_string(),
            }),
        }
    }
}
