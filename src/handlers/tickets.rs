use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::models::Ticket;
use crate::proof::ProofPayload;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

fn default_quantity() -> i32 {
    1
}

#[derive(Deserialize)]
pub struct IssueFreeTicketRequest {
    pub event_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

/// A ticket plus its scannable proof. `qr_content` is the exact string to
/// render as a QR code.
#[derive(Serialize)]
pub struct TicketResponse {
    pub ticket: Ticket,
    pub proof: ProofPayload,
    pub qr_content: String,
}

pub(crate) async fn ticket_response(
    state: &AppState,
    ticket: Ticket,
) -> Result<TicketResponse, AppError> {
    let event_title = state
        .directory
        .get_event(ticket.event_id)
        .await?
        .map(|e| e.title)
        .unwrap_or_else(|| "Unavailable event".to_string());

    let proof = ProofPayload::for_ticket(&ticket, &event_title, &state.config.public_base_url);
    let qr_content = proof
        .encode()
        .map_err(|e| AppError::InternalServerError(format!("Could not encode proof: {e}")))?;

    Ok(TicketResponse {
        ticket,
        proof,
        qr_content,
    })
}

pub async fn issue_free_ticket(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(body): Json<IssueFreeTicketRequest>,
) -> Result<Response, AppError> {
    let issued = state
        .issuance
        .issue_free(body.event_id, user_id, body.quantity)
        .await?;

    let already_issued = issued.already_issued;
    let payload = ticket_response(&state, issued.ticket).await?;
    if already_issued {
        Ok(success(payload, "You are already registered for this event").into_response())
    } else {
        Ok(created(payload, "Ticket issued").into_response())
    }
}

pub async fn list_tickets(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Response, AppError> {
    let tickets = state.issuance.list_for_user(user_id).await?;

    let mut payload = Vec::with_capacity(tickets.len());
    for ticket in tickets {
        payload.push(ticket_response(&state, ticket).await?);
    }
    Ok(success(payload, "Your tickets").into_response())
}

pub async fn cancel_ticket(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(ticket_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let cancelled = state.issuance.cancel(ticket_id, user_id).await?;
    Ok(success(cancelled, "Ticket cancelled").into_response())
}
