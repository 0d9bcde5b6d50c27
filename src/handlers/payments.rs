use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, pending, success};

use super::tickets::ticket_response;

fn default_quantity() -> i32 {
    1
}

#[derive(Deserialize)]
pub struct CreateCheckoutSessionRequest {
    pub event_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    pub ticket_type_id: Option<Uuid>,
}

pub async fn create_checkout_session(
    State(state): State<AppState>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(body): Json<CreateCheckoutSessionRequest>,
) -> Result<Response, AppError> {
    let session = state
        .issuance
        .begin_paid(body.event_id, user_id, body.quantity, body.ticket_type_id)
        .await?;
    Ok(success(session, "Continue to payment").into_response())
}

#[derive(Deserialize)]
pub struct ReconcilePaymentRequest {
    pub reference: String,
}

/// Called by the gateway's webhook and by the buyer's post-redirect page,
/// possibly at the same time; reconciliation is idempotent so both callers
/// land on the same ticket.
pub async fn reconcile_payment(
    State(state): State<AppState>,
    Json(body): Json<ReconcilePaymentRequest>,
) -> Result<Response, AppError> {
    match state.issuance.reconcile(&body.reference).await {
        Ok(reconciled) => {
            let already_issued = reconciled.already_issued;
            let payload = ticket_response(&state, reconciled.ticket).await?;
            if already_issued {
                Ok(success(payload, "Payment already reconciled").into_response())
            } else {
                Ok(created(payload, "Payment confirmed, ticket issued").into_response())
            }
        }
        // The authoritative state may land moments after the redirect;
        // keep the message generic and let the buyer's tickets list catch
        // up.
        Err(AppError::PaymentNotConfirmed(_)) => Ok(pending(
            "We couldn't confirm your payment immediately. Check your tickets list in a moment.",
        )
        .into_response()),
        Err(e) => Err(e),
    }
}
