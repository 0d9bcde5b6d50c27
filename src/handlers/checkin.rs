use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::services::CheckInOutcome;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

#[derive(Deserialize)]
pub struct CheckInRequest {
    /// Whatever the scanner read: the QR payload, a bare ticket id typed
    /// at the door, or a verification URL.
    pub proof: String,
    pub event_id: Uuid,
}

/// All four outcomes are 200s with a tagged body; a door running hundreds
/// of scans treats `already_used` and `wrong_event` as routine, and only
/// infrastructure faults surface as error statuses.
pub async fn check_in(
    State(state): State<AppState>,
    AuthenticatedUser(operator_id): AuthenticatedUser,
    Json(body): Json<CheckInRequest>,
) -> Result<Response, AppError> {
    let outcome = state
        .checkin
        .check_in(&body.proof, body.event_id, operator_id)
        .await?;

    let message = match &outcome {
        CheckInOutcome::Success { quantity, .. } => {
            format!("Checked in ({quantity} seat(s))")
        }
        CheckInOutcome::AlreadyUsed { .. } => "Ticket was already used".to_string(),
        CheckInOutcome::WrongEvent { .. } => "Ticket is for a different event".to_string(),
        CheckInOutcome::Invalid { reason } => reason.clone(),
    };
    Ok(success(outcome, message).into_response())
}
