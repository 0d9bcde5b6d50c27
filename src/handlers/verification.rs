use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

/// Public and unauthenticated by design: the ticket id is the only
/// credential, the lookup mutates nothing, and repeated calls are free.
pub async fn verify_ticket(
    State(state): State<AppState>,
    Path(ticket_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let report = state.verification.verify(ticket_id).await?;
    Ok(success(report, "Ticket verification").into_response())
}
