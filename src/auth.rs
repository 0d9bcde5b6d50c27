use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::utils::error::AppError;

/// Header installed by the session layer in front of this service. The
/// subsystem itself never reads ambient session state; identity always
/// arrives explicitly, per request.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated identity of the requester: the buyer on issuance routes,
/// the scanning operator on check-in.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::AuthError("Authentication required".to_string()))?;

        let user_id = Uuid::parse_str(header.trim())
            .map_err(|_| AppError::AuthError("Invalid session identity".to_string()))?;

        Ok(AuthenticatedUser(user_id))
    }
}
