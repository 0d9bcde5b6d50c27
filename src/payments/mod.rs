pub mod checkout;
pub mod memory;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use checkout::CheckoutClient;
pub use memory::StaticGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("unknown checkout session")]
    UnknownSession,
    #[error("checkout provider request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("checkout provider returned an unusable response: {0}")]
    InvalidResponse(String),
}

/// Everything the gateway needs to later reconstruct the purchase. This
/// metadata rides on the hosted session and comes back verbatim in the
/// confirmation, so a payment can be correlated to a ticket without any
/// local pending row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMetadata {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    pub ticket_type_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewCheckoutSession {
    pub metadata: SessionMetadata,
    pub amount: Decimal,
    pub currency: String,
    pub description: String,
}

/// Hosted-checkout handle handed back to the client for redirect.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutSession {
    pub reference: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone)]
pub struct ConfirmedPayment {
    pub reference: String,
    pub metadata: SessionMetadata,
    pub amount: Decimal,
    pub currency: String,
}

/// Outcome of polling a session. `NotPaid` covers open and expired
/// sessions alike: not a failure, just not confirmable yet.
#[derive(Debug, Clone)]
pub enum PaymentConfirmation {
    Paid(ConfirmedPayment),
    NotPaid,
}

/// External payment collaborator. Sessions are opaque; delivery of
/// confirmations is at-least-once (webhook plus post-redirect poll), so
/// callers must treat `confirm` results idempotently.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_session(
        &self,
        new: NewCheckoutSession,
    ) -> Result<CheckoutSession, GatewayError>;

    async fn confirm(&self, reference: &str) -> Result<PaymentConfirmation, GatewayError>;
}
