use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    CheckoutSession, ConfirmedPayment, GatewayError, NewCheckoutSession, PaymentConfirmation,
    PaymentGateway, SessionMetadata,
};

/// REST adapter for the hosted checkout provider. The provider renders the
/// payment page; we only create sessions and poll their status with a
/// bearer secret.
pub struct CheckoutClient {
    http: reqwest::Client,
    base_url: String,
    secret: String,
    return_url: String,
}

impl CheckoutClient {
    pub fn new(base_url: impl Into<String>, secret: impl Into<String>, return_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            secret: secret.into(),
            return_url: return_url.into(),
        }
    }
}

#[derive(Serialize)]
struct CreateSessionBody<'a> {
    amount: Decimal,
    currency: &'a str,
    description: &'a str,
    metadata: &'a SessionMetadata,
    success_url: String,
    cancel_url: String,
}

#[derive(Deserialize)]
struct SessionCreated {
    id: String,
    url: String,
}

#[derive(Deserialize)]
struct SessionStatus {
    id: String,
    status: String,
    amount: Decimal,
    currency: String,
    metadata: Option<SessionMetadata>,
}

#[async_trait]
impl PaymentGateway for CheckoutClient {
    async fn create_session(
        &self,
        new: NewCheckoutSession,
    ) -> Result<CheckoutSession, GatewayError> {
        let body = CreateSessionBody {
            amount: new.amount,
            currency: &new.currency,
            description: &new.description,
            metadata: &new.metadata,
            success_url: format!("{}/tickets?session={{CHECKOUT_SESSION_ID}}", self.return_url),
            cancel_url: format!("{}/events/{}", self.return_url, new.metadata.event_id),
        };

        let response = self
            .http
            .post(format!("{}/v1/checkout/sessions", self.base_url))
            .bearer_auth(&self.secret)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let created: SessionCreated = response.json().await?;
        Ok(CheckoutSession {
            reference: created.id,
            redirect_url: created.url,
        })
    }

    async fn confirm(&self, reference: &str) -> Result<PaymentConfirmation, GatewayError> {
        let response = self
            .http
            .get(format!("{}/v1/checkout/sessions/{reference}", self.base_url))
            .bearer_auth(&self.secret)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::UnknownSession);
        }
        let response = response.error_for_status()?;
        let session: SessionStatus = response.json().await?;

        if session.status != "paid" {
            return Ok(PaymentConfirmation::NotPaid);
        }
        let metadata = session.metadata.ok_or_else(|| {
            GatewayError::InvalidResponse(format!("paid session {} has no metadata", session.id))
        })?;
        Ok(PaymentConfirmation::Paid(ConfirmedPayment {
            reference: session.id,
            metadata,
            amount: session.amount,
            currency: session.currency,
        }))
    }
}
