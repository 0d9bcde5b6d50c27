use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{
    CheckoutSession, ConfirmedPayment, GatewayError, NewCheckoutSession, PaymentConfirmation,
    PaymentGateway,
};

struct StaticSession {
    payment: ConfirmedPayment,
    paid: bool,
}

/// In-process gateway double. Sessions are created unpaid and flipped with
/// [`StaticGateway::mark_paid`], mirroring the buyer completing the hosted
/// payment page.
#[derive(Default)]
pub struct StaticGateway {
    sessions: Mutex<HashMap<String, StaticSession>>,
}

impl StaticGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_paid(&self, reference: &str) {
        if let Ok(mut sessions) = self.sessions.lock() {
            if let Some(session) = sessions.get_mut(reference) {
                session.paid = true;
            }
        }
    }
}

#[async_trait]
impl PaymentGateway for StaticGateway {
    async fn create_session(
        &self,
        new: NewCheckoutSession,
    ) -> Result<CheckoutSession, GatewayError> {
        let reference = format!("cs_test_{}", Uuid::new_v4().simple());
        let session = StaticSession {
            payment: ConfirmedPayment {
                reference: reference.clone(),
                metadata: new.metadata,
                amount: new.amount,
                currency: new.currency,
            },
            paid: false,
        };
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.insert(reference.clone(), session);
        }
        Ok(CheckoutSession {
            redirect_url: format!("https://checkout.invalid/pay/{reference}"),
            reference,
        })
    }

    async fn confirm(&self, reference: &str) -> Result<PaymentConfirmation, GatewayError> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|_| GatewayError::InvalidResponse("gateway double poisoned".into()))?;
        match sessions.get(reference) {
            None => Err(GatewayError::UnknownSession),
            Some(session) if session.paid => {
                Ok(PaymentConfirmation::Paid(session.payment.clone()))
            }
            Some(_) => Ok(PaymentConfirmation::NotPaid),
        }
    }
}
