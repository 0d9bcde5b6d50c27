use std::sync::Arc;

use crate::config::Config;
use crate::directory::EventDirectory;
use crate::notify::ReceiptNotifier;
use crate::payments::PaymentGateway;
use crate::services::{CheckInService, IssuanceService, VerificationService};
use crate::store::TicketStore;

/// Shared handler state: the services plus the directory (for proof
/// display lookups). Everything behind `Arc`s; no per-request state
/// survives the request.
#[derive(Clone)]
pub struct AppState {
    pub issuance: Arc<IssuanceService>,
    pub checkin: Arc<CheckInService>,
    pub verification: Arc<VerificationService>,
    pub directory: Arc<dyn EventDirectory>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn TicketStore>,
        directory: Arc<dyn EventDirectory>,
        gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn ReceiptNotifier>,
        config: Config,
    ) -> Self {
        Self {
            issuance: Arc::new(IssuanceService::new(
                Arc::clone(&store),
                Arc::clone(&directory),
                gateway,
                notifier,
            )),
            checkin: Arc::new(CheckInService::new(
                Arc::clone(&store),
                Arc::clone(&directory),
            )),
            verification: Arc::new(VerificationService::new(store, Arc::clone(&directory))),
            directory,
            config: Arc::new(config),
        }
    }
}
