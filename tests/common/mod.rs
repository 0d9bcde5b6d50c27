#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use koinonia_server::config::Config;
use koinonia_server::directory::{EventDirectory, InMemoryEventDirectory};
use koinonia_server::models::{EventSummary, TicketType};
use koinonia_server::notify::{LogNotifier, ReceiptNotifier};
use koinonia_server::payments::{PaymentGateway, StaticGateway};
use koinonia_server::services::{CheckInService, IssuanceService, VerificationService};
use koinonia_server::state::AppState;
use koinonia_server::store::{InMemoryTicketStore, TicketStore};

pub const BASE_URL: &str = "http://localhost:3001";

/// Everything wired against the in-memory backends, the way production
/// wiring uses the Postgres ones.
pub struct TestApp {
    pub store: Arc<InMemoryTicketStore>,
    pub directory: Arc<InMemoryEventDirectory>,
    pub gateway: Arc<StaticGateway>,
    pub issuance: Arc<IssuanceService>,
    pub checkin: Arc<CheckInService>,
    pub verification: Arc<VerificationService>,
    pub state: AppState,
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused.invalid/koinonia".to_string(),
        port: 0,
        public_base_url: BASE_URL.to_string(),
        checkout_base_url: "https://api.checkout.invalid".to_string(),
        checkout_secret: "sk_test".to_string(),
        checkout_return_url: "http://localhost:3000".to_string(),
    }
}

pub fn test_app() -> TestApp {
    let store = Arc::new(InMemoryTicketStore::new());
    let directory = Arc::new(InMemoryEventDirectory::new());
    let gateway = Arc::new(StaticGateway::new());

    let state = AppState::new(
        Arc::clone(&store) as Arc<dyn TicketStore>,
        Arc::clone(&directory) as Arc<dyn EventDirectory>,
        Arc::clone(&gateway) as Arc<dyn PaymentGateway>,
        Arc::new(LogNotifier) as Arc<dyn ReceiptNotifier>,
        test_config(),
    );

    TestApp {
        store,
        directory,
        gateway,
        issuance: Arc::clone(&state.issuance),
        checkin: Arc::clone(&state.checkin),
        verification: Arc::clone(&state.verification),
        state,
    }
}

pub fn event_starting_in(organizer_id: Uuid, minutes: i64, price: Option<Decimal>) -> EventSummary {
    EventSummary {
        id: Uuid::new_v4(),
        organizer_id,
        title: "Wednesday Night Worship".to_string(),
        starts_at: Utc::now() + Duration::minutes(minutes),
        location: "Fellowship Hall".to_string(),
        price,
        capacity: Some(200),
    }
}

/// Registration-style event, starting comfortably in the future.
pub fn free_event(app: &TestApp, organizer_id: Uuid) -> EventSummary {
    let event = event_starting_in(organizer_id, 120, None);
    app.directory.insert_event(event.clone());
    event
}

pub fn paid_event(app: &TestApp, organizer_id: Uuid, price: Decimal) -> EventSummary {
    let event = event_starting_in(organizer_id, 120, Some(price));
    app.directory.insert_event(event.clone());
    event
}

pub fn ended_event(app: &TestApp, organizer_id: Uuid) -> EventSummary {
    let event = event_starting_in(organizer_id, -30, None);
    app.directory.insert_event(event.clone());
    event
}

pub fn ticket_tier(app: &TestApp, event: &EventSummary, price: Decimal) -> TicketType {
    let tier = TicketType {
        id: Uuid::new_v4(),
        event_id: event.id,
        name: "Reserved seating".to_string(),
        price,
    };
    app.directory.insert_ticket_type(tier.clone());
    tier
}
