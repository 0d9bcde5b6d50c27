use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{
    checkin::check_in,
    health_check,
    payments::{create_checkout_session, reconcile_payment},
    tickets::{cancel_ticket, issue_free_ticket, list_tickets},
    verification::verify_ticket,
};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/tickets/free", post(issue_free_ticket))
        .route("/api/tickets", get(list_tickets))
        .route("/api/tickets/:ticket_id/cancel", post(cancel_ticket))
        .route("/api/checkout/sessions", post(create_checkout_session))
        .route("/api/payments/reconcile", post(reconcile_payment))
        .route("/api/checkin", post(check_in))
        .route("/api/verify/:ticket_id", get(verify_ticket))
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
