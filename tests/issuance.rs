mod common;

use rust_decimal::Decimal;
use uuid::Uuid;

use koinonia_server::models::{CheckInStatus, TicketStatus};
use koinonia_server::utils::error::AppError;

use common::{ended_event, free_event, paid_event, test_app};

#[tokio::test]
async fn free_issuance_creates_a_confirmed_ticket() {
    let app = test_app();
    let user = Uuid::new_v4();
    let event = free_event(&app, Uuid::new_v4());

    let issued = app.issuance.issue_free(event.id, user, 2).await.unwrap();

    assert!(!issued.already_issued);
    let ticket = issued.ticket;
    assert_eq!(ticket.event_id, event.id);
    assert_eq!(ticket.user_id, user);
    assert_eq!(ticket.quantity, 2);
    assert_eq!(ticket.status, TicketStatus::Confirmed);
    assert_eq!(ticket.check_in_status, CheckInStatus::NotCheckedIn);
    assert!(ticket.checked_in_at.is_none());
    assert!(ticket.payment_reference.is_none());
}

#[tokio::test]
async fn free_issuance_is_idempotent_per_event_and_user() {
    let app = test_app();
    let user = Uuid::new_v4();
    let event = free_event(&app, Uuid::new_v4());

    let first = app.issuance.issue_free(event.id, user, 1).await.unwrap();
    let second = app.issuance.issue_free(event.id, user, 1).await.unwrap();

    assert!(!first.already_issued);
    assert!(second.already_issued);
    assert_eq!(first.ticket.id, second.ticket.id);

    let tickets = app.issuance.list_for_user(user).await.unwrap();
    assert_eq!(tickets.len(), 1);
}

#[tokio::test]
async fn concurrent_free_issuance_creates_a_single_ticket() {
    let app = test_app();
    let user = Uuid::new_v4();
    let event = free_event(&app, Uuid::new_v4());

    let attempts = futures::future::join_all((0..8).map(|_| {
        let issuance = app.issuance.clone();
        async move { issuance.issue_free(event.id, user, 1).await }
    }))
    .await;

    let ids: Vec<Uuid> = attempts
        .into_iter()
        .map(|r| r.unwrap().ticket.id)
        .collect();
    assert!(ids.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(app.issuance.list_for_user(user).await.unwrap().len(), 1);
}

#[tokio::test]
async fn issuance_closes_when_the_event_starts() {
    let app = test_app();
    let user = Uuid::new_v4();
    let event = ended_event(&app, Uuid::new_v4());

    let err = app.issuance.issue_free(event.id, user, 1).await.unwrap_err();
    assert!(matches!(err, AppError::SalesEnded(_)));
    assert!(app.issuance.list_for_user(user).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_event_is_not_found() {
    let app = test_app();

    let err = app
        .issuance
        .issue_free(Uuid::new_v4(), Uuid::new_v4(), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn quantity_must_be_positive() {
    let app = test_app();
    let event = free_event(&app, Uuid::new_v4());

    let err = app
        .issuance
        .issue_free(event.id, Uuid::new_v4(), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn priced_events_reject_the_free_path() {
    let app = test_app();
    let event = paid_event(&app, Uuid::new_v4(), Decimal::new(2500, 2));

    let err = app
        .issuance
        .issue_free(event.id, Uuid::new_v4(), 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn cancelling_frees_the_registration_slot() {
    let app = test_app();
    let user = Uuid::new_v4();
    let event = free_event(&app, Uuid::new_v4());

    let first = app
        .issuance
        .issue_free(event.id, user, 1)
        .await
        .unwrap()
        .ticket;
    let cancelled = app.issuance.cancel(first.id, user).await.unwrap();
    assert_eq!(cancelled.status, TicketStatus::Cancelled);

    // The confirmed-claim uniqueness only binds live tickets, so the user
    // may register again after cancelling.
    let second = app.issuance.issue_free(event.id, user, 1).await.unwrap();
    assert!(!second.already_issued);
    assert_ne!(second.ticket.id, first.id);
}

#[tokio::test]
async fn cancel_rejects_strangers_and_missing_tickets() {
    let app = test_app();
    let user = Uuid::new_v4();
    let event = free_event(&app, Uuid::new_v4());
    let ticket = app
        .issuance
        .issue_free(event.id, user, 1)
        .await
        .unwrap()
        .ticket;

    let err = app
        .issuance
        .cancel(ticket.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = app.issuance.cancel(Uuid::new_v4(), user).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn begin_paid_opens_a_session_without_writing_a_ticket() {
    let app = test_app();
    let user = Uuid::new_v4();
    let event = paid_event(&app, Uuid::new_v4(), Decimal::new(1500, 2));

    let session = app
        .issuance
        .begin_paid(event.id, user, 2, None)
        .await
        .unwrap();
    assert!(session.reference.starts_with("cs_test_"));
    assert!(!session.redirect_url.is_empty());

    // No unpaid placeholder rows leak into the store.
    assert!(app.issuance.list_for_user(user).await.unwrap().is_empty());
}

#[tokio::test]
async fn begin_paid_rejects_free_events_and_foreign_tiers() {
    let app = test_app();
    let user = Uuid::new_v4();
    let free = free_event(&app, Uuid::new_v4());

    let err = app
        .issuance
        .begin_paid(free.id, user, 1, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let paid = paid_event(&app, Uuid::new_v4(), Decimal::new(1000, 2));
    let other = paid_event(&app, Uuid::new_v4(), Decimal::new(1000, 2));
    let foreign_tier = common::ticket_tier(&app, &other, Decimal::new(2000, 2));

    let err = app
        .issuance
        .begin_paid(paid.id, user, 1, Some(foreign_tier.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}
