mod common;

use uuid::Uuid;

use koinonia_server::services::CheckInOutcome;
use koinonia_server::utils::error::AppError;

use common::{free_event, test_app};

#[tokio::test]
async fn a_confirmed_ticket_verifies_as_valid() {
    let app = test_app();
    let event = free_event(&app, Uuid::new_v4());
    let ticket = app
        .issuance
        .issue_free(event.id, Uuid::new_v4(), 2)
        .await
        .unwrap()
        .ticket;

    let report = app.verification.verify(ticket.id).await.unwrap();
    assert!(report.is_valid);
    assert!(!report.is_checked_in);
    assert!(report.checked_in_at.is_none());
    assert_eq!(report.ticket.quantity, 2);

    let event_brief = report.event.expect("event should resolve");
    assert_eq!(event_brief.id, event.id);
    assert_eq!(event_brief.title, event.title);
}

#[tokio::test]
async fn verification_never_consumes_the_ticket() {
    let app = test_app();
    let operator = Uuid::new_v4();
    let event = free_event(&app, operator);
    let ticket = app
        .issuance
        .issue_free(event.id, Uuid::new_v4(), 1)
        .await
        .unwrap()
        .ticket;

    // A holder may refresh the verification page as often as they like
    // without burning the ticket.
    for _ in 0..5 {
        let report = app.verification.verify(ticket.id).await.unwrap();
        assert!(!report.is_checked_in);
    }

    let outcome = app
        .checkin
        .check_in(&ticket.id.to_string(), event.id, operator)
        .await
        .unwrap();
    assert!(matches!(outcome, CheckInOutcome::Success { .. }));
}

#[tokio::test]
async fn an_attendee_can_prove_their_recorded_check_in() {
    let app = test_app();
    let operator = Uuid::new_v4();
    let event = free_event(&app, operator);
    let ticket = app
        .issuance
        .issue_free(event.id, Uuid::new_v4(), 1)
        .await
        .unwrap()
        .ticket;

    app.checkin
        .check_in(&ticket.id.to_string(), event.id, operator)
        .await
        .unwrap();

    let report = app.verification.verify(ticket.id).await.unwrap();
    assert!(report.is_valid);
    assert!(report.is_checked_in);
    assert!(report.checked_in_at.is_some());
}

#[tokio::test]
async fn cancelled_tickets_verify_as_invalid() {
    let app = test_app();
    let event = free_event(&app, Uuid::new_v4());
    let user = Uuid::new_v4();
    let ticket = app
        .issuance
        .issue_free(event.id, user, 1)
        .await
        .unwrap()
        .ticket;
    app.issuance.cancel(ticket.id, user).await.unwrap();

    let report = app.verification.verify(ticket.id).await.unwrap();
    assert!(!report.is_valid);
    assert!(!report.is_checked_in);
}

#[tokio::test]
async fn unknown_tickets_are_not_found() {
    let app = test_app();
    let err = app.verification.verify(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn a_vanished_event_leaves_the_ticket_verifiable() {
    let app = test_app();
    let event = free_event(&app, Uuid::new_v4());
    let ticket = app
        .issuance
        .issue_free(event.id, Uuid::new_v4(), 1)
        .await
        .unwrap()
        .ticket;

    app.directory.remove_event(event.id);

    let report = app.verification.verify(ticket.id).await.unwrap();
    assert!(report.is_valid);
    assert!(report.event.is_none());
}
