use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{CheckInStatus, Ticket, TicketStatus};

use super::{CheckInClaim, Issued, NewFreeTicket, NewPaidTicket, StoreError, TicketStore};

const TICKET_COLUMNS: &str = "id, user_id, event_id, ticket_type_id, quantity, status, \
     check_in_status, checked_in_at, checked_in_by, payment_reference, amount_paid, currency, \
     flagged_for_review, created_at";

/// Postgres-backed ticket store. Uniqueness lives in two partial unique
/// indexes (free claim per event/user, payment reference) and check-in in
/// a conditional UPDATE, so every contract of [`TicketStore`] holds across
/// concurrent service instances sharing the database.
pub struct PgTicketStore {
    pool: PgPool,
}

impl PgTicketStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_confirmed_free(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Ticket>, StoreError> {
        let sql = format!(
            "SELECT {TICKET_COLUMNS} FROM tickets \
             WHERE event_id = $1 AND user_id = $2 \
               AND status = 'confirmed' AND payment_reference IS NULL"
        );
        let ticket = sqlx::query_as::<_, Ticket>(&sql)
            .bind(event_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ticket)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
impl TicketStore for PgTicketStore {
    async fn insert_free(&self, new: NewFreeTicket) -> Result<Issued, StoreError> {
        let sql = format!(
            "INSERT INTO tickets (id, user_id, event_id, quantity, status, check_in_status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {TICKET_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Ticket>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.user_id)
            .bind(new.event_id)
            .bind(new.quantity)
            .bind(TicketStatus::Confirmed)
            .bind(CheckInStatus::NotCheckedIn)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await;

        match inserted {
            Ok(ticket) => Ok(Issued::Created(ticket)),
            Err(e) if is_unique_violation(&e) => {
                // Another request won the insert; the constraint resolved
                // the race, so hand back the winner's row.
                match self.find_confirmed_free(new.event_id, new.user_id).await? {
                    Some(existing) => Ok(Issued::Existing(existing)),
                    None => Err(StoreError::Database(sqlx::Error::RowNotFound)),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn insert_paid(&self, new: NewPaidTicket) -> Result<Issued, StoreError> {
        let sql = format!(
            "INSERT INTO tickets (id, user_id, event_id, ticket_type_id, quantity, status, \
                 check_in_status, payment_reference, amount_paid, currency, flagged_for_review, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {TICKET_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Ticket>(&sql)
            .bind(Uuid::new_v4())
            .bind(new.user_id)
            .bind(new.event_id)
            .bind(new.ticket_type_id)
            .bind(new.quantity)
            .bind(TicketStatus::Confirmed)
            .bind(CheckInStatus::NotCheckedIn)
            .bind(&new.payment_reference)
            .bind(new.amount_paid)
            .bind(&new.currency)
            .bind(new.flagged_for_review)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await;

        match inserted {
            Ok(ticket) => Ok(Issued::Created(ticket)),
            Err(e) if is_unique_violation(&e) => {
                match self
                    .find_by_payment_reference(&new.payment_reference)
                    .await?
                {
                    Some(existing) => Ok(Issued::Existing(existing)),
                    None => Err(StoreError::Database(sqlx::Error::RowNotFound)),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_payment_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Ticket>, StoreError> {
        let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE payment_reference = $1");
        let ticket = sqlx::query_as::<_, Ticket>(&sql)
            .bind(reference)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ticket)
    }

    async fn get(&self, ticket_id: Uuid) -> Result<Option<Ticket>, StoreError> {
        let sql = format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE id = $1");
        let ticket = sqlx::query_as::<_, Ticket>(&sql)
            .bind(ticket_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ticket)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Ticket>, StoreError> {
        let sql = format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let tickets = sqlx::query_as::<_, Ticket>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(tickets)
    }

    async fn claim_check_in(
        &self,
        ticket_id: Uuid,
        operator_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Option<CheckInClaim>, StoreError> {
        // The WHERE clause is the whole contract: of N concurrent claims,
        // exactly one matches the row and flips it.
        let sql = format!(
            "UPDATE tickets \
             SET check_in_status = 'checked_in', checked_in_at = $2, checked_in_by = $3 \
             WHERE id = $1 AND status = 'confirmed' AND check_in_status = 'not_checked_in' \
             RETURNING {TICKET_COLUMNS}"
        );
        let claimed = sqlx::query_as::<_, Ticket>(&sql)
            .bind(ticket_id)
            .bind(at)
            .bind(operator_id)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(ticket) = claimed {
            return Ok(Some(CheckInClaim::Claimed(ticket)));
        }

        // Lost the claim (or the ticket is not claimable); report the row
        // as it stands so the caller can name the reason.
        Ok(self.get(ticket_id).await?.map(CheckInClaim::NotClaimed))
    }

    async fn cancel(&self, ticket_id: Uuid, user_id: Uuid) -> Result<Option<Ticket>, StoreError> {
        let sql = format!(
            "UPDATE tickets SET status = 'cancelled' \
             WHERE id = $1 AND user_id = $2 AND status IN ('pending', 'confirmed') \
             RETURNING {TICKET_COLUMNS}"
        );
        let ticket = sqlx::query_as::<_, Ticket>(&sql)
            .bind(ticket_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(ticket)
    }
}
