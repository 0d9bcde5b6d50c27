use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{EventSummary, TicketType};
use crate::store::StoreError;

/// Read-only view of the events subsystem. Event and ticket-type rows are
/// owned elsewhere; this service only resolves them for validation, sale
/// windows, pricing and display.
#[async_trait]
pub trait EventDirectory: Send + Sync {
    async fn get_event(&self, event_id: Uuid) -> Result<Option<EventSummary>, StoreError>;

    async fn get_ticket_type(&self, ticket_type_id: Uuid)
        -> Result<Option<TicketType>, StoreError>;
}

pub struct PgEventDirectory {
    pool: PgPool,
}

impl PgEventDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventDirectory for PgEventDirectory {
    async fn get_event(&self, event_id: Uuid) -> Result<Option<EventSummary>, StoreError> {
        let event = sqlx::query_as::<_, EventSummary>(
            "SELECT id, organizer_id, title, starts_at, location, price, capacity \
             FROM events WHERE id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(event)
    }

    async fn get_ticket_type(
        &self,
        ticket_type_id: Uuid,
    ) -> Result<Option<TicketType>, StoreError> {
        let ticket_type = sqlx::query_as::<_, TicketType>(
            "SELECT id, event_id, name, price FROM ticket_types WHERE id = $1",
        )
        .bind(ticket_type_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(ticket_type)
    }
}

/// Test/reference double over plain maps.
#[derive(Default)]
pub struct InMemoryEventDirectory {
    events: Mutex<HashMap<Uuid, EventSummary>>,
    ticket_types: Mutex<HashMap<Uuid, TicketType>>,
}

impl InMemoryEventDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_event(&self, event: EventSummary) {
        if let Ok(mut events) = self.events.lock() {
            events.insert(event.id, event);
        }
    }

    pub fn insert_ticket_type(&self, ticket_type: TicketType) {
        if let Ok(mut ticket_types) = self.ticket_types.lock() {
            ticket_types.insert(ticket_type.id, ticket_type);
        }
    }

    pub fn remove_event(&self, event_id: Uuid) {
        if let Ok(mut events) = self.events.lock() {
            events.remove(&event_id);
        }
    }

    pub fn remove_ticket_type(&self, ticket_type_id: Uuid) {
        if let Ok(mut ticket_types) = self.ticket_types.lock() {
            ticket_types.remove(&ticket_type_id);
        }
    }
}

#[async_trait]
impl EventDirectory for InMemoryEventDirectory {
    async fn get_event(&self, event_id: Uuid) -> Result<Option<EventSummary>, StoreError> {
        Ok(self
            .events
            .lock()
            .ok()
            .and_then(|events| events.get(&event_id).cloned()))
    }

    async fn get_ticket_type(
        &self,
        ticket_type_id: Uuid,
    ) -> Result<Option<TicketType>, StoreError> {
        Ok(self
            .ticket_types
            .lock()
            .ok()
            .and_then(|tts| tts.get(&ticket_type_id).cloned()))
    }
}
