use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Read-only projection of an event as the events subsystem stores it.
/// This service never writes events; it only checks existence, pricing
/// and the sale window.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventSummary {
    pub id: Uuid,
    pub organizer_id: Uuid,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub location: String,
    pub price: Option<Decimal>,
    pub capacity: Option<i32>,
}

impl EventSummary {
    /// Registration-style events have no price or a zero price.
    pub fn is_free(&self) -> bool {
        match self.price {
            None => true,
            Some(p) => p.is_zero(),
        }
    }

    /// Sales close the moment the event starts.
    pub fn sales_closed(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event(price: Option<Decimal>, starts_in_minutes: i64) -> EventSummary {
        EventSummary {
            id: Uuid::new_v4(),
            organizer_id: Uuid::new_v4(),
            title: "Easter Sunrise Service".to_string(),
            starts_at: Utc::now() + Duration::minutes(starts_in_minutes),
            location: "Main Sanctuary".to_string(),
            price,
            capacity: Some(300),
        }
    }

    #[test]
    fn zero_and_absent_prices_are_free() {
        assert!(event(None, 60).is_free());
        assert!(event(Some(Decimal::ZERO), 60).is_free());
        assert!(!event(Some(Decimal::new(1500, 2)), 60).is_free());
    }

    #[test]
    fn sales_close_at_event_start() {
        let now = Utc::now();
        assert!(!event(None, 60).sales_closed(now));
        assert!(event(None, -1).sales_closed(now));
    }
}
