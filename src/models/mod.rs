pub mod event;
pub mod ticket;

pub use event::EventSummary;
pub use ticket::{CheckInStatus, PaymentMetadata, Ticket, TicketStatus, TicketType};
