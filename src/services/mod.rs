pub mod checkin;
pub mod issuance;
pub mod verification;

pub use checkin::{CheckInOutcome, CheckInService};
pub use issuance::{IssuanceService, IssuedTicket, ReconciledTicket};
pub use verification::{VerificationReport, VerificationService};
