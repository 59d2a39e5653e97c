// Recurring schedule -> attendance session materialization primitives.
//
// matcher: which schedules apply on a calendar day
// range:   validated inclusive date ranges and date parsing
// error:   domain errors shared by the store and the materializer service

pub mod error;
pub mod matcher;
pub mod range;

pub use error::SessionError;
pub use matcher::{iso_weekday, sessions_due};
pub use range::{parse_date, DateRange};
