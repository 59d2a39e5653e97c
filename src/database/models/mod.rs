pub mod schedule;
pub mod session;

pub use schedule::RecurringSchedule;
pub use session::{AttendanceSession, NewSession, SessionKey, SessionLinks};
