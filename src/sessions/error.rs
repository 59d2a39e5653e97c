use chrono::NaiveDate;
use thiserror::Error;

use crate::database::DatabaseError;

/// Errors raised while materializing attendance sessions
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid {field} '{value}': expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    #[error("Missing required parameter: {0}")]
    MissingDate(&'static str),

    #[error("Invalid range: to ({to}) is before from ({from})")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    #[error("Range covers {days} days, maximum is {max}")]
    RangeTooWide { days: i64, max: i64 },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}
