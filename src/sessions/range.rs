use chrono::NaiveDate;
use serde::Serialize;

use super::error::SessionError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` calendar date. `field` names the parameter in errors.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, SessionError> {
    let trimmed = value.trim();
    // Reject anything that is not exactly ten characters so "2024-1-5" or
    // trailing garbage do not slip through chrono's lenient numeric parsing.
    if trimmed.len() != 10 {
        return Err(SessionError::InvalidDate { field, value: value.to_string() });
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| SessionError::InvalidDate { field, value: value.to_string() })
}

/// Inclusive calendar date range with `from <= to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, SessionError> {
        if to < from {
            return Err(SessionError::InvalidRange { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn single(date: NaiveDate) -> Self {
        Self { from: date, to: date }
    }

    /// Parse both bounds, reporting a missing or malformed one by name
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, SessionError> {
        let from = from.ok_or(SessionError::MissingDate("from"))?;
        let to = to.ok_or(SessionError::MissingDate("to"))?;
        Self::new(parse_date("from", from)?, parse_date("to", to)?)
    }

    pub fn from(&self) -> NaiveDate {
        self.from
    }

    pub fn to(&self) -> NaiveDate {
        self.to
    }

    pub fn len_days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    /// Every calendar day in the range, ascending
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let to = self.to;
        self.from.iter_days().take_while(move |d| *d <= to)
    }

    pub fn check_width(self, max_days: Option<i64>) -> Result<Self, SessionError> {
        match max_days {
            Some(max) if self.len_days() > max => Err(SessionError::RangeTooWide {
                days: self.len_days(),
                max,
            }),
            _ => Ok(self),
        }
    }
}
