use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::database::models::RecurringSchedule;

/// ISO-8601 day of week: Monday = 1 .. Sunday = 7.
///
/// Stored `day_of_week` values use this numbering, so never compare them
/// against `num_days_from_sunday` or `num_days_from_monday`.
pub fn iso_weekday(date: NaiveDate) -> i16 {
    date.weekday().number_from_monday() as i16
}

impl RecurringSchedule {
    /// Active and not soft-deleted
    pub fn is_live(&self) -> bool {
        self.is_active && !self.is_deleted()
    }

    /// Inclusive window check. A missing bound is open on that side.
    pub fn window_contains(&self, date: NaiveDate) -> bool {
        let after_start = self.active_from.map_or(true, |from| from <= date);
        let before_end = self.active_to.map_or(true, |to| date <= to);
        after_start && before_end
    }

    /// Whether this schedule produces a session on `date`
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        if !(1..=7).contains(&self.day_of_week) {
            tracing::debug!(
                "Schedule {} has out-of-range day_of_week {}, never matches",
                self.id,
                self.day_of_week
            );
            return false;
        }
        self.is_live() && self.window_contains(date) && self.day_of_week == iso_weekday(date)
    }
}

/// Schedules of `tenant_id` that produce a session on `date`.
///
/// At most one schedule is returned per (section, subject): when several
/// slots share a natural key on the same day, the lowest schedule id wins.
/// The postgres store applies the same rule with `DISTINCT ON ... ORDER BY id`.
pub fn sessions_due<'a>(
    tenant_id: Uuid,
    date: NaiveDate,
    schedules: &'a [RecurringSchedule],
) -> Vec<&'a RecurringSchedule> {
    let mut matched: Vec<&RecurringSchedule> = schedules
        .iter()
        .filter(|s| s.tenant_id == tenant_id && s.applies_on(date))
        .collect();
    matched.sort_by_key(|s| s.id);

    let mut seen = HashSet::new();
    matched.retain(|s| seen.insert((s.section_id, s.subject_id)));
    matched
}
