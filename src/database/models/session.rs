use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::schedule::RecurringSchedule;

/// One dated occurrence of a class, materialized from a recurring schedule
/// and afterwards edited by attendance taking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AttendanceSession {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub section_id: Uuid,
    pub subject_id: Uuid,
    pub assignment_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    pub session_date: NaiveDate,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Natural key of an attendance session, independent of its generated id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub tenant_id: Uuid,
    pub section_id: Uuid,
    pub subject_id: Uuid,
    pub session_date: NaiveDate,
}

/// The nullable linkage fields a schedule can fill in on a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLinks {
    pub assignment_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
}

impl SessionLinks {
    /// Fill every unset field from `source`, leaving populated fields alone.
    /// Returns true when at least one field changed.
    pub fn coalesce_from(&mut self, source: &SessionLinks) -> bool {
        let before = *self;
        self.assignment_id = self.assignment_id.or(source.assignment_id);
        self.teacher_id = self.teacher_id.or(source.teacher_id);
        self.room_id = self.room_id.or(source.room_id);
        before != *self
    }
}

impl AttendanceSession {
    pub fn key(&self) -> SessionKey {
        SessionKey {
            tenant_id: self.tenant_id,
            section_id: self.section_id,
            subject_id: self.subject_id,
            session_date: self.session_date,
        }
    }

    pub fn links(&self) -> SessionLinks {
        SessionLinks {
            assignment_id: self.assignment_id,
            teacher_id: self.teacher_id,
            room_id: self.room_id,
        }
    }

    pub fn set_links(&mut self, links: SessionLinks) {
        self.assignment_id = links.assignment_id;
        self.teacher_id = links.teacher_id;
        self.room_id = links.room_id;
    }
}

/// Insert payload for a session that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSession {
    pub key: SessionKey,
    pub links: SessionLinks,
    pub note: String,
}

impl NewSession {
    pub fn from_schedule(schedule: &RecurringSchedule, date: NaiveDate, note: &str) -> Self {
        Self {
            key: SessionKey {
                tenant_id: schedule.tenant_id,
                section_id: schedule.section_id,
                subject_id: schedule.subject_id,
                session_date: date,
            },
            links: schedule.links(),
            note: note.to_string(),
        }
    }

    pub fn into_session(self, now: DateTime<Utc>) -> AttendanceSession {
        AttendanceSession {
            id: Uuid::new_v4(),
            tenant_id: self.key.tenant_id,
            section_id: self.key.section_id,
            subject_id: self.key.subject_id,
            assignment_id: self.links.assignment_id,
            teacher_id: self.links.teacher_id,
            room_id: self.links.room_id,
            session_date: self.key.session_date,
            note: Some(self.note),
            created_at: now,
            updated_at: now,
        }
    }
}
