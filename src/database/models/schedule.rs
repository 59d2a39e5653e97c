use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::session::SessionLinks;

/// Weekly recurring class slot. Owned by the schedule CRUD surface; the
/// session materializer only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecurringSchedule {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub section_id: Uuid,
    pub subject_id: Uuid,
    pub assignment_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
    pub room_id: Option<Uuid>,
    /// ISO day of week, Monday = 1 .. Sunday = 7
    pub day_of_week: i16,
    pub active_from: Option<NaiveDate>,
    /// Inclusive
    pub active_to: Option<NaiveDate>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl RecurringSchedule {
    /// Active schedule with no assignment/teacher/room and an open window.
    pub fn weekly(tenant_id: Uuid, section_id: Uuid, subject_id: Uuid, day_of_week: i16) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant_id,
            section_id,
            subject_id,
            assignment_id: None,
            teacher_id: None,
            room_id: None,
            day_of_week,
            active_from: None,
            active_to: None,
            is_active: true,
            deleted_at: None,
        }
    }

    pub fn with_window(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.active_from = from;
        self.active_to = to;
        self
    }

    pub fn with_links(mut self, links: SessionLinks) -> Self {
        self.assignment_id = links.assignment_id;
        self.teacher_id = links.teacher_id;
        self.room_id = links.room_id;
        self
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn links(&self) -> SessionLinks {
        SessionLinks {
            assignment_id: self.assignment_id,
            teacher_id: self.teacher_id,
            room_id: self.room_id,
        }
    }
}
