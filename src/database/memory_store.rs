use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{AttendanceSession, NewSession, RecurringSchedule, SessionKey, SessionLinks};
use crate::database::session_store::SessionStore;
use crate::sessions::{sessions_due, DateRange};

#[derive(Default)]
struct MemoryState {
    schedules: Vec<RecurringSchedule>,
    sessions: BTreeMap<SessionKey, AttendanceSession>,
}

/// In-process session store for tests and `SESSIONS_STORE=memory` demo runs.
///
/// Every operation runs under the write lock, which plays the role of the
/// natural-key unique index. Ranges are walked day by day.
#[derive(Default)]
pub struct MemorySessionStore {
    state: RwLock<MemoryState>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_schedule(&self, schedule: RecurringSchedule) {
        self.state.write().await.schedules.push(schedule);
    }

    /// Load a JSON array of schedules. `id` and `is_active` may be omitted.
    pub async fn load_schedules_json(&self, json: &str) -> Result<usize, serde_json::Error> {
        let schedules: Vec<RecurringSchedule> = serde_json::from_str(json)?;
        let count = schedules.len();
        self.state.write().await.schedules.extend(schedules);
        Ok(count)
    }

    /// Seed an existing session. Returns false if its natural key is taken.
    pub async fn put_session(&self, session: AttendanceSession) -> bool {
        let mut state = self.state.write().await;
        let key = session.key();
        if state.sessions.contains_key(&key) {
            return false;
        }
        state.sessions.insert(key, session);
        true
    }

    /// Overwrite linkage fields, as a manual correction would.
    pub async fn set_links(&self, key: &SessionKey, links: SessionLinks) -> bool {
        let mut state = self.state.write().await;
        match state.sessions.get_mut(key) {
            Some(session) => {
                session.set_links(links);
                session.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    pub async fn session(&self, key: &SessionKey) -> Option<AttendanceSession> {
        self.state.read().await.sessions.get(key).cloned()
    }

    /// All sessions of a tenant ordered by natural key
    pub async fn sessions(&self, tenant_id: Uuid) -> Vec<AttendanceSession> {
        self.state
            .read()
            .await
            .sessions
            .values()
            .filter(|s| s.tenant_id == tenant_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert_missing(
        &self,
        tenant_id: Uuid,
        range: DateRange,
        note: &str,
    ) -> Result<u64, DatabaseError> {
        let mut state = self.state.write().await;
        let MemoryState { schedules, sessions } = &mut *state;
        let now = Utc::now();
        let mut created = 0;

        for day in range.days() {
            for schedule in sessions_due(tenant_id, day, schedules.as_slice()) {
                let new = NewSession::from_schedule(schedule, day, note);
                if sessions.contains_key(&new.key) {
                    continue;
                }
                sessions.insert(new.key, new.into_session(now));
                created += 1;
            }
        }

        Ok(created)
    }

    async fn backfill_links(&self, tenant_id: Uuid, range: DateRange) -> Result<u64, DatabaseError> {
        let mut state = self.state.write().await;
        let MemoryState { schedules, sessions } = &mut *state;
        let now = Utc::now();
        let mut changed = 0;

        for day in range.days() {
            for schedule in sessions_due(tenant_id, day, schedules.as_slice()) {
                let key = SessionKey {
                    tenant_id,
                    section_id: schedule.section_id,
                    subject_id: schedule.subject_id,
                    session_date: day,
                };
                let Some(session) = sessions.get_mut(&key) else {
                    continue;
                };
                let mut links = session.links();
                if links.coalesce_from(&schedule.links()) {
                    session.set_links(links);
                    session.updated_at = now;
                    changed += 1;
                }
            }
        }

        Ok(changed)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
