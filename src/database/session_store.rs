use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::sessions::DateRange;

/// Persistence seam for session materialization.
///
/// Both operations are set-oriented over an inclusive date range; a single
/// date is a one-day range. Each is idempotent and safe to run concurrently
/// with itself.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create one session per (due schedule, day) unless a session with the
    /// same natural key already exists. Returns the number of rows created.
    async fn insert_missing(
        &self,
        tenant_id: Uuid,
        range: DateRange,
        note: &str,
    ) -> Result<u64, DatabaseError>;

    /// Fill null assignment/teacher/room on existing sessions from their due
    /// schedule. Populated fields are never overwritten. Returns rows changed.
    async fn backfill_links(&self, tenant_id: Uuid, range: DateRange) -> Result<u64, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

// Schedules due per (section, subject, day) across the range. DISTINCT ON
// keeps the lowest schedule id when two slots share a natural key.
// $1 tenant_id, $2 from, $3 to
const DUE_SCHEDULES_CTE: &str = r#"
    WITH due AS (
        SELECT DISTINCT ON (s.section_id, s.subject_id, d.day)
            s.section_id,
            s.subject_id,
            d.day::date AS session_date,
            s.assignment_id,
            s.teacher_id,
            s.room_id
        FROM recurring_schedules s
        CROSS JOIN generate_series($2::date, $3::date, interval '1 day') AS d(day)
        WHERE s.tenant_id = $1
          AND s.is_active = true
          AND s.deleted_at IS NULL
          AND (s.active_from IS NULL OR s.active_from <= d.day::date)
          AND (s.active_to IS NULL OR s.active_to >= d.day::date)
          AND s.day_of_week = EXTRACT(ISODOW FROM d.day)::smallint
        ORDER BY s.section_id, s.subject_id, d.day, s.id
    )
"#;

/// PostgreSQL-backed store. Natural-key uniqueness is enforced by the
/// `attendance_sessions_natural_key_uq` index, so concurrent runs cannot
/// create duplicates.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn insert_missing(
        &self,
        tenant_id: Uuid,
        range: DateRange,
        note: &str,
    ) -> Result<u64, DatabaseError> {
        let sql = format!(
            r#"{DUE_SCHEDULES_CTE}
            INSERT INTO attendance_sessions
                (id, tenant_id, section_id, subject_id, assignment_id, teacher_id, room_id, session_date, note)
            SELECT gen_random_uuid(), $1, due.section_id, due.subject_id,
                   due.assignment_id, due.teacher_id, due.room_id, due.session_date, $4
            FROM due
            ON CONFLICT (tenant_id, section_id, subject_id, session_date) DO NOTHING
            "#
        );

        debug!("insert_missing tenant={} from={} to={}", tenant_id, range.from(), range.to());

        let result = sqlx::query(&sql)
            .bind(tenant_id)
            .bind(range.from())
            .bind(range.to())
            .bind(note)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn backfill_links(&self, tenant_id: Uuid, range: DateRange) -> Result<u64, DatabaseError> {
        let sql = format!(
            r#"{DUE_SCHEDULES_CTE}
            UPDATE attendance_sessions AS a
            SET assignment_id = COALESCE(a.assignment_id, due.assignment_id),
                teacher_id    = COALESCE(a.teacher_id, due.teacher_id),
                room_id       = COALESCE(a.room_id, due.room_id),
                updated_at    = now()
            FROM due
            WHERE a.tenant_id = $1
              AND a.section_id = due.section_id
              AND a.subject_id = due.subject_id
              AND a.session_date = due.session_date
              AND (
                   (a.assignment_id IS NULL AND due.assignment_id IS NOT NULL)
                OR (a.teacher_id IS NULL AND due.teacher_id IS NOT NULL)
                OR (a.room_id IS NULL AND due.room_id IS NOT NULL)
              )
            "#
        );

        debug!("backfill_links tenant={} from={} to={}", tenant_id, range.from(), range.to());

        let result = sqlx::query(&sql)
            .bind(tenant_id)
            .bind(range.from())
            .bind(range.to())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
