//! Runs the materializer against PostgreSQL through `PgSessionStore`.
//!
//! Needs `DATABASE_URL` (read from `.env` too); every test returns early
//! without it. Each test works in a fresh tenant so runs never collide.

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use campus_api::database::models::{AttendanceSession, RecurringSchedule, SessionLinks};
use campus_api::database::{DatabaseManager, MemorySessionStore, PgSessionStore};
use campus_api::services::{MaterializerSettings, SessionMaterializer};
use campus_api::sessions::{iso_weekday, DateRange};

use common::{date, links, schedule};

async fn test_pool() -> Result<Option<PgPool>> {
    let _ = dotenvy::dotenv();
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.is_empty() => url,
        _ => {
            eprintln!("DATABASE_URL not set, skipping PostgreSQL store tests");
            return Ok(None);
        }
    };

    let pool = PgPoolOptions::new().max_connections(5).connect(&url).await?;
    DatabaseManager::migrate(&pool).await?;
    Ok(Some(pool))
}

fn pg_materializer(pool: &PgPool) -> SessionMaterializer {
    SessionMaterializer::new(Arc::new(PgSessionStore::new(pool.clone())), MaterializerSettings::default())
}

async fn insert_schedule(pool: &PgPool, s: &RecurringSchedule) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO recurring_schedules
            (id, tenant_id, section_id, subject_id, assignment_id, teacher_id, room_id,
             day_of_week, active_from, active_to, is_active, deleted_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(s.id)
    .bind(s.tenant_id)
    .bind(s.section_id)
    .bind(s.subject_id)
    .bind(s.assignment_id)
    .bind(s.teacher_id)
    .bind(s.room_id)
    .bind(s.day_of_week)
    .bind(s.active_from)
    .bind(s.active_to)
    .bind(s.is_active)
    .bind(s.deleted_at)
    .execute(pool)
    .await?;
    Ok(())
}

async fn sessions(pool: &PgPool, tenant_id: Uuid) -> Result<Vec<AttendanceSession>> {
    let rows = sqlx::query_as::<_, AttendanceSession>(
        r#"
        SELECT id, tenant_id, section_id, subject_id, assignment_id, teacher_id, room_id,
               session_date, note, created_at, updated_at
        FROM attendance_sessions
        WHERE tenant_id = $1
        ORDER BY section_id, subject_id, session_date
        "#,
    )
    .bind(tenant_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

async fn set_teacher(pool: &PgPool, session: &AttendanceSession, teacher_id: Option<Uuid>) -> Result<()> {
    sqlx::query("UPDATE attendance_sessions SET teacher_id = $2 WHERE id = $1")
        .bind(session.id)
        .bind(teacher_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// (section, subject, date) -> (links, note), tenant dropped so two tenants compare
fn by_slot(sessions: &[AttendanceSession]) -> BTreeMap<(Uuid, Uuid, NaiveDate), (SessionLinks, Option<String>)> {
    sessions
        .iter()
        .map(|s| ((s.section_id, s.subject_id, s.session_date), (s.links(), s.note.clone())))
        .collect()
}

/// Mon..Fri schedules for one section across 2024, a subject per weekday
fn weekday_schedules(tenant: Uuid, section: Uuid, subjects: &[Uuid]) -> Vec<RecurringSchedule> {
    subjects
        .iter()
        .zip(1..=5)
        .map(|(subject, dow)| {
            RecurringSchedule::weekly(tenant, section, *subject, dow)
                .with_window(Some(date("2024-01-01")), Some(date("2024-12-31")))
                .with_links(links(Some(Uuid::new_v4())))
        })
        .collect()
}

fn year_2024() -> DateRange {
    DateRange::new(date("2024-01-01"), date("2024-12-31")).expect("valid range")
}

#[tokio::test]
async fn pg_range_run_is_idempotent() -> Result<()> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let tenant = Uuid::new_v4();
    let subjects: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
    for s in weekday_schedules(tenant, Uuid::new_v4(), &subjects) {
        insert_schedule(&pool, &s).await?;
    }
    let engine = pg_materializer(&pool);
    let weekdays = year_2024().days().filter(|d| iso_weekday(*d) <= 5).count() as u64;

    let first = engine.ensure_for_range(tenant, year_2024()).await?;
    let after_first = sessions(&pool, tenant).await?;
    let second = engine.ensure_for_range(tenant, year_2024()).await?;
    let after_second = sessions(&pool, tenant).await?;

    assert_eq!(first.created, weekdays);
    assert_eq!(second.created, 0);
    assert_eq!(second.backfilled, 0);
    assert_eq!(after_first, after_second);
    Ok(())
}

#[tokio::test]
async fn pg_range_matches_per_day_runs() -> Result<()> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let (by_range, by_day) = (Uuid::new_v4(), Uuid::new_v4());
    let section = Uuid::new_v4();
    let subjects: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();

    // Same slots and links for both tenants; only the schedule ids differ
    for s in weekday_schedules(by_range, section, &subjects) {
        insert_schedule(&pool, &s).await?;
        let mut twin = s.clone();
        twin.id = Uuid::new_v4();
        twin.tenant_id = by_day;
        insert_schedule(&pool, &twin).await?;
    }

    let engine = pg_materializer(&pool);
    let spring = DateRange::new(date("2024-03-01"), date("2024-05-31"))?;
    engine.ensure_for_range(by_range, spring).await?;
    for day in spring.days() {
        engine.ensure_for_date(by_day, day).await?;
    }

    let range_rows = sessions(&pool, by_range).await?;
    assert!(!range_rows.is_empty());
    assert_eq!(by_slot(&range_rows), by_slot(&sessions(&pool, by_day).await?));
    Ok(())
}

#[tokio::test]
async fn pg_backfill_fills_nulls_and_keeps_manual_values() -> Result<()> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let tenant = Uuid::new_v4();
    let scheduled = links(Some(Uuid::new_v4()));
    // Wednesdays in January 2024: 3rd, 10th, 17th, 24th, 31st
    let wednesday = schedule(tenant, 3, "2024-01-01", "2024-01-31").with_links(scheduled);
    insert_schedule(&pool, &wednesday).await?;
    let engine = pg_materializer(&pool);
    let january = DateRange::new(date("2024-01-01"), date("2024-01-31"))?;

    engine.ensure_for_range(tenant, january).await?;
    let rows = sessions(&pool, tenant).await?;
    assert_eq!(rows.len(), 5);

    // One session loses its teacher, another gets a hand-picked one
    let manual = Uuid::new_v4();
    set_teacher(&pool, &rows[0], None).await?;
    set_teacher(&pool, &rows[1], Some(manual)).await?;

    let report = engine.ensure_for_range(tenant, january).await?;
    assert_eq!(report.created, 0);
    assert_eq!(report.backfilled, 1);

    let rows = sessions(&pool, tenant).await?;
    assert_eq!(rows[0].teacher_id, scheduled.teacher_id);
    assert_eq!(rows[1].teacher_id, Some(manual));
    assert_eq!(rows[1].room_id, scheduled.room_id);

    let again = engine.ensure_for_range(tenant, january).await?;
    assert_eq!(again.backfilled, 0);
    Ok(())
}

#[tokio::test]
async fn pg_and_memory_stores_agree_on_shared_natural_keys() -> Result<()> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let tenant = Uuid::new_v4();
    let (section, subject) = (Uuid::new_v4(), Uuid::new_v4());

    // Two Wednesday periods of the same subject: one session per day, lowest id wins
    let first = RecurringSchedule::weekly(tenant, section, subject, 3).with_links(links(Some(Uuid::new_v4())));
    let second = RecurringSchedule::weekly(tenant, section, subject, 3).with_links(links(Some(Uuid::new_v4())));
    let friday = RecurringSchedule::weekly(tenant, section, Uuid::new_v4(), 5)
        .with_window(Some(date("2024-02-01")), None)
        .with_links(links(None));
    let winner = if first.id < second.id { &first } else { &second };

    let memory = Arc::new(MemorySessionStore::new());
    for s in [&first, &second, &friday] {
        insert_schedule(&pool, s).await?;
        memory.add_schedule(s.clone()).await;
    }

    let q1 = DateRange::new(date("2024-01-01"), date("2024-03-31"))?;
    let pg_report = pg_materializer(&pool).ensure_for_range(tenant, q1).await?;
    let mem_report = common::materializer(memory.clone()).ensure_for_range(tenant, q1).await?;

    assert_eq!(pg_report.created, mem_report.created);
    let pg_rows = sessions(&pool, tenant).await?;
    assert_eq!(by_slot(&pg_rows), by_slot(&memory.sessions(tenant).await));

    let wednesdays: Vec<&AttendanceSession> = pg_rows.iter().filter(|s| s.subject_id == subject).collect();
    assert_eq!(wednesdays.len(), 13);
    assert!(wednesdays.iter().all(|s| s.links() == winner.links()));

    // Backfill draws from the same winner
    set_teacher(&pool, wednesdays[0], None).await?;
    let report = pg_materializer(&pool).ensure_for_range(tenant, q1).await?;
    assert_eq!(report.backfilled, 1);
    let restored = sessions(&pool, tenant).await?;
    let restored = restored.iter().find(|s| s.id == wednesdays[0].id).expect("session still exists");
    assert_eq!(restored.teacher_id, winner.teacher_id);
    Ok(())
}

#[tokio::test]
async fn pg_concurrent_runs_create_each_session_once() -> Result<()> {
    let Some(pool) = test_pool().await? else {
        return Ok(());
    };
    let tenant = Uuid::new_v4();
    let subjects: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
    for s in weekday_schedules(tenant, Uuid::new_v4(), &subjects) {
        insert_schedule(&pool, &s).await?;
    }
    let engine = pg_materializer(&pool);
    let range = DateRange::new(date("2024-01-01"), date("2024-03-31"))?;

    let (a, b) = tokio::join!(
        engine.ensure_for_range(tenant, range),
        engine.ensure_for_range(tenant, range)
    );
    let expected = range.days().filter(|d| iso_weekday(*d) <= 5).count() as u64;

    assert_eq!(a?.created + b?.created, expected);
    assert_eq!(sessions(&pool, tenant).await?.len() as u64, expected);
    Ok(())
}
