use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::SessionsConfig;
use crate::database::session_store::SessionStore;
use crate::sessions::{DateRange, SessionError};

#[derive(Debug, Clone)]
pub struct MaterializerSettings {
    /// Note written on sessions created from a schedule
    pub default_note: String,
    /// Upper bound on range width, `None` for unbounded
    pub max_range_days: Option<i64>,
}

impl Default for MaterializerSettings {
    fn default() -> Self {
        Self {
            default_note: "Auto-generated from schedule".to_string(),
            max_range_days: None,
        }
    }
}

impl From<&SessionsConfig> for MaterializerSettings {
    fn from(config: &SessionsConfig) -> Self {
        Self {
            default_note: config.default_note.clone(),
            max_range_days: config.max_range_days,
        }
    }
}

/// Outcome of one materialization run. A run that matched nothing is still
/// a success; `created` and `backfilled` are both zero then.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializationReport {
    pub tenant_id: Uuid,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub days: i64,
    pub created: u64,
    pub backfilled: u64,
}

/// Expands recurring schedules into dated attendance sessions.
///
/// Each run inserts missing sessions first, then backfills null linkage
/// fields on sessions that already existed. Both passes are idempotent, so a
/// run that fails between them is completed by simply running again.
#[derive(Clone)]
pub struct SessionMaterializer {
    store: Arc<dyn SessionStore>,
    settings: MaterializerSettings,
}

impl SessionMaterializer {
    pub fn new(store: Arc<dyn SessionStore>, settings: MaterializerSettings) -> Self {
        Self { store, settings }
    }

    /// Ensure sessions exist for every schedule due on `date`
    pub async fn ensure_for_date(
        &self,
        tenant_id: Uuid,
        date: NaiveDate,
    ) -> Result<MaterializationReport, SessionError> {
        self.run(tenant_id, DateRange::single(date)).await
    }

    /// Same as calling `ensure_for_date` for every day of `range`, executed
    /// as one set operation per pass
    pub async fn ensure_for_range(
        &self,
        tenant_id: Uuid,
        range: DateRange,
    ) -> Result<MaterializationReport, SessionError> {
        let range = range.check_width(self.settings.max_range_days)?;
        self.run(tenant_id, range).await
    }

    async fn run(&self, tenant_id: Uuid, range: DateRange) -> Result<MaterializationReport, SessionError> {
        debug!(
            "Materializing sessions for tenant {} from {} to {}",
            tenant_id,
            range.from(),
            range.to()
        );

        let created = self
            .store
            .insert_missing(tenant_id, range, &self.settings.default_note)
            .await?;
        let backfilled = self.store.backfill_links(tenant_id, range).await?;

        info!(
            tenant_id = %tenant_id,
            from = %range.from(),
            to = %range.to(),
            created,
            backfilled,
            "Session materialization complete"
        );

        Ok(MaterializationReport {
            tenant_id,
            from: range.from(),
            to: range.to(),
            days: range.len_days(),
            created,
            backfilled,
        })
    }
}
