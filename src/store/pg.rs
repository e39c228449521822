//! PostgreSQL-backed store

use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::StoreError;
use crate::models::{
    AlertEvent, AlertRule, DetectionRule, DomainCount, NewAlertEvent, NewScan, ScanRecord,
    ScanSettings, ScanWindow, StatsSummary, TimelineEntry,
};
use crate::store::ScanStore;

/// [`ScanStore`] over a PostgreSQL pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ScanStore for PgStore {
    async fn settings(&self) -> Result<ScanSettings, StoreError> {
        Ok(ScanSettings::fetch(&self.pool).await?)
    }

    async fn enabled_rules(&self) -> Result<Vec<DetectionRule>, StoreError> {
        Ok(DetectionRule::enabled(&self.pool).await?)
    }

    async fn enabled_alert_rules(&self) -> Result<Vec<AlertRule>, StoreError> {
        Ok(AlertRule::enabled(&self.pool).await?)
    }

    async fn insert_scan(&self, scan: &NewScan) -> Result<ScanRecord, StoreError> {
        Ok(ScanRecord::insert(&self.pool, scan).await?)
    }

    async fn insert_alert(&self, event: &NewAlertEvent) -> Result<AlertEvent, StoreError> {
        Ok(AlertEvent::insert(&self.pool, event).await?)
    }

    async fn count_scans(&self, window: ScanWindow) -> Result<i64, StoreError> {
        Ok(ScanRecord::count(&self.pool, &window).await?)
    }

    async fn recent_scans(
        &self,
        limit: i64,
        label: Option<String>,
    ) -> Result<Vec<ScanRecord>, StoreError> {
        Ok(ScanRecord::recent(&self.pool, limit, label.as_deref()).await?)
    }

    async fn stats_summary(&self, days: i64) -> Result<StatsSummary, StoreError> {
        Ok(StatsSummary::query(&self.pool, days).await?)
    }

    async fn top_domains(
        &self,
        days: i64,
        limit: i64,
        label: String,
    ) -> Result<Vec<DomainCount>, StoreError> {
        Ok(DomainCount::top(&self.pool, days, limit, &label).await?)
    }

    async fn timeline(&self, days: i64) -> Result<Vec<TimelineEntry>, StoreError> {
        Ok(TimelineEntry::query(&self.pool, days).await?)
    }
}
