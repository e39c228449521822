//! Store collaborator seam
//!
//! The pipeline owns no persistent state; rules, alert rules, settings and
//! scan history live behind [`ScanStore`]. Everything is re-read per call, so
//! administrative edits take effect on the next request.

mod memory;
mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{
    AlertEvent, AlertRule, DetectionRule, DomainCount, NewAlertEvent, NewScan, ScanRecord,
    ScanSettings, ScanWindow, StatsSummary, TimelineEntry,
};

/// External record store consumed by the scoring pipeline.
///
/// All reads are independent and idempotent; the only writes are the single
/// scan insert and alert inserts per scoring call.
#[async_trait]
pub trait ScanStore: Send + Sync {
    async fn settings(&self) -> Result<ScanSettings, StoreError>;

    async fn enabled_rules(&self) -> Result<Vec<DetectionRule>, StoreError>;

    async fn enabled_alert_rules(&self) -> Result<Vec<AlertRule>, StoreError>;

    async fn insert_scan(&self, scan: &NewScan) -> Result<ScanRecord, StoreError>;

    async fn insert_alert(&self, event: &NewAlertEvent) -> Result<AlertEvent, StoreError>;

    async fn count_scans(&self, window: ScanWindow) -> Result<i64, StoreError>;

    async fn recent_scans(
        &self,
        limit: i64,
        label: Option<String>,
    ) -> Result<Vec<ScanRecord>, StoreError>;

    async fn stats_summary(&self, days: i64) -> Result<StatsSummary, StoreError>;

    async fn top_domains(
        &self,
        days: i64,
        limit: i64,
        label: String,
    ) -> Result<Vec<DomainCount>, StoreError>;

    async fn timeline(&self, days: i64) -> Result<Vec<TimelineEntry>, StoreError>;
}
