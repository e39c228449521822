//! In-memory store for tests and fixtures

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    AlertEvent, AlertRule, DetectionRule, DomainCount, NewAlertEvent, NewScan, ScanRecord,
    ScanSettings, ScanWindow, StatsSummary, TimelineEntry,
};
use crate::store::ScanStore;

#[derive(Default)]
struct Inner {
    settings: Option<ScanSettings>,
    rules: Vec<DetectionRule>,
    alert_rules: Vec<AlertRule>,
    scans: Vec<ScanRecord>,
    alerts: Vec<AlertEvent>,
}

/// [`ScanStore`] held entirely in memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_settings(&self, settings: ScanSettings) {
        self.inner.lock().settings = Some(settings);
    }

    pub fn push_rule(&self, rule: DetectionRule) {
        self.inner.lock().rules.push(rule);
    }

    pub fn push_alert_rule(&self, rule: AlertRule) {
        self.inner.lock().alert_rules.push(rule);
    }

    /// Insert a scan record verbatim, keeping its id and timestamp. Used to
    /// seed history for window-based assertions.
    pub fn seed_scan(&self, record: ScanRecord) {
        self.inner.lock().scans.push(record);
    }

    pub fn scans(&self) -> Vec<ScanRecord> {
        self.inner.lock().scans.clone()
    }

    pub fn alerts(&self) -> Vec<AlertEvent> {
        self.inner.lock().alerts.clone()
    }
}

#[async_trait]
impl ScanStore for MemoryStore {
    async fn settings(&self) -> Result<ScanSettings, StoreError> {
        Ok(self.inner.lock().settings.clone().unwrap_or_default())
    }

    async fn enabled_rules(&self) -> Result<Vec<DetectionRule>, StoreError> {
        Ok(self
            .inner
            .lock()
            .rules
            .iter()
            .filter(|r| r.enabled)
            .cloned()
            .collect())
    }

    async fn enabled_alert_rules(&self) -> Result<Vec<AlertRule>, StoreError> {
        Ok(self
            .inner
            .lock()
            .alert_rules
            .iter()
            .filter(|r| r.enabled)
            .cloned()
            .collect())
    }

    async fn insert_scan(&self, scan: &NewScan) -> Result<ScanRecord, StoreError> {
        let record = ScanRecord {
            id: Uuid::new_v4(),
            url: scan.url.clone(),
            domain: scan.domain.clone(),
            host: scan.host.clone(),
            prediction: scan.prediction,
            label: scan.label.clone(),
            risk_score: scan.risk_score,
            threshold_used: scan.threshold_used,
            features: scan.features.clone(),
            matched_rule: scan.matched_rule.clone(),
            reason: scan.reason.clone(),
            created_at: Utc::now(),
        };
        self.inner.lock().scans.push(record.clone());
        Ok(record)
    }

    async fn insert_alert(&self, event: &NewAlertEvent) -> Result<AlertEvent, StoreError> {
        let record = AlertEvent {
            id: Uuid::new_v4(),
            rule_id: event.rule_id,
            rule_name: event.rule_name.clone(),
            severity: event.severity.clone(),
            message: event.message.clone(),
            related_scan_id: event.related_scan_id,
            acknowledged: false,
            created_at: Utc::now(),
        };
        self.inner.lock().alerts.push(record.clone());
        Ok(record)
    }

    async fn count_scans(&self, window: ScanWindow) -> Result<i64, StoreError> {
        let inner = self.inner.lock();
        let count = inner
            .scans
            .iter()
            .filter(|s| window.since.map_or(true, |since| s.created_at >= since))
            .filter(|s| window.domain.as_deref().map_or(true, |d| s.domain == d))
            .filter(|s| window.label.as_deref().map_or(true, |l| s.label == l))
            .count();
        Ok(count as i64)
    }

    async fn recent_scans(
        &self,
        limit: i64,
        label: Option<String>,
    ) -> Result<Vec<ScanRecord>, StoreError> {
        let limit = limit.clamp(1, 200) as usize;
        let inner = self.inner.lock();
        let mut rows: Vec<ScanRecord> = inner
            .scans
            .iter()
            .filter(|s| label.as_deref().map_or(true, |l| s.label == l))
            .cloned()
            .map(|mut s| {
                s.features = None;
                s
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn stats_summary(&self, days: i64) -> Result<StatsSummary, StoreError> {
        let days = days.clamp(1, 365);
        let since = Utc::now() - Duration::days(days);
        let inner = self.inner.lock();

        let mut summary = StatsSummary::empty(days);
        for label in ["phishing", "legitimate"] {
            let group: Vec<&ScanRecord> = inner
                .scans
                .iter()
                .filter(|s| s.created_at >= since && s.label == label)
                .collect();
            if group.is_empty() {
                continue;
            }
            let avg = group.iter().map(|s| s.risk_score).sum::<f64>() / group.len() as f64;
            summary.fold(label, group.len() as i64, Some(avg));
        }
        summary.finish();
        Ok(summary)
    }

    async fn top_domains(
        &self,
        days: i64,
        limit: i64,
        label: String,
    ) -> Result<Vec<DomainCount>, StoreError> {
        let days = days.clamp(1, 365);
        let limit = limit.clamp(1, 50) as usize;
        let since = Utc::now() - Duration::days(days);
        let inner = self.inner.lock();

        let mut grouped: HashMap<String, (i64, f64)> = HashMap::new();
        for scan in inner
            .scans
            .iter()
            .filter(|s| s.created_at >= since && s.label == label && !s.domain.is_empty())
        {
            let entry = grouped.entry(scan.domain.clone()).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += scan.risk_score;
        }

        let mut rows: Vec<DomainCount> = grouped
            .into_iter()
            .map(|(domain, (count, risk_sum))| DomainCount {
                domain,
                count,
                avg_risk: risk_sum / count as f64,
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then(a.domain.cmp(&b.domain)));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn timeline(&self, days: i64) -> Result<Vec<TimelineEntry>, StoreError> {
        let days = days.clamp(1, 365);
        let since = Utc::now() - Duration::days(days);
        let inner = self.inner.lock();

        let mut by_day: std::collections::BTreeMap<NaiveDate, TimelineEntry> = Default::default();
        for scan in inner.scans.iter().filter(|s| s.created_at >= since) {
            let day = scan.created_at.date_naive();
            let entry = by_day.entry(day).or_insert(TimelineEntry {
                day,
                phishing: 0,
                legitimate: 0,
                total: 0,
            });
            match scan.label.as_str() {
                "phishing" => entry.phishing += 1,
                "legitimate" => entry.legitimate += 1,
                _ => {}
            }
            entry.total += 1;
        }

        Ok(by_day.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Label;

    fn scan(domain: &str, label: Label, risk: f64, minutes_ago: i64) -> ScanRecord {
        ScanRecord {
            id: Uuid::new_v4(),
            url: format!("http://{domain}/"),
            domain: domain.to_string(),
            host: domain.to_string(),
            prediction: (label == Label::Phishing) as i32,
            label: label.as_str().to_string(),
            risk_score: risk,
            threshold_used: 0.5,
            features: None,
            matched_rule: None,
            reason: None,
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn test_count_window_filters() {
        let store = MemoryStore::new();
        store.seed_scan(scan("evil.test", Label::Phishing, 0.95, 10));
        store.seed_scan(scan("evil.test", Label::Phishing, 0.92, 50));
        store.seed_scan(scan("evil.test", Label::Phishing, 0.91, 90));
        store.seed_scan(scan("good.test", Label::Legitimate, 0.05, 5));

        let window = ScanWindow {
            domain: Some("evil.test".to_string()),
            label: None,
            since: Some(Utc::now() - Duration::hours(1)),
        };
        assert_eq!(store.count_scans(window).await.unwrap(), 2);

        let all = ScanWindow::default();
        assert_eq!(store.count_scans(all).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_recent_scans_filter_and_order() {
        let store = MemoryStore::new();
        store.seed_scan(scan("a.test", Label::Phishing, 0.9, 30));
        store.seed_scan(scan("b.test", Label::Legitimate, 0.1, 10));
        store.seed_scan(scan("c.test", Label::Phishing, 0.8, 20));

        let rows = store.recent_scans(10, None).await.unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].domain, "b.test");

        let phishing = store
            .recent_scans(10, Some("phishing".to_string()))
            .await
            .unwrap();
        assert_eq!(phishing.len(), 2);
    }

    #[tokio::test]
    async fn test_stats_summary() {
        let store = MemoryStore::new();
        store.seed_scan(scan("a.test", Label::Phishing, 0.9, 10));
        store.seed_scan(scan("b.test", Label::Phishing, 0.7, 10));
        store.seed_scan(scan("c.test", Label::Legitimate, 0.1, 10));

        let summary = store.stats_summary(30).await.unwrap();
        assert_eq!(summary.total_scans, 3);
        assert_eq!(summary.phishing_scans, 2);
        assert_eq!(summary.legitimate_scans, 1);
        assert!((summary.phishing_rate - 2.0 / 3.0).abs() < 1e-9);
        assert!((summary.avg_risk_phishing.unwrap() - 0.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_top_domains() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            store.seed_scan(scan("evil.test", Label::Phishing, 0.9, 10));
        }
        store.seed_scan(scan("other.test", Label::Phishing, 0.95, 10));

        let top = store
            .top_domains(30, 10, "phishing".to_string())
            .await
            .unwrap();
        assert_eq!(top[0].domain, "evil.test");
        assert_eq!(top[0].count, 3);
    }

    #[tokio::test]
    async fn test_timeline_buckets() {
        let store = MemoryStore::new();
        store.seed_scan(scan("a.test", Label::Phishing, 0.9, 10));
        store.seed_scan(scan("b.test", Label::Legitimate, 0.1, 20));

        let timeline = store.timeline(7).await.unwrap();
        let total: i64 = timeline.iter().map(|t| t.total).sum();
        assert_eq!(total, 2);
    }
}
