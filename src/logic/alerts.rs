//! Windowed alert evaluation
//!
//! Stateless across calls: every invocation recomputes from stored history
//! over a trailing one-hour window ending at evaluation time. Rules are
//! independent; a single scan may satisfy zero, one, or several of them.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::logic::pipeline::ScanOutcome;
use crate::models::{
    AlertRule, NewAlertEvent, ScanWindow, CONDITION_DOMAIN_FREQUENCY, CONDITION_PHISHING_RATE,
    CONDITION_RISK_SCORE,
};
use crate::store::ScanStore;

/// Evaluate the enabled alert rules against a freshly scored (and, when
/// persistence succeeded, freshly stored) result.
pub async fn evaluate(
    store: &dyn ScanStore,
    rules: &[AlertRule],
    scan: &ScanOutcome,
    scan_id: Option<Uuid>,
    now: DateTime<Utc>,
) -> Vec<NewAlertEvent> {
    let window_start = now - Duration::hours(1);
    let mut events = Vec::new();

    for rule in rules.iter().filter(|r| r.enabled) {
        let message = match rule.condition_type.as_str() {
            CONDITION_RISK_SCORE => check_risk_score(rule, scan),
            CONDITION_DOMAIN_FREQUENCY => {
                check_domain_frequency(store, rule, scan, window_start).await
            }
            CONDITION_PHISHING_RATE => check_phishing_rate(store, rule, window_start).await,
            other => {
                tracing::debug!("skipping alert rule '{}' with unknown condition '{other}'", rule.name);
                None
            }
        };

        if let Some(message) = message {
            events.push(NewAlertEvent {
                rule_id: rule.id,
                rule_name: rule.name.clone(),
                severity: rule.severity.clone(),
                message,
                related_scan_id: scan_id,
            });
        }
    }

    events
}

/// Compares the single new result, not an aggregate.
fn check_risk_score(rule: &AlertRule, scan: &ScanOutcome) -> Option<String> {
    (scan.risk_score > rule.threshold)
        .then(|| format!("Risk score {} exceeded {}", scan.risk_score, rule.threshold))
}

async fn check_domain_frequency(
    store: &dyn ScanStore,
    rule: &AlertRule,
    scan: &ScanOutcome,
    window_start: DateTime<Utc>,
) -> Option<String> {
    if scan.domain.is_empty() {
        return None;
    }

    let window = ScanWindow {
        domain: Some(scan.domain.clone()),
        label: None,
        since: Some(window_start),
    };
    match store.count_scans(window).await {
        Ok(count) if count as f64 > rule.threshold => Some(format!(
            "Domain {} scanned {} times in the last hour",
            scan.domain, count
        )),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!("domain frequency history query failed: {e}");
            None
        }
    }
}

async fn check_phishing_rate(
    store: &dyn ScanStore,
    rule: &AlertRule,
    window_start: DateTime<Utc>,
) -> Option<String> {
    let total_window = ScanWindow {
        domain: None,
        label: None,
        since: Some(window_start),
    };
    let total = match store.count_scans(total_window).await {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!("phishing rate history query failed: {e}");
            return None;
        }
    };
    // An empty window has rate 0 and can never trigger
    if total == 0 {
        return None;
    }

    let phishing_window = ScanWindow {
        domain: None,
        label: Some("phishing".to_string()),
        since: Some(window_start),
    };
    let phishing = match store.count_scans(phishing_window).await {
        Ok(n) => n,
        Err(e) => {
            tracing::warn!("phishing rate history query failed: {e}");
            return None;
        }
    };

    let rate = phishing as f64 / total as f64 * 100.0;
    (rate > rule.threshold).then(|| {
        format!(
            "Phishing rate {rate:.2}% exceeded {}% in the last hour",
            rule.threshold
        )
    })
}
