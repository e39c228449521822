//! Scoring pipeline orchestration
//!
//! Rule engine -> (feature extraction -> classifier -> calibration) ->
//! persistence -> alert evaluation. The pipeline holds no state beyond the
//! injected collaborators; rules and settings are re-read per call.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::logic::model::ModelSource;
use crate::logic::{alerts, calibrate, domain, features, model, rules};
use crate::models::{AlertEvent, Label, NewScan, ScanSettings};
use crate::store::ScanStore;

/// Invocation contract for a single scoring call.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    pub url: String,
    /// Requested decision threshold; defaults to the administered setting.
    pub threshold: Option<f64>,
    /// Include the feature record in the result and the persisted scan.
    pub include_features: bool,
}

impl ScanRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            threshold: None,
            include_features: false,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_features(mut self, include: bool) -> Self {
        self.include_features = include;
        self
    }
}

/// Computed scoring result, before the store assigns id and timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub url: String,
    pub domain: String,
    pub host: String,
    pub prediction: i32,
    pub label: Label,
    pub risk_score: f64,
    pub threshold_used: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_rule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Scoring result plus persistence/alerting side effects.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    #[serde(flatten)]
    pub outcome: ScanOutcome,
    /// Store-assigned id; `None` when persistence was skipped or failed.
    pub scan_id: Option<Uuid>,
    pub alerts: Vec<AlertEvent>,
}

impl From<&ScanOutcome> for NewScan {
    fn from(outcome: &ScanOutcome) -> Self {
        NewScan {
            url: outcome.url.clone(),
            domain: outcome.domain.clone(),
            host: outcome.host.clone(),
            prediction: outcome.prediction,
            label: outcome.label.as_str().to_string(),
            risk_score: outcome.risk_score,
            threshold_used: outcome.threshold_used,
            features: outcome.features.clone(),
            matched_rule: outcome.matched_rule.clone(),
            reason: outcome.reason.clone(),
        }
    }
}

/// URL risk scoring service.
pub struct ScanService {
    store: Arc<dyn ScanStore>,
    model: Arc<dyn ModelSource>,
}

impl ScanService {
    pub fn new(store: Arc<dyn ScanStore>, model: Arc<dyn ModelSource>) -> Self {
        Self { store, model }
    }

    /// Score a URL end to end.
    ///
    /// Store failures degrade (no rules, defaults, unsaved result) and are
    /// logged; a missing classifier artifact is the only fatal error, and
    /// only when classification is actually reached.
    pub async fn scan(&self, request: ScanRequest) -> Result<ScanReport> {
        let url = request.url.trim().to_string();
        if url.is_empty() {
            return Ok(ScanReport {
                outcome: zero_risk_outcome(url, request.threshold, "empty_url"),
                scan_id: None,
                alerts: Vec::new(),
            });
        }

        let settings = match self.store.settings().await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("settings fetch failed, using defaults: {e}");
                ScanSettings::default()
            }
        };
        let threshold = request
            .threshold
            .unwrap_or(settings.default_scan_threshold)
            .clamp(0.0, 1.0);

        let (registrable, host) = domain::resolve(&url);
        if host.is_empty() {
            return Ok(ScanReport {
                outcome: zero_risk_outcome(url, request.threshold, "invalid_url"),
                scan_id: None,
                alerts: Vec::new(),
            });
        }

        let rule_set = match self.store.enabled_rules().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("rule fetch failed, scoring without overrides: {e}");
                Vec::new()
            }
        };

        let outcome = match rules::apply_overrides(&url, settings.auto_block_ip_urls, &rule_set) {
            Some(verdict) => {
                tracing::info!(
                    url = %url,
                    rule = %verdict.matched_rule,
                    reason = %verdict.reason,
                    "verdict forced by rule layer"
                );
                ScanOutcome {
                    url: url.clone(),
                    domain: registrable,
                    host,
                    prediction: verdict.prediction,
                    label: verdict.label,
                    risk_score: verdict.risk_score,
                    threshold_used: threshold,
                    features: None,
                    matched_rule: Some(verdict.matched_rule),
                    reason: Some(verdict.reason),
                }
            }
            None => {
                let classifier = self.model.classifier()?;
                let record = features::extract(&url);
                let raw = model::score(classifier.as_ref(), &record)?;
                let cal = calibrate::calibrate(raw as f64, &url, threshold);

                tracing::debug!(
                    url = %url,
                    raw = raw,
                    risk = cal.risk_score,
                    threshold = cal.threshold,
                    "classifier verdict"
                );

                ScanOutcome {
                    url: url.clone(),
                    domain: registrable,
                    host,
                    prediction: cal.prediction,
                    label: cal.label,
                    risk_score: cal.risk_score,
                    threshold_used: cal.threshold,
                    features: request.include_features.then(|| record.to_named_map()),
                    matched_rule: None,
                    reason: None,
                }
            }
        };

        // Persistence failure must not invalidate the computed decision
        let scan_id = match self.store.insert_scan(&NewScan::from(&outcome)).await {
            Ok(record) => Some(record.id),
            Err(e) => {
                tracing::warn!("scan persistence failed, returning result anyway: {e}");
                None
            }
        };

        let alert_rules = match self.store.enabled_alert_rules().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("alert rule fetch failed, skipping alert evaluation: {e}");
                Vec::new()
            }
        };

        let mut alerts_out = Vec::new();
        let pending =
            alerts::evaluate(self.store.as_ref(), &alert_rules, &outcome, scan_id, Utc::now())
                .await;
        for event in &pending {
            match self.store.insert_alert(event).await {
                Ok(stored) => {
                    tracing::info!(
                        rule = %stored.rule_name,
                        severity = %stored.severity,
                        "alert emitted: {}",
                        stored.message
                    );
                    alerts_out.push(stored);
                }
                Err(e) => tracing::warn!("alert persistence failed: {e}"),
            }
        }

        Ok(ScanReport {
            outcome,
            scan_id,
            alerts: alerts_out,
        })
    }
}

/// Deterministic legitimate, zero-risk outcome for empty/unparseable input.
fn zero_risk_outcome(url: String, threshold: Option<f64>, reason: &str) -> ScanOutcome {
    ScanOutcome {
        url,
        domain: String::new(),
        host: String::new(),
        prediction: 0,
        label: Label::Legitimate,
        risk_score: 0.0,
        threshold_used: threshold.unwrap_or(ScanSettings::default().default_scan_threshold),
        features: None,
        matched_rule: None,
        reason: Some(reason.to_string()),
    }
}
