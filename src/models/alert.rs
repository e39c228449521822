//! Alert rule and alert event models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Condition types understood by the alert evaluator.
pub const CONDITION_RISK_SCORE: &str = "risk_score";
pub const CONDITION_DOMAIN_FREQUENCY: &str = "domain_frequency";
pub const CONDITION_PHISHING_RATE: &str = "phishing_rate";

/// Windowed alert rule, administered externally.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AlertRule {
    pub id: Uuid,
    pub name: String,
    pub condition_type: String,
    pub threshold: f64,
    pub severity: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl AlertRule {
    pub fn new(name: &str, condition_type: &str, threshold: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            condition_type: condition_type.to_string(),
            threshold,
            severity: "medium".to_string(),
            enabled: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_severity(mut self, severity: &str) -> Self {
        self.severity = severity.to_string();
        self
    }

    pub async fn enabled(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, AlertRule>(
            "SELECT * FROM alert_rules WHERE enabled = true ORDER BY created_at, id",
        )
        .fetch_all(pool)
        .await
    }
}

/// An emitted alert. Append-only; acknowledgement is an external workflow.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AlertEvent {
    pub id: Uuid,
    pub rule_id: Uuid,
    pub rule_name: String,
    pub severity: String,
    pub message: String,
    pub related_scan_id: Option<Uuid>,
    pub acknowledged: bool,
    pub created_at: DateTime<Utc>,
}

/// Alert event about to be persisted.
#[derive(Debug, Clone, Serialize)]
pub struct NewAlertEvent {
    pub rule_id: Uuid,
    pub rule_name: String,
    pub severity: String,
    pub message: String,
    pub related_scan_id: Option<Uuid>,
}

impl AlertEvent {
    pub async fn insert(pool: &PgPool, event: &NewAlertEvent) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, AlertEvent>(
            r#"
            INSERT INTO alert_events (rule_id, rule_name, severity, message, related_scan_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(event.rule_id)
        .bind(&event.rule_name)
        .bind(&event.severity)
        .bind(&event.message)
        .bind(event.related_scan_id)
        .fetch_one(pool)
        .await
    }
}
