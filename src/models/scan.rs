//! Scan result model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Final verdict attached to every scoring result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Phishing,
    Legitimate,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phishing => "phishing",
            Self::Legitimate => "legitimate",
        }
    }

    pub fn from_prediction(prediction: i32) -> Self {
        if prediction == 1 {
            Self::Phishing
        } else {
            Self::Legitimate
        }
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted scoring result. The store assigns `id` and `created_at`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScanRecord {
    pub id: Uuid,
    pub url: String,
    pub domain: String,
    pub host: String,
    pub prediction: i32,
    pub label: String,
    pub risk_score: f64,
    pub threshold_used: f64,
    pub features: Option<serde_json::Value>,
    pub matched_rule: Option<String>,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A scoring result about to be persisted.
#[derive(Debug, Clone, Serialize)]
pub struct NewScan {
    pub url: String,
    pub domain: String,
    pub host: String,
    pub prediction: i32,
    pub label: String,
    pub risk_score: f64,
    pub threshold_used: f64,
    pub features: Option<serde_json::Value>,
    pub matched_rule: Option<String>,
    pub reason: Option<String>,
}

/// Time-range count filter over persisted scans.
#[derive(Debug, Clone, Default)]
pub struct ScanWindow {
    pub domain: Option<String>,
    pub label: Option<String>,
    pub since: Option<DateTime<Utc>>,
}

impl ScanRecord {
    pub async fn insert(pool: &PgPool, scan: &NewScan) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, ScanRecord>(
            r#"
            INSERT INTO scans (url, domain, host, prediction, label, risk_score, threshold_used, features, matched_rule, reason)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#
        )
        .bind(&scan.url)
        .bind(&scan.domain)
        .bind(&scan.host)
        .bind(scan.prediction)
        .bind(&scan.label)
        .bind(scan.risk_score)
        .bind(scan.threshold_used)
        .bind(&scan.features)
        .bind(&scan.matched_rule)
        .bind(&scan.reason)
        .fetch_one(pool)
        .await
    }

    pub async fn count(pool: &PgPool, window: &ScanWindow) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM scans
            WHERE ($1::timestamptz IS NULL OR created_at >= $1)
              AND ($2::text IS NULL OR domain = $2)
              AND ($3::text IS NULL OR label = $3)
            "#,
        )
        .bind(window.since)
        .bind(&window.domain)
        .bind(&window.label)
        .fetch_one(pool)
        .await
    }

    /// Latest scans, newest first. Feature payloads are excluded from listings.
    pub async fn recent(
        pool: &PgPool,
        limit: i64,
        label: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let limit = limit.clamp(1, 200);

        sqlx::query_as::<_, ScanRecord>(
            r#"
            SELECT id, url, domain, host, prediction, label, risk_score, threshold_used,
                   NULL::jsonb AS features, matched_rule, reason, created_at
            FROM scans
            WHERE ($1::text IS NULL OR label = $1)
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(label)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
