//! Aggregate statistics over scan history

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Row};

fn window_start(days: i64) -> DateTime<Utc> {
    let days = days.clamp(1, 365);
    Utc::now() - Duration::days(days)
}

/// Totals and phishing rate over a trailing window of days.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSummary {
    pub window_days: i64,
    pub total_scans: i64,
    pub phishing_scans: i64,
    pub legitimate_scans: i64,
    pub phishing_rate: f64,
    pub avg_risk_phishing: Option<f64>,
    pub avg_risk_legitimate: Option<f64>,
}

impl StatsSummary {
    pub async fn query(pool: &PgPool, days: i64) -> Result<Self, sqlx::Error> {
        let days = days.clamp(1, 365);
        let since = window_start(days);

        let rows = sqlx::query(
            r#"
            SELECT label, COUNT(*) AS count, AVG(risk_score) AS avg_risk
            FROM scans WHERE created_at >= $1
            GROUP BY label
            "#,
        )
        .bind(since)
        .fetch_all(pool)
        .await?;

        let mut summary = Self::empty(days);
        for row in rows {
            let label: String = row.get("label");
            let count: i64 = row.get("count");
            let avg_risk: Option<f64> = row.get("avg_risk");
            summary.fold(&label, count, avg_risk);
        }
        summary.finish();
        Ok(summary)
    }

    pub fn empty(window_days: i64) -> Self {
        Self {
            window_days,
            total_scans: 0,
            phishing_scans: 0,
            legitimate_scans: 0,
            phishing_rate: 0.0,
            avg_risk_phishing: None,
            avg_risk_legitimate: None,
        }
    }

    pub fn fold(&mut self, label: &str, count: i64, avg_risk: Option<f64>) {
        self.total_scans += count;
        match label {
            "phishing" => {
                self.phishing_scans = count;
                self.avg_risk_phishing = avg_risk;
            }
            "legitimate" => {
                self.legitimate_scans = count;
                self.avg_risk_legitimate = avg_risk;
            }
            _ => {}
        }
    }

    pub fn finish(&mut self) {
        self.phishing_rate = if self.total_scans > 0 {
            self.phishing_scans as f64 / self.total_scans as f64
        } else {
            0.0
        };
    }
}

/// Per-domain scan counts within a trailing window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainCount {
    pub domain: String,
    pub count: i64,
    pub avg_risk: f64,
}

impl DomainCount {
    pub async fn top(
        pool: &PgPool,
        days: i64,
        limit: i64,
        label: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let since = window_start(days);
        let limit = limit.clamp(1, 50);

        let rows = sqlx::query(
            r#"
            SELECT domain, COUNT(*) AS count, AVG(risk_score) AS avg_risk
            FROM scans
            WHERE created_at >= $1 AND label = $2 AND domain <> ''
            GROUP BY domain
            ORDER BY count DESC
            LIMIT $3
            "#,
        )
        .bind(since)
        .bind(label)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| DomainCount {
                domain: row.get("domain"),
                count: row.get("count"),
                avg_risk: row.get::<Option<f64>, _>("avg_risk").unwrap_or(0.0),
            })
            .collect())
    }
}

/// Daily phishing/legitimate counts within a trailing window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub day: NaiveDate,
    pub phishing: i64,
    pub legitimate: i64,
    pub total: i64,
}

impl TimelineEntry {
    pub async fn query(pool: &PgPool, days: i64) -> Result<Vec<Self>, sqlx::Error> {
        let since = window_start(days);

        let rows = sqlx::query(
            r#"
            SELECT date_trunc('day', created_at) AS day, label, COUNT(*) AS count
            FROM scans WHERE created_at >= $1
            GROUP BY 1, 2
            ORDER BY 1
            "#,
        )
        .bind(since)
        .fetch_all(pool)
        .await?;

        let mut by_day: std::collections::BTreeMap<NaiveDate, TimelineEntry> =
            std::collections::BTreeMap::new();

        for row in rows {
            let day = row.get::<DateTime<Utc>, _>("day").date_naive();
            let label: String = row.get("label");
            let count: i64 = row.get("count");
            let entry = by_day.entry(day).or_insert(TimelineEntry {
                day,
                phishing: 0,
                legitimate: 0,
                total: 0,
            });
            match label.as_str() {
                "phishing" => entry.phishing += count,
                "legitimate" => entry.legitimate += count,
                _ => {}
            }
            entry.total += count;
        }

        Ok(by_day.into_values().collect())
    }
}
