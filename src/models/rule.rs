//! Detection rule model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Allow/deny override rule, administered externally and read-only here.
///
/// `pattern` matches as a substring of the lowercased URL, or exactly against
/// the registrable domain or the full host.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DetectionRule {
    pub id: Uuid,
    pub list_type: String,
    pub pattern: String,
    pub enabled: bool,
    pub force_risk_score: Option<f64>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DetectionRule {
    pub fn allow(pattern: &str) -> Self {
        Self::new("allow", pattern)
    }

    pub fn deny(pattern: &str) -> Self {
        Self::new("deny", pattern)
    }

    fn new(list_type: &str, pattern: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            list_type: list_type.to_string(),
            pattern: pattern.trim().to_lowercase(),
            enabled: true,
            force_risk_score: None,
            description: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_force_risk_score(mut self, score: f64) -> Self {
        self.force_risk_score = Some(score);
        self
    }

    /// Enabled rules in creation order. Evaluation order is first-match-wins,
    /// so this ordering is part of the engine's observable behavior.
    pub async fn enabled(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, DetectionRule>(
            "SELECT * FROM detection_rules WHERE enabled = true ORDER BY created_at, id",
        )
        .fetch_all(pool)
        .await
    }
}
