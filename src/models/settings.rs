//! Externally administered scan settings

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

/// Global scan settings, fetched fresh per scoring call so that edits take
/// effect on the next request without an invalidation protocol.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScanSettings {
    pub auto_block_ip_urls: bool,
    pub default_scan_threshold: f64,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            auto_block_ip_urls: true,
            default_scan_threshold: 0.5,
        }
    }
}

impl ScanSettings {
    pub async fn fetch(pool: &PgPool) -> Result<Self, sqlx::Error> {
        let row = sqlx::query_as::<_, ScanSettings>(
            "SELECT auto_block_ip_urls, default_scan_threshold FROM system_settings WHERE id = 1",
        )
        .fetch_optional(pool)
        .await?;

        Ok(row.unwrap_or_default())
    }
}
