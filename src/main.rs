//! PhishGuard operational scorer
//!
//! Scores URLs passed on the command line through the full pipeline
//! (rules, classifier, calibration, persistence, alerting) and prints one
//! JSON report per URL.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use phishguard::logic::model::OnnxSource;
use phishguard::store::PgStore;
use phishguard::{db, Config, ScanRequest, ScanService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "phishguard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    let urls: Vec<String> = std::env::args().skip(1).collect();
    if urls.is_empty() {
        eprintln!("usage: phishguard <url> [url ...]");
        std::process::exit(2);
    }

    tracing::info!("PhishGuard scorer starting ({})", config.environment);
    tracing::info!(
        "Database: {}",
        config.database_url.split('@').last().unwrap_or("***")
    );

    // Initialize database pool and schema
    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    let store = Arc::new(PgStore::new(pool));
    let model = Arc::new(OnnxSource::new(&config.model_dir));
    let service = ScanService::new(store, model);

    for url in urls {
        let report = service
            .scan(ScanRequest::new(url).with_features(true))
            .await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}
