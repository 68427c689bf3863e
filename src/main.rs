use std::path::PathBuf;

use anyhow::{bail, Context};
use sentiment_signal::logging::{init_logging, LoggingConfig};
use sentiment_signal::services::normalizer;
use sentiment_signal::{render_summary, SignalConfig, SignalEngine};

const USAGE: &str = "usage: sentiment-signal <articles.json> [--json]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env()).context("failed to initialize logging")?;

    let mut path: Option<PathBuf> = std::env::var("ARTICLES_FILE").ok().map(PathBuf::from);
    let mut as_json = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => as_json = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                return Ok(());
            }
            other => path = Some(PathBuf::from(other)),
        }
    }
    let Some(path) = path else {
        bail!(USAGE);
    };

    let config = SignalConfig::from_env().context("invalid signal configuration")?;
    let engine = SignalEngine::new(config)?;

    tracing::info!("📰 Analyzing classified articles from {}", path.display());
    let normalized = normalizer::load_path(&path)
        .await
        .with_context(|| format!("failed to load {}", path.display()))?;
    let result = engine
        .analyze_concurrent_at(&normalized, chrono::Utc::now())
        .await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_summary(&result));
    }

    Ok(())
}
