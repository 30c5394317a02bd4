use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crossrank_rerank::build_scorer;
use crossrank_server::{serve, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".to_string().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    config.log_summary();

    let scorer_config = config.scorer_config();
    let scorer = tokio::task::spawn_blocking(move || build_scorer(scorer_config))
        .await
        .context("model loader task failed")?
        .context("failed to load reranker model")?;
    tracing::info!(scorer = scorer.name(), "model loaded");

    serve(&config, scorer).await
}
