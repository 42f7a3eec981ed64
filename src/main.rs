use ai_llm_service::telemetry;
use anyhow::Context;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file; a missing file is fine.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e).context("failed to read .env");
        }
    }

    tracing_subscriber::registry()
        .with(telemetry::env_filter_with_level("info", "triage_core", Level::DEBUG))
        .with(telemetry::layer())
        .init();

    api::start().await.context("ticket-triage server failed")?;

    Ok(())
}
