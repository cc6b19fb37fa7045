use relay_service::config::RelayConfig;
use relay_service::services::init_metrics;
use relay_service::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration comes first: it decides the log level, and a missing API
    // key must stop the process before anything binds.
    let config =
        RelayConfig::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_tracing(
        "relay-service",
        &config.common.log_level,
        config.common.otlp_endpoint.as_deref(),
    )?;

    init_metrics()?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        anyhow::anyhow!("Startup error: {}", e)
    })?;

    tracing::info!("Server is running on http://localhost:{}", app.port());

    app.run_until_stopped().await?;

    Ok(())
}
