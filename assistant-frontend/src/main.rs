use assistant_core::observability::logging::init_tracing;
use assistant_frontend::config::get_configuration;
use assistant_frontend::services::metrics::init_metrics;
use assistant_frontend::startup::Application;
use dotenvy::dotenv;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing("assistant-frontend", "info");

    init_metrics();

    let shutdown = CancellationToken::new();

    let app = Application::build(configuration, shutdown.clone())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to build application: {}", e))?;

    // Abandon outstanding backend work when the process is asked to stop.
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            shutdown.cancel();
        }
    });

    app.run_until_stopped().await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
