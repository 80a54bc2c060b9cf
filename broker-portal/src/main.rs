use broker_portal::config::PortalSettings;
use broker_portal::services::{metrics::init_metrics, ApiConnectConnector};
use broker_portal::startup::Application;
use broker_portal::AppState;
use dotenvy::dotenv;
use service_core::observability::logging::init_tracing;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let settings = match PortalSettings::load() {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing("broker-portal", "info", None);
            tracing::error!(error = %e, "Fatal configuration error");
            return Err(anyhow::anyhow!("Configuration error: {}", e));
        }
    };

    init_tracing(
        "broker-portal",
        &settings.telemetry.log_level,
        settings.telemetry.otlp_endpoint.as_deref(),
    );

    let metrics = init_metrics()?;

    let connector = Arc::new(ApiConnectConnector::new(settings.vendor.clone()));
    let state = AppState::new(&settings, connector).with_metrics(metrics);

    let app = Application::build(&settings, state)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start broker-portal: {}", e))?;

    app.run_until_stopped().await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
