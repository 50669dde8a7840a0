use std::sync::Arc;

use anyhow::Context;

use invoicer_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    invoicer_observability::init(config.log_format);

    let services = Arc::new(
        invoicer_api::app::services::build_services(&config).context("failed to start services")?,
    );
    let app = invoicer_api::app::build_app(services.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, driver = ?config.notification_driver, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    services.shutdown();
    tracing::info!("shut down");
    Ok(())
}
