use anyhow::Context;

use storefront_api::app::{build_app, services::build_services};
use storefront_infra::config::StorefrontConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    storefront_observability::init();

    let config = StorefrontConfig::from_env();
    tracing::info!(
        bind_addr = %config.bind_addr,
        tick_ms = config.lifecycle.tick_interval.as_millis() as u64,
        dwell_ms = config.lifecycle.dwell_threshold.as_millis() as u64,
        "starting storefront"
    );

    let (services, workers) =
        build_services(&config).context("failed to start background workers")?;
    let app = build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await
        .context("server error")?;

    tokio::task::spawn_blocking(move || workers.shutdown())
        .await
        .context("failed to stop background workers")?;
    Ok(())
}
