use anyhow::Context;

use hemolink_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hemolink_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        data_dir = ?config.data_dir,
        policy = ?config.status_policy,
        reward = config.donation_reward,
        "starting hemolink"
    );

    let app = hemolink_api::app::build_app(&config).context("failed to open the data store")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
}
