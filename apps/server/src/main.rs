use tickerfolio_server::{api::app_router, build_state, config::Config, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env may carry RUST_LOG / TF_LOG_FORMAT, and config parsing logs warnings
    dotenvy::dotenv().ok();
    init_tracing();
    let config = Config::from_env()?;
    let state = build_state(&config).await?;

    let router = app_router(state.clone(), &config);
    tracing::info!("Listening on {}", config.listen_addr);
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Last write of the snapshot before exit.
    state.portfolio_service.teardown().await?;
    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
