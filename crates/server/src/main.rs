use wattcompare_server::{config::Config, router, telemetry, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let config = Config::load()?;
    tracing::info!(
        database = %config.database_path.display(),
        ocr_engine = ?config.ocr_engine,
        ocr_timeout_secs = config.ocr_timeout_secs,
        "starting WattCompare"
    );

    let state = AppState::from_config(&config).await?;
    let store = state.store.clone();
    let app = router(state, config.max_upload_bytes);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    store.close().await;
    tracing::info!("database closed");
    Ok(())
}
