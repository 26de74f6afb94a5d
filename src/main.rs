use ibos_backend::{app, state::AppState, store::StoreClient as _};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "ibos_backend=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init().await?;

    // An unreachable database is logged, not fatal; data routes answer 500
    // until it comes back.
    match state.store.ping().await {
        Ok(()) => tracing::info!("successfully connected to mongodb"),
        Err(e) => tracing::error!(error = ?e, "failed to reach mongodb; continuing"),
    }

    let config = state.config.clone();
    let app = app::build_app(state);
    app::serve(app, &config).await
}
