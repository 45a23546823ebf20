mod config;
mod control;
mod event;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    // A missing .env file is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::RelayConfig::from_env().expect("invalid relay configuration");

    let control = control::from_config(&config);
    let state = state::AppState::new(&config, control);

    let app = routes::app(state, &config.static_dir);
    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    tracing::info!(
        %addr,
        static_dir = %config.static_dir.display(),
        activity = %config.default_activity,
        "game-relay listening"
    );
    axum::serve(listener, app).await.expect("server failed");
}
