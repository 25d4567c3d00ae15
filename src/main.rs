mod config;
mod db;
mod error;
mod rate_limit;
mod routes;
mod services;
mod state;

use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::AppConfig::from_env().expect("invalid configuration");
    let port = config.port;

    let pool = db::init_pool(&config.database_url, config.db_max_connections)
        .await
        .expect("database init failed");

    if config.chapa.is_none() {
        tracing::warn!("CHAPA_SECRET_KEY not set, payments disabled");
    }
    if config.resend.is_none() {
        tracing::warn!("Resend not configured, sign-in codes and inquiries disabled");
    }

    let sweep_interval = config.sweep_interval_secs;
    let state = state::AppState::new(pool, config);

    let _sweep = services::membership::spawn_membership_sweep(state.pool.clone(), sweep_interval);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "sweatbox listening");
    axum::serve(listener, app).await.expect("server failed");
}
