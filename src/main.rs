use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use linkbio::app;
use linkbio::config::Config;
use linkbio::models::app_state::AppState;
use linkbio::store::postgres::PgGateway;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().expect("Invalid configuration");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let gateway = Arc::new(PgGateway::new(
        pool,
        config.upload_dir.clone(),
        config.public_base_url.clone(),
    ));

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(gateway, config);
    let router = app::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind listener");
    tracing::info!("Listening on {}", bind_addr);

    axum::serve(listener, router)
        .await
        .expect("Server error");
}
