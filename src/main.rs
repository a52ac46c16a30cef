use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use expense_tracker::app::{AppState, Repositories, build_router};
use expense_tracker::clock::SystemClock;
use expense_tracker::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expense_tracker=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        idle_minutes = config.auth.session_idle_window.num_minutes(),
        absolute_hours = config.auth.session_absolute_window.num_hours(),
        "loaded configuration"
    );

    let repositories = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;
            tracing::info!("connected to database");

            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("migrations completed");

            Repositories::postgres(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            Repositories::in_memory()
        }
    };

    let state = AppState::new(
        &config.auth,
        config.cookie,
        repositories,
        Arc::new(SystemClock),
    );
    let app = build_router(state, &config);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "server running");

    axum::serve(listener, app).await?;

    Ok(())
}
