use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use prehospital_api::config::Config;
use prehospital_api::state::AppState;
use prehospital_api::{app, bootstrap};
use prehospital_storage::{db, rate_limits};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Structured JSON logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env()?;
    tracing::info!(?config, "starting prehospital-api");

    let now = jiff::Timestamp::now();
    let conn = db::open_database(&config.database_path)?;
    let pruned = rate_limits::prune(&conn, now)?;
    tracing::debug!(pruned, "expired rate-limit counters removed");
    if let Some(admin) = &config.bootstrap_admin {
        bootstrap::ensure_admin(&conn, admin, now)?;
    }

    let state = AppState::new(conn, &config)?;
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app(state)).await?;
    Ok(())
}
