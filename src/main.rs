use anyhow::Context;

mod app;
mod auth;
mod config;
mod state;

use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "userauth=debug,axum=info,tower_http=info".to_string());
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

    let config = AppConfig::from_env()?;
    let (app_state, db) = AppState::init(config).await?;
    tracing::info!("connected to database");

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .context("create users table")?;
    tracing::info!("users table ready");

    let config = app_state.config.clone();
    let app = app::build_app(app_state)?;
    app::serve(app, &config).await?;

    db.close().await;
    Ok(())
}
