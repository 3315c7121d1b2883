use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::auth::{
    repo::{PgUserStore, UserStore},
    services::AuthService,
};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth: AuthService,
}

impl AppState {
    /// Connects the pool and wires the Postgres user store. The pool lives
    /// as long as the last clone of the returned state.
    pub async fn init(config: AppConfig) -> anyhow::Result<(Self, PgPool)> {
        let config = Arc::new(config);

        let db = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .acquire_timeout(config.database.timeout())
            .connect_with(config.database.connect.clone())
            .await
            .context("connect to database")?;

        let store = Arc::new(PgUserStore::new(db.clone(), config.database.timeout()))
            as Arc<dyn UserStore>;

        Ok((Self::from_parts(config, store), db))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn UserStore>) -> Self {
        Self {
            config,
            auth: AuthService::new(store),
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::auth::repo::MemoryUserStore;
        use crate::config::{DatabaseConfig, DEFAULT_CORS_ORIGIN};
        use sqlx::postgres::PgConnectOptions;

        let config = Arc::new(AppConfig {
            database: DatabaseConfig {
                connect: PgConnectOptions::new()
                    .host("localhost")
                    .username("postgres")
                    .database("postgres"),
                max_connections: 1,
                timeout_secs: 5,
            },
            host: "127.0.0.1".into(),
            port: 0,
            cors_origin: DEFAULT_CORS_ORIGIN.into(),
        });

        let store = Arc::new(MemoryUserStore::default()) as Arc<dyn UserStore>;
        Self::from_parts(config, store)
    }
}
