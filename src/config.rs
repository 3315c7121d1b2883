use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgConnectOptions;

/// Dev server origin of the browser client.
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub connect: PgConnectOptions,
    pub max_connections: u32,
    /// Upper bound for every store call, pool acquisition included.
    pub timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub host: String,
    pub port: u16,
    /// Browser origin allowed by CORS with credentials; `*` means any
    /// origin without credentials.
    pub cors_origin: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let connect = match get("DATABASE_URL") {
            Some(url) => url
                .parse::<PgConnectOptions>()
                .context("invalid DATABASE_URL")?,
            None => connect_options_from_parts(&get)?,
        };
        let database = DatabaseConfig {
            connect,
            max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 10)?,
            timeout_secs: parse_or(&get, "STORE_TIMEOUT_SECS", 5)?,
        };

        Ok(Self {
            database,
            host: get("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&get, "APP_PORT", 3000)?,
            cors_origin: get("CORS_ORIGIN")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.into()),
        })
    }
}

// DB_USER / DB_PASSWORD / DB_HOST / DB_PORT / DB_NAME, passed through
// verbatim so credentials never need URL escaping.
fn connect_options_from_parts<F>(get: &F) -> anyhow::Result<PgConnectOptions>
where
    F: Fn(&str) -> Option<String>,
{
    let user = get("DB_USER").context("DATABASE_URL or DB_USER must be set")?;
    let name = get("DB_NAME").context("DATABASE_URL or DB_NAME must be set")?;
    let host = get("DB_HOST").unwrap_or_else(|| "localhost".into());
    let port: u16 = parse_or(get, "DB_PORT", 5432)?;

    let mut options = PgConnectOptions::new()
        .username(&user)
        .host(&host)
        .port(port)
        .database(&name);
    if let Some(password) = get("DB_PASSWORD") {
        options = options.password(&password);
    }
    Ok(options)
}

fn parse_or<F, T>(get: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
