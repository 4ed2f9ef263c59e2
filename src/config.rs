use std::{env, str::FromStr, time::Duration};

use anyhow::{Context, bail};

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` runs the service on the volatile in-memory store.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub checkout_timeout: Option<Duration>,
    pub concurrency_limit: usize,
    pub body_limit_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            host: "127.0.0.1".to_string(),
            port: 3000,
            db_max_connections: 25,
            db_min_connections: 5,
            checkout_timeout: Some(Duration::from_secs(10)),
            concurrency_limit: 100,
            body_limit_bytes: 1024 * 1024,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL");
        let host = get("APP_HOST").unwrap_or(defaults.host);
        let port = parse_or(&get, "APP_PORT", defaults.port)?;
        let db_max_connections =
            parse_or(&get, "APP_DB_MAX_CONNECTIONS", defaults.db_max_connections)?;
        let db_min_connections =
            parse_or(&get, "APP_DB_MIN_CONNECTIONS", defaults.db_min_connections)?;
        let checkout_timeout = match get("APP_CHECKOUT_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("APP_CHECKOUT_TIMEOUT_SECS is not a number: {raw}"))?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => defaults.checkout_timeout,
        };
        let concurrency_limit =
            parse_or(&get, "APP_CONCURRENCY_LIMIT", defaults.concurrency_limit)?;
        let body_limit_bytes = parse_or(&get, "APP_BODY_LIMIT_BYTES", defaults.body_limit_bytes)?;

        if db_min_connections > db_max_connections {
            bail!(
                "APP_DB_MIN_CONNECTIONS ({db_min_connections}) exceeds APP_DB_MAX_CONNECTIONS ({db_max_connections})"
            );
        }
        if concurrency_limit == 0 {
            bail!("APP_CONCURRENCY_LIMIT must be at least 1");
        }

        Ok(Self {
            database_url,
            host,
            port,
            db_max_connections,
            db_min_connections,
            checkout_timeout,
            concurrency_limit,
            body_limit_bytes,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}
