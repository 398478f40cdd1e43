//! Centralized configuration (environment variables + defaults).

use crate::storage::herbs::postgres::PoolSettings;
use anyhow::{anyhow, Context};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

/// Which backing store the server runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL at the given `DATABASE_URL`.
    Postgres { database_url: String },
    /// In-process table; contents are lost on exit.
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    /// Reported by the healthcheck (`development`, `staging`, `production`, ...).
    pub environment: String,
    pub store: StoreBackend,
    pub pool: PoolSettings,
    pub store_timeout: Duration,
}

impl Config {
    /// Reads the process environment (after loading `.env`, if any).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_addr: SocketAddr = "0.0.0.0:4000".parse()?;
        let bind_addr = parse_or(&lookup, "CATALOG_BIND_ADDR", default_addr)?;
        let environment = lookup("CATALOG_ENV").unwrap_or_else(|| "development".to_string());

        let store = match lookup("CATALOG_STORE").as_deref().unwrap_or("postgres") {
            "postgres" => StoreBackend::Postgres {
                // Database URL must be provided (no default) for safety.
                database_url: lookup("DATABASE_URL")
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| anyhow!("DATABASE_URL must be set"))?,
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(anyhow!(
                    "CATALOG_STORE must be `postgres` or `memory`, got `{}`",
                    other
                ))
            }
        };

        let defaults = PoolSettings::default();
        let max_connections: u32 =
            parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections)?;
        if max_connections == 0 {
            return Err(anyhow!("DB_MAX_CONNECTIONS must be at least 1"));
        }
        let idle_secs: u64 = parse_or(
            &lookup,
            "DB_MAX_IDLE_TIME_SECS",
            defaults.idle_timeout.as_secs(),
        )?;
        let timeout_ms: u64 = parse_or(&lookup, "STORE_TIMEOUT_MS", 3_000)?;
        if timeout_ms == 0 {
            return Err(anyhow!("STORE_TIMEOUT_MS must be at least 1"));
        }
        let store_timeout = Duration::from_millis(timeout_ms);

        Ok(Self {
            bind_addr,
            environment,
            store,
            pool: PoolSettings {
                max_connections,
                idle_timeout: Duration::from_secs(idle_secs),
                acquire_timeout: store_timeout,
            },
            store_timeout,
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_with_database_url() {
        let cfg = config(&[("DATABASE_URL", "postgres://localhost/herbs")]).unwrap();
        assert_eq!(cfg.bind_addr.port(), 4000);
        assert_eq!(cfg.environment, "development");
        assert_eq!(cfg.store_timeout, Duration::from_secs(3));
        assert_eq!(cfg.pool.max_connections, 25);
        assert_eq!(
            cfg.store,
            StoreBackend::Postgres {
                database_url: "postgres://localhost/herbs".to_string()
            }
        );
    }

    #[test]
    fn postgres_requires_database_url() {
        let err = config(&[]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn memory_store_needs_no_url() {
        let cfg = config(&[
            ("CATALOG_STORE", "memory"),
            ("CATALOG_BIND_ADDR", "127.0.0.1:9000"),
            ("STORE_TIMEOUT_MS", "500"),
        ])
        .unwrap();
        assert_eq!(cfg.store, StoreBackend::Memory);
        assert_eq!(cfg.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(cfg.store_timeout, Duration::from_millis(500));
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(config(&[("CATALOG_STORE", "sqlite")]).is_err());
        assert!(config(&[("CATALOG_STORE", "memory"), ("STORE_TIMEOUT_MS", "soon")]).is_err());
        assert!(config(&[("CATALOG_STORE", "memory"), ("STORE_TIMEOUT_MS", "0")]).is_err());
        assert!(config(&[("CATALOG_STORE", "memory"), ("DB_MAX_CONNECTIONS", "0")]).is_err());
    }
}
