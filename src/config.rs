use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

// ============================================================================
// Configuration
// ============================================================================
//
// Read once at startup from the environment. Everything except the database
// URL has a default. A missing URL or an unparsable value aborts startup.
//
// ============================================================================

pub const ENV_DATABASE_URL: &str = "ORDERS_DATABASE_URL";
pub const ENV_BIND_ADDR: &str = "ORDERS_BIND_ADDR";
pub const ENV_METRICS_PORT: &str = "ORDERS_METRICS_PORT";
pub const ENV_DB_MAX_CONNECTIONS: &str = "ORDERS_DB_MAX_CONNECTIONS";
pub const ENV_DB_ACQUIRE_TIMEOUT_SECS: &str = "ORDERS_DB_ACQUIRE_TIMEOUT_SECS";
pub const ENV_MAX_BODY_BYTES: &str = "ORDERS_MAX_BODY_BYTES";

/// Largest request body accepted by the API (8 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_METRICS_PORT: u16 = 9090;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: u64 = 5;

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub metrics_port: u16,
    pub max_body_bytes: usize,
    pub database: DatabaseConfig,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

// The URL carries credentials
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup(ENV_DATABASE_URL)
            .filter(|url| !url.trim().is_empty())
            .with_context(|| format!("missing env var {ENV_DATABASE_URL}"))?;

        let bind_addr = parse_or(&lookup, ENV_BIND_ADDR, || {
            SocketAddr::from_str(DEFAULT_BIND_ADDR).context("default bind address")
        })?;
        let metrics_port = parse_or(&lookup, ENV_METRICS_PORT, || Ok(DEFAULT_METRICS_PORT))?;
        let max_connections =
            parse_or(&lookup, ENV_DB_MAX_CONNECTIONS, || Ok(DEFAULT_DB_MAX_CONNECTIONS))?;
        let acquire_timeout_secs = parse_or(&lookup, ENV_DB_ACQUIRE_TIMEOUT_SECS, || {
            Ok(DEFAULT_DB_ACQUIRE_TIMEOUT_SECS)
        })?;
        let max_body_bytes =
            parse_or(&lookup, ENV_MAX_BODY_BYTES, || Ok(DEFAULT_MAX_BODY_BYTES))?;

        if max_connections == 0 {
            anyhow::bail!("{ENV_DB_MAX_CONNECTIONS} must be at least 1");
        }
        if max_body_bytes == 0 {
            anyhow::bail!("{ENV_MAX_BODY_BYTES} must be at least 1");
        }

        Ok(Self {
            bind_addr,
            metrics_port,
            max_body_bytes,
            database: DatabaseConfig {
                url,
                max_connections,
                acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            },
        })
    }
}

fn parse_or<T, F, D>(lookup: &F, key: &str, default: D) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
    D: FnOnce() -> Result<T>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid value for {key} ({raw:?}): {e}")),
        None => default(),
    }
}
