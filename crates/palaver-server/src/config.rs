use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub sweep_interval: Duration,
    pub inactivity_threshold: Duration,
    pub store_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Missing keys take defaults;
    /// present but unparsable values are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("PALAVER_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_or(&lookup, "PALAVER_PORT", 5000)?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", host, port))?;

        let db_path: PathBuf = lookup("PALAVER_DB_PATH")
            .unwrap_or_else(|| "palaver.db".into())
            .into();

        let sweep_interval =
            Duration::from_secs(parse_or(&lookup, "PALAVER_SWEEP_INTERVAL_SECS", 3)?);
        let inactivity_threshold =
            Duration::from_secs(parse_or(&lookup, "PALAVER_INACTIVITY_SECS", 30)?);
        let store_timeout =
            Duration::from_millis(parse_or(&lookup, "PALAVER_STORE_TIMEOUT_MS", 5000)?);

        anyhow::ensure!(!sweep_interval.is_zero(), "PALAVER_SWEEP_INTERVAL_SECS must be positive");
        anyhow::ensure!(!store_timeout.is_zero(), "PALAVER_STORE_TIMEOUT_MS must be positive");

        Ok(Self {
            addr,
            db_path,
            sweep_interval,
            inactivity_threshold,
            store_timeout,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has invalid value {:?}", key, raw)),
        None => Ok(default),
    }
}
