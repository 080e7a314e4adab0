use std::str::FromStr;

use crate::{Error, Result};

const DEFAULT_COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";

/// Process configuration loaded from environment variables at startup.
/// Every variable is optional; a present but unparseable value is an error.
#[derive(Debug, Clone)]
pub struct Config {
    // Market data
    pub coingecko_base_url: String,
    pub history_days: u32,
    pub http_timeout_secs: u64,

    // Engine tuning file (TOML), defaults apply when unset
    pub strategy_config_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            coingecko_base_url: DEFAULT_COINGECKO_BASE_URL.to_string(),
            history_days: 7,
            http_timeout_secs: 10,
            strategy_config_path: None,
        }
    }
}

impl Config {
    /// Load configuration from the environment. Loads `.env` if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Config {
            coingecko_base_url: lookup("COINGECKO_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.coingecko_base_url),
            history_days: parsed(&lookup, "HISTORY_DAYS")?.unwrap_or(defaults.history_days),
            http_timeout_secs: parsed(&lookup, "HTTP_TIMEOUT_SECS")?
                .unwrap_or(defaults.http_timeout_secs),
            strategy_config_path: lookup("STRATEGY_CONFIG_PATH").filter(|p| !p.is_empty()),
        })
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            Error::Config(format!("environment variable '{key}' has invalid value '{raw}'"))
        }),
    }
}
