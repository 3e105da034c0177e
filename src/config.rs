// src/config.rs

use std::env;
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum ConfigError {
    /// One or more required environment variables are absent.
    Missing(Vec<String>),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(vars) => {
                write!(f, "Missing required environment variables: {}", vars.join(", "))
            }
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {msg}"),
        }
    }
}

impl Error for ConfigError {}

/// Built once at startup and passed by reference into the pipeline.
/// Core logic never reads the environment directly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub alertzy_account_key: String,
    pub spreadsheet_id: String,
    pub sheets_token: String,

    pub threshold_percent: f64,
    pub sync_attempts: u32,
    pub sync_retry_secs: u64,
    pub max_pages: u32,

    pub db_path: String,
    pub items_path: String,
    pub exports_dir: String,

    pub item_pause_min_secs: u64,
    pub item_pause_max_secs: u64,
}

impl AppConfig {
    /// Fatal on missing required settings: the pipeline must not run
    /// partially configured.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut missing = Vec::new();
        let mut require = |name: &str| match env::var(name) {
            Ok(v) if !v.trim().is_empty() => v,
            _ => {
                missing.push(name.to_string());
                String::new()
            }
        };

        let alertzy_account_key = require("ALERTZY_ACCOUNT_KEY");
        let spreadsheet_id = require("SPREADSHEET_ID");
        let sheets_token = require("GOOGLE_SHEETS_TOKEN");

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let config = Self {
            alertzy_account_key,
            spreadsheet_id,
            sheets_token,
            threshold_percent: parse_or("PERCENTAGE_THRESHOLD", 10.0)?,
            sync_attempts: parse_or("SYNC_ATTEMPTS", 3)?,
            sync_retry_secs: parse_or("SYNC_RETRY_SECS", 2)?,
            max_pages: parse_or("MAX_PAGES", 3)?,
            db_path: env::var("DB_PATH").unwrap_or_else(|_| "price_watch.sqlite3".to_string()),
            items_path: env::var("ITEMS_PATH").unwrap_or_else(|_| "items.json".to_string()),
            exports_dir: env::var("EXPORTS_DIR").unwrap_or_else(|_| "exports".to_string()),
            item_pause_min_secs: parse_or("ITEM_PAUSE_MIN_SECS", 2)?,
            item_pause_max_secs: parse_or("ITEM_PAUSE_MAX_SECS", 5)?,
        };

        if config.item_pause_min_secs > config.item_pause_max_secs {
            return Err(ConfigError::Invalid(
                "ITEM_PAUSE_MIN_SECS must not exceed ITEM_PAUSE_MAX_SECS".to_string(),
            ));
        }

        Ok(config)
    }
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("{name}={raw} is not a valid value"))),
        Err(_) => Ok(default),
    }
}
