use std::env;
use std::time::Duration;

use crate::error::{EtlError, Result};

pub const MONGO_DB_URL: &str = "MONGO_DB_URL";
pub const MONGO_CONNECT_TIMEOUT_MS: &str = "MONGO_CONNECT_TIMEOUT_MS";
pub const MONGO_SERVER_SELECTION_TIMEOUT_MS: &str = "MONGO_SERVER_SELECTION_TIMEOUT_MS";
pub const MONGO_APP_NAME: &str = "MONGO_APP_NAME";

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_APP_NAME: &str = "csv-mongo-loader";

/// Connection settings shared by the loader and the connectivity check.
#[derive(Clone)]
pub struct Settings {
    pub mongo_url: String,
    pub connect_timeout: Duration,
    pub server_selection_timeout: Duration,
    pub app_name: String,
}

impl Settings {
    /// Reads the settings from the process environment. Call `dotenvy::dotenv`
    /// beforehand if a `.env` file should be honored.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mongo_url = lookup(MONGO_DB_URL)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                EtlError::Config(format!(
                    "{MONGO_DB_URL} is not set. Please check your .env file."
                ))
            })?;

        if !mongo_url.starts_with("mongodb://") && !mongo_url.starts_with("mongodb+srv://") {
            return Err(EtlError::Config(format!(
                "{MONGO_DB_URL} must start with 'mongodb://' or 'mongodb+srv://'"
            )));
        }

        let connect_timeout =
            timeout_from(&lookup, MONGO_CONNECT_TIMEOUT_MS)?.unwrap_or(DEFAULT_CONNECT_TIMEOUT);
        let server_selection_timeout = timeout_from(&lookup, MONGO_SERVER_SELECTION_TIMEOUT_MS)?
            .unwrap_or(DEFAULT_SERVER_SELECTION_TIMEOUT);
        let app_name = lookup(MONGO_APP_NAME)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_APP_NAME.to_string());

        Ok(Settings {
            mongo_url,
            connect_timeout,
            server_selection_timeout,
            app_name,
        })
    }
}

fn timeout_from<F>(lookup: &F, key: &str) -> Result<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|ms| Some(Duration::from_millis(ms)))
            .map_err(|e| EtlError::Config(format!("{key} must be a number of milliseconds: {e}"))),
    }
}

// The connection string carries credentials, keep it out of logs.
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("mongo_url", &"<redacted>")
            .field("connect_timeout", &self.connect_timeout)
            .field("server_selection_timeout", &self.server_selection_timeout)
            .field("app_name", &self.app_name)
            .finish()
    }
}
