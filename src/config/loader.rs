//! Load configuration from environment variables (after `.env`, if the binary loaded one).

use crate::config::types::*;
use crate::config::validate;
use crate::error::ConfigError;
use std::str::FromStr;

const MEDIA_CREDENTIALS: [&str; 3] = ["MEDIA_ACCESS_KEY_ID", "MEDIA_SECRET_ACCESS_KEY", "MEDIA_BUCKET"];

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let server = ServerConfig {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(get("PORT"), "PORT", DEFAULT_PORT)?,
            max_upload_bytes: parse_or(get("MAX_UPLOAD_BYTES"), "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        };

        let database = match get("DATABASE_URL") {
            Some(url) => Some(DatabaseConfig {
                url,
                max_connections: parse_or(
                    get("DATABASE_MAX_CONNECTIONS"),
                    "DATABASE_MAX_CONNECTIONS",
                    DEFAULT_MAX_CONNECTIONS,
                )?,
            }),
            None => None,
        };

        let creds: Vec<Option<String>> = MEDIA_CREDENTIALS.iter().map(|&k| get(k)).collect();
        let media = if creds.iter().all(Option::is_none) {
            None
        } else {
            if let Some(pos) = creds.iter().position(Option::is_none) {
                return Err(ConfigError::PartialMedia(MEDIA_CREDENTIALS[pos]));
            }
            let mut creds = creds.into_iter().flatten();
            Some(MediaConfig {
                access_key_id: creds.next().ok_or(ConfigError::Missing("MEDIA_ACCESS_KEY_ID"))?,
                secret_access_key: creds.next().ok_or(ConfigError::Missing("MEDIA_SECRET_ACCESS_KEY"))?,
                bucket: creds.next().ok_or(ConfigError::Missing("MEDIA_BUCKET"))?,
                region: get("MEDIA_REGION").unwrap_or_else(|| DEFAULT_MEDIA_REGION.to_string()),
                endpoint: get("MEDIA_ENDPOINT"),
                public_base_url: get("MEDIA_PUBLIC_BASE_URL"),
                folder: get("MEDIA_FOLDER").unwrap_or_else(|| DEFAULT_MEDIA_FOLDER.to_string()),
            })
        };

        let config = AppConfig {
            server,
            database,
            media,
        };
        validate(&config)?;
        Ok(config)
    }
}

fn parse_or<T>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => v.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: format!("'{}': {}", v, e),
        }),
        None => Ok(default),
    }
}
