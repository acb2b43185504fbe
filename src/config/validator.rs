//! Config validation: values that parse but cannot be served.

use crate::config::AppConfig;
use crate::error::ConfigError;

pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::Invalid {
            key: "PORT",
            reason: "must be greater than 0".into(),
        });
    }
    if config.server.max_upload_bytes == 0 {
        return Err(ConfigError::Invalid {
            key: "MAX_UPLOAD_BYTES",
            reason: "must be greater than 0".into(),
        });
    }
    if let Some(db) = &config.database {
        if db.max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "DATABASE_MAX_CONNECTIONS",
                reason: "must be greater than 0".into(),
            });
        }
        if !db.url.starts_with("postgres://") && !db.url.starts_with("postgresql://") {
            return Err(ConfigError::Invalid {
                key: "DATABASE_URL",
                reason: "expected a postgres:// connection string".into(),
            });
        }
    }
    if let Some(media) = &config.media {
        if let Some(endpoint) = &media.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ConfigError::Invalid {
                    key: "MEDIA_ENDPOINT",
                    reason: "expected an http(s) URL".into(),
                });
            }
        }
    }
    Ok(())
}
