use std::env;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub google: GoogleConfig,
    pub mail: MailConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origin allowed by CORS (the scheduling frontend).
    pub frontend_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    /// Path to the service-account JSON key file. If the file is missing
    /// the calendar integration is disabled and sync becomes a no-op.
    pub service_account_file: String,
    /// Calendar used when a venue has no calendar of its own.
    pub default_calendar_id: String,
    /// IANA timezone name stamped on pushed event bodies.
    pub timezone: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// HTTP mail-provider endpoint (Mailgun-style messages URL).
    /// `None` disables outbound email entirely.
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from_address: String,
    /// Stakeholders notified on booking confirmations and contact messages.
    pub notify_addresses: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Seconds between background pull runs. 0 disables the worker;
    /// the manual trigger endpoint keeps working either way.
    pub interval_seconds: u64,
    /// Upper bound on events listed per venue calendar per pull.
    pub max_results: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,
                frontend_url: env::var("FRONTEND_URL")
                    .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "sqlite://data/gig_planner.db".to_string()),
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .map_err(|_| {
                        ConfigError::InvalidValue("DATABASE_MAX_CONNECTIONS".to_string())
                    })?,
            },
            google: GoogleConfig {
                service_account_file: env::var("GOOGLE_SERVICE_ACCOUNT_FILE")
                    .unwrap_or_else(|_| "service_account.json".to_string()),
                default_calendar_id: env::var("GOOGLE_DEFAULT_CALENDAR_ID")
                    .unwrap_or_else(|_| "primary".to_string()),
                timezone: env::var("GOOGLE_TIMEZONE")
                    .unwrap_or_else(|_| "Africa/Johannesburg".to_string()),
            },
            mail: MailConfig {
                api_url: env::var("MAIL_API_URL").ok().filter(|v| !v.is_empty()),
                api_key: env::var("MAIL_API_KEY").ok().filter(|v| !v.is_empty()),
                from_address: env::var("MAIL_FROM_ADDRESS")
                    .unwrap_or_else(|_| "bookings@localhost".to_string()),
                notify_addresses: env::var("MAIL_NOTIFY_ADDRESSES")
                    .map(|v| {
                        v.split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
            sync: SyncConfig {
                interval_seconds: env::var("SYNC_INTERVAL_SECONDS")
                    .unwrap_or_else(|_| "0".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("SYNC_INTERVAL_SECONDS".to_string()))?,
                max_results: env::var("SYNC_MAX_RESULTS")
                    .unwrap_or_else(|_| "50".to_string())
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue("SYNC_MAX_RESULTS".to_string()))?,
            },
        })
    }
}

#[cfg(test)]
impl Config {
    /// Fully-local configuration: no credentials, no worker, loopback server.
    pub fn for_tests() -> Self {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                frontend_url: "http://localhost:3000".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            google: GoogleConfig {
                service_account_file: "/nonexistent".to_string(),
                default_calendar_id: "primary".to_string(),
                timezone: "Africa/Johannesburg".to_string(),
            },
            mail: MailConfig {
                api_url: None,
                api_key: None,
                from_address: "bookings@localhost".to_string(),
                notify_addresses: Vec::new(),
            },
            sync: SyncConfig {
                interval_seconds: 0,
                max_results: 50,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_env_unset() {
        let config = Config::from_env().expect("config should build from defaults");
        assert_eq!(config.sync.max_results, 50);
        assert!(!config.google.default_calendar_id.is_empty());
    }
}
