use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use tracing::info;
use validator::Validate;

const DEFAULT_ENV: &str = "development";
const DEFAULT_LOG_LEVEL: &str = "info";
const CONFIG_DIR: &str = "config";

/// Application configuration, layered from defaults, an optional
/// `config/<env>.toml` file, and `KHATA_`-prefixed environment variables.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL
    #[validate(length(min = 1, message = "database_url must not be empty"))]
    pub database_url: String,

    /// Environment name: development, test, production
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Log filter directive (e.g. "info", "khata_api=debug")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Maximum number of database connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Minimum number of database connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// Run schema migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// Buffer size of the domain event channel
    #[serde(default = "default_event_buffer")]
    pub event_buffer_size: usize,
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_db_min_connections() -> u32 {
    1
}

fn default_event_buffer() -> usize {
    256
}

impl AppConfig {
    /// Minimal constructor used by tests and embedded callers.
    pub fn new(database_url: String, environment: String) -> Self {
        Self {
            database_url,
            environment,
            log_level: default_log_level(),
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            auto_migrate: false,
            event_buffer_size: default_event_buffer(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_test(&self) -> bool {
        self.environment == "test"
    }
}

/// Loads configuration for the current environment.
///
/// Precedence, lowest to highest: built-in defaults, `config/default.toml`,
/// `config/<APP_ENV>.toml`, then `KHATA_*` environment variables.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let env_name = std::env::var("APP_ENV").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let mut builder = Config::builder()
        .set_default("environment", env_name.clone())?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?;

    let default_file = Path::new(CONFIG_DIR).join("default.toml");
    if default_file.exists() {
        builder = builder.add_source(File::from(default_file));
    }

    let env_file = Path::new(CONFIG_DIR).join(format!("{}.toml", env_name));
    if env_file.exists() {
        builder = builder.add_source(File::from(env_file));
    }

    let settings = builder
        .add_source(Environment::with_prefix("KHATA").separator("__"))
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    config
        .validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {}", e)))?;

    info!(environment = %config.environment, "configuration loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_fills_defaults() {
        let cfg = AppConfig::new("sqlite::memory:".into(), "test".into());
        assert_eq!(cfg.db_max_connections, 10);
        assert_eq!(cfg.db_min_connections, 1);
        assert!(!cfg.auto_migrate);
        assert!(cfg.is_test());
        assert!(!cfg.is_production());
    }

    #[test]
    fn empty_database_url_fails_validation() {
        let cfg = AppConfig::new(String::new(), "test".into());
        assert!(cfg.validate().is_err());
    }
}
