//! API server configuration.
//!
//! Sources, later ones winning:
//!
//! ```text
//! defaults  ──►  adega.toml (optional)  ──►  ADEGA_* environment variables
//! ```
//!
//! | Key                     | Env                          | Default                 |
//! |-------------------------|------------------------------|-------------------------|
//! | `bind_addr`             | `ADEGA_BIND_ADDR`            | `0.0.0.0:3000`          |
//! | `database_path`         | `ADEGA_DATABASE_PATH`        | `./adega.db`            |
//! | `max_connections`       | `ADEGA_MAX_CONNECTIONS`      | `10`                    |
//! | `jwt_secret`            | `ADEGA_JWT_SECRET`           | dev secret (warned)     |
//! | `jwt_lifetime_secs`     | `ADEGA_JWT_LIFETIME_SECS`    | `43200` (12 h)          |
//! | `utc_offset_minutes`    | `ADEGA_UTC_OFFSET_MINUTES`   | `-180` (UTC−03:00)      |
//! | `upload_dir`            | `ADEGA_UPLOAD_DIR`           | `./uploads`             |
//! | `public_upload_path`    | `ADEGA_PUBLIC_UPLOAD_PATH`   | `/uploads`              |
//! | `cors_origin`           | `ADEGA_CORS_ORIGIN`          | any origin              |

use std::net::SocketAddr;
use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};

use adega_core::calendar::DEFAULT_UTC_OFFSET_MINUTES;
use adega_core::BusinessCalendar;
use adega_db::DbConfig;

/// Base name of the optional configuration file (`adega.toml`).
const CONFIG_FILE: &str = "adega";

pub(crate) const DEV_JWT_SECRET: &str = "adega-dev-secret-change-in-production";

const MIN_JWT_SECRET_LEN: usize = 16;

/// API server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Listen address
    pub bind_addr: String,

    /// SQLite file, or `:memory:`
    pub database_path: String,

    pub max_connections: u32,

    /// HS256 signing key
    pub jwt_secret: String,

    /// Session token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Offset of the shop's wall clock from UTC
    pub utc_offset_minutes: i32,

    /// Where product images are written
    pub upload_dir: PathBuf,

    /// URL prefix the images are served under
    pub public_upload_path: String,

    /// Allowed browser origin; any origin when unset
    pub cors_origin: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            bind_addr: "0.0.0.0:3000".to_string(),
            database_path: "./adega.db".to_string(),
            max_connections: 10,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            jwt_lifetime_secs: 12 * 60 * 60,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            upload_dir: PathBuf::from("./uploads"),
            public_upload_path: "/uploads".to_string(),
            cors_origin: None,
        }
    }
}

impl ApiConfig {
    /// Loads `adega.toml` (if present) and `ADEGA_*` variables over the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(Environment::with_prefix("ADEGA").try_parsing(true)),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: ApiConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        self.calendar()?;

        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::InvalidValue(format!(
                "jwt_secret must be at least {MIN_JWT_SECRET_LEN} characters"
            )));
        }
        if self.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "jwt_lifetime_secs must be positive".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "max_connections must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|_| ConfigError::InvalidValue(format!("bind_addr '{}'", self.bind_addr)))
    }

    pub fn calendar(&self) -> Result<BusinessCalendar, ConfigError> {
        BusinessCalendar::from_offset_minutes(self.utc_offset_minutes)
            .map_err(|e| ConfigError::InvalidValue(format!("utc_offset_minutes: {e}")))
    }

    /// Pool settings for [`adega_db::Database::new`].
    pub fn db_config(&self) -> Result<DbConfig, ConfigError> {
        let base = if self.database_path == ":memory:" {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&self.database_path).max_connections(self.max_connections)
        };
        Ok(base.calendar(self.calendar()?))
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml: &str) -> Result<ApiConfig, ConfigError> {
        ApiConfig::from_builder(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn test_defaults_apply_to_missing_keys() {
        let config = from_toml("bind_addr = \"127.0.0.1:8080\"").unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.utc_offset_minutes, -180);
        assert_eq!(config.jwt_lifetime_secs, 43200);
        assert!(config.uses_dev_secret());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            from_toml("bind_addr = \"not an address\""),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            from_toml("jwt_secret = \"short\""),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            from_toml("utc_offset_minutes = 5000"),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(from_toml("max_connections = \"many\""), Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_calendar_follows_offset() {
        let config = from_toml("utc_offset_minutes = 0").unwrap();
        assert_eq!(config.calendar().unwrap().offset_minutes(), 0);
    }
}
