//! Settings for the server, the ideas database and sessions.
//!
//! Built-in defaults are overlaid by a TOML file and then by `VIDJOT_*`
//! environment variables; the result is checked before use.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Directory name under the platform config and data dirs.
const DATA_DIR_NAME: &str = "vidjot";

const DATABASE_FILE_NAME: &str = "ideas.db";

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "VIDJOT_";

/// Everything vidjot can be told from outside.
///
/// Later sources win:
/// 1. built-in defaults
/// 2. the TOML file, `~/.config/vidjot/config.toml` unless `--config` says
///    otherwise
/// 3. `VIDJOT_*` environment variables, with `__` between section and key,
///    e.g. `VIDJOT_SERVER__PORT=8080`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Session configuration.
    pub session: SessionConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/vidjot/ideas.db`
    pub database_path: Option<PathBuf>,
}

/// Session cookie and expiry configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the session cookie.
    pub cookie_name: String,
    /// Minutes without a request before a session is forgotten.
    pub idle_timeout_minutes: u64,
    /// Mark the cookie `Secure` (HTTPS only).
    pub secure_cookie: bool,
    /// Seconds between sweeps of idle sessions.
    pub sweep_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5000,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "vidjot.sid".to_string(),
            idle_timeout_minutes: 120,
            secure_cookie: false,
            sweep_interval_secs: 60,
        }
    }
}

/// Cookie names must be RFC 6265 tokens.
fn cookie_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[!#$%&'*+\-.^_`|~0-9A-Za-z]+$").expect("cookie name pattern is valid")
    })
}

impl Config {
    /// Load from the default file location plus environment.
    ///
    /// # Errors
    ///
    /// See [`Config::load_from`].
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load with `config_path` in place of the default file. A missing file
    /// is not an error; defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Fails if a source cannot be parsed or the merged values are invalid.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        Self::from_figment(Self::figment(config_file))
    }

    /// The provider stack: defaults, then the TOML file, then environment.
    #[must_use]
    pub fn figment(config_file: PathBuf) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extract and validate a configuration from a figment.
    ///
    /// # Errors
    ///
    /// Returns an error if extraction or validation fails.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/vidjot/config.toml`
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// `<local data dir>/vidjot`
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Reject values the server cannot run with.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::InvalidConfig {
                message: "server.port must be greater than 0".to_string(),
            });
        }

        if !cookie_name_pattern().is_match(&self.session.cookie_name) {
            return Err(Error::InvalidConfig {
                message: format!(
                    "session.cookie_name {:?} is not a valid cookie name",
                    self.session.cookie_name
                ),
            });
        }

        if self.session.idle_timeout_minutes == 0 {
            return Err(Error::InvalidConfig {
                message: "session.idle_timeout_minutes must be greater than 0".to_string(),
            });
        }

        if self.session.sweep_interval_secs == 0 {
            return Err(Error::InvalidConfig {
                message: "session.sweep_interval_secs must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Socket address the server binds.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server.host, self.server.port)
    }

    /// Configured database file, or `ideas.db` in the data dir.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the session idle timeout as a Duration.
    #[must_use]
    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session.idle_timeout_minutes.saturating_mul(60))
    }

    /// Get the session sweep interval as a Duration.
    #[must_use]
    pub fn session_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session.sweep_interval_secs)
    }
}
