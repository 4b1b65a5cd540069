//! Probe configuration.
//!
//! The six `DB_*` settings are read once at start-up into an immutable
//! [`Config`] that every request shares. A missing or empty setting is a
//! configuration fault: the process refuses to start instead of answering
//! requests with a half-built record.

use crate::tls::TlsConfig;
use std::time::Duration;

pub const ENV_CONNECTION: &str = "DB_CONNECTION";
pub const ENV_USER: &str = "DB_USER";
pub const ENV_PASS: &str = "DB_PASS";
pub const ENV_HOST: &str = "DB_HOST";
pub const ENV_PORT: &str = "DB_PORT";
pub const ENV_NAME: &str = "DB_NAME";

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("connect timeout must be greater than zero")]
    ZeroTimeout,
}

/// Connection settings for the probed database.
///
/// `connection` is the raw dialect selector. It is only interpreted when a
/// connection is attempted, so an unknown dialect is reported per request and
/// not at start-up.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub connection: String,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: String,
    pub name: String,
    pub connect_timeout: Duration,
    pub tls: TlsConfig,
}

// The password never reaches logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("connection", &self.connection)
            .field("user", &self.user)
            .field("password", &"********")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("connect_timeout", &self.connect_timeout)
            .field("tls", &self.tls)
            .finish()
    }
}

/// Raw values as they come out of the environment or the command line.
#[derive(Debug, Default, Clone)]
pub struct RawConfig {
    pub connection: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<String>,
    pub name: Option<String>,
}

impl Config {
    /// Build the record, rejecting absent or empty settings
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming the first absent variable, or
    /// [`ConfigError::ZeroTimeout`]
    pub fn new(
        raw: RawConfig,
        connect_timeout: Duration,
        tls: TlsConfig,
    ) -> Result<Self, ConfigError> {
        if connect_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Self {
            user: required(raw.user, ENV_USER)?,
            password: required(raw.password, ENV_PASS)?,
            host: required(raw.host, ENV_HOST)?,
            name: required(raw.name, ENV_NAME)?,
            port: required(raw.port, ENV_PORT)?,
            connection: required(raw.connection, ENV_CONNECTION)?,
            connect_timeout,
            tls,
        })
    }
}

fn required(value: Option<String>, var: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(var))
}
