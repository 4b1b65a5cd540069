//! Dialect-specific connection establishment.
//!
//! The configured selector is resolved into a [`Dialect`], the dialect builds
//! its connection string, and a single connection is opened within the
//! configured timeout. [`check`] wraps the whole sequence and releases the
//! connection before returning.

pub mod mysql;
pub mod postgres;

use crate::config::Config;
use sqlx::{Connection, mysql::MySqlConnection, postgres::PgConnection};
use std::{fmt, str::FromStr, time::Duration};
use tokio::time;

/// Supported database families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Postgres,
}

impl Dialect {
    /// Selector literal, also used as the metric label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Postgres => "postgres",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Case-sensitive: "MySQL" is not a supported selector.
impl FromStr for Dialect {
    type Err = ConnectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mysql" => Ok(Self::MySql),
            "postgres" => Ok(Self::Postgres),
            other => Err(ConnectError::DatabaseNotDefined(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("database not defined: {0:?}")]
    DatabaseNotDefined(String),

    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),

    #[error("connection attempt timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl ConnectError {
    /// Coarse failure class used for logs and metrics
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::DatabaseNotDefined(_) => "unsupported",
            Self::InvalidConnectionString(_) => "configuration",
            Self::Timeout(_) => "timeout",
            Self::Database(err) => classify_sqlx_error(err),
        }
    }
}

fn classify_sqlx_error(err: &sqlx::Error) -> &'static str {
    match err {
        sqlx::Error::Io(_) => "connection",
        sqlx::Error::Tls(_) => "tls",
        sqlx::Error::Configuration(_) => "configuration",
        _ => {
            let error_str = err.to_string();
            if error_str.contains("authentication")
                || error_str.contains("password")
                || error_str.contains("Access denied")
            {
                "authentication"
            } else if error_str.contains("timeout") || error_str.contains("timed out") {
                "timeout"
            } else {
                "connection"
            }
        }
    }
}

/// An open, otherwise unused, connection
#[derive(Debug)]
pub enum DbConnection {
    MySql(MySqlConnection),
    Postgres(PgConnection),
}

impl DbConnection {
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        match self {
            Self::MySql(_) => Dialect::MySql,
            Self::Postgres(_) => Dialect::Postgres,
        }
    }

    /// Gracefully terminate the session
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be told the session is ending
    pub async fn close(self) -> Result<(), sqlx::Error> {
        match self {
            Self::MySql(conn) => conn.close().await,
            Self::Postgres(conn) => conn.close().await,
        }
    }
}

/// Open a connection to the configured database
///
/// No network call is made for an unknown selector. The attempt is abandoned,
/// and the half-open socket dropped, once `config.connect_timeout` elapses.
///
/// # Errors
///
/// Returns [`ConnectError`] if the selector is unknown, the connection string
/// is malformed, the driver fails or the attempt times out
pub async fn connect(config: &Config) -> Result<DbConnection, ConnectError> {
    let dialect: Dialect = config.connection.parse()?;

    let attempt = async {
        match dialect {
            Dialect::MySql => mysql::connect(config).await.map(DbConnection::MySql),
            Dialect::Postgres => postgres::connect(config)
                .await
                .map(DbConnection::Postgres),
        }
    };

    time::timeout(config.connect_timeout, attempt)
        .await
        .map_err(|_| ConnectError::Timeout(config.connect_timeout))?
}

/// Connect and immediately release the connection
///
/// A failure to close an established session is logged but does not fail
/// the check: the database did accept the connection.
///
/// # Errors
///
/// Returns [`ConnectError`] when [`connect`] fails
pub async fn check(config: &Config) -> Result<Dialect, ConnectError> {
    let conn = connect(config).await?;
    let dialect = conn.dialect();

    if let Err(err) = conn.close().await {
        tracing::warn!(database = %dialect, error = %err, "failed to close probe connection");
    }

    Ok(dialect)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use crate::{config::RawConfig, tls::TlsConfig};

    fn config(connection: &str, port: &str) -> Config {
        Config::new(
            RawConfig {
                connection: Some(connection.into()),
                user: Some("rant".into()),
                password: Some("secret".into()),
                host: Some("127.0.0.1".into()),
                port: Some(port.into()),
                name: Some("rants".into()),
            },
            Duration::from_secs(2),
            TlsConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("mysql".parse::<Dialect>().unwrap(), Dialect::MySql);
        assert_eq!("postgres".parse::<Dialect>().unwrap(), Dialect::Postgres);
    }

    #[test]
    fn test_dialect_is_case_sensitive() {
        for selector in ["MySQL", "Postgres", "postgresql", "oracle", ""] {
            match selector.parse::<Dialect>() {
                Err(ConnectError::DatabaseNotDefined(s)) => assert_eq!(s, selector),
                other => panic!("unexpected result for {selector:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn test_dialect_display() {
        assert_eq!(Dialect::MySql.to_string(), "mysql");
        assert_eq!(Dialect::Postgres.to_string(), "postgres");
    }

    #[test]
    fn test_error_type() {
        assert_eq!(
            ConnectError::DatabaseNotDefined("oracle".into()).error_type(),
            "unsupported"
        );
        assert_eq!(
            ConnectError::InvalidConnectionString("bad port".into()).error_type(),
            "configuration"
        );
        assert_eq!(
            ConnectError::Timeout(Duration::from_secs(1)).error_type(),
            "timeout"
        );

        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert_eq!(
            ConnectError::Database(sqlx::Error::Io(io)).error_type(),
            "connection"
        );
        assert_eq!(
            ConnectError::Database(sqlx::Error::Protocol(
                "Access denied for user 'rant'".into()
            ))
            .error_type(),
            "authentication"
        );
    }

    #[test]
    fn test_database_not_defined_message() {
        let err = ConnectError::DatabaseNotDefined("oracle".into());
        assert_eq!(err.to_string(), r#"database not defined: "oracle""#);
    }

    #[tokio::test]
    async fn test_connect_unknown_dialect() {
        let err = connect(&config("oracle", "1521")).await.unwrap_err();
        assert!(matches!(err, ConnectError::DatabaseNotDefined(_)));
    }

    #[tokio::test]
    async fn test_connect_invalid_port() {
        let err = connect(&config("mysql", "not-a-port")).await.unwrap_err();
        assert!(matches!(err, ConnectError::InvalidConnectionString(_)));

        let err = connect(&config("postgres", "not-a-port")).await.unwrap_err();
        assert!(matches!(err, ConnectError::InvalidConnectionString(_)));
    }

    #[tokio::test]
    async fn test_check_unreachable_mysql() {
        // Nothing listens on port 1
        let err = check(&config("mysql", "1")).await.unwrap_err();
        assert!(matches!(
            err,
            ConnectError::Database(_) | ConnectError::Timeout(_)
        ));
    }

    #[tokio::test]
    async fn test_check_unreachable_postgres() {
        let err = check(&config("postgres", "1")).await.unwrap_err();
        assert!(matches!(
            err,
            ConnectError::Database(_) | ConnectError::Timeout(_)
        ));
    }
}
