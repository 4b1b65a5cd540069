use sqlx::{
    ConnectOptions,
    postgres::{PgConnectOptions, PgConnection, PgSslMode},
};

use super::ConnectError;
use crate::config::Config;
use crate::tls::{TlsConfig, TlsMode};

pub const DEFAULT_PORT: u16 = 5432;

/// Fields of a libpq-style `key=value` connection string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgParams {
    pub host: String,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub port: u16,
}

/// `host=<host> user=<user> password=<password> dbname=<dbname> port=<port>`
#[must_use]
pub fn connection_string(config: &Config) -> String {
    format!(
        "host={} user={} password={} dbname={} port={}",
        config.host, config.user, config.password, config.name, config.port
    )
}

/// Parse a whitespace separated `key=value` connection string
///
/// Error messages never echo values, the password is one of them.
///
/// # Errors
///
/// Returns [`ConnectError::InvalidConnectionString`] on unknown keys, pairs
/// without `=`, a port that is not a number or a missing host, user or dbname
pub fn parse(connection_string: &str) -> Result<PgParams, ConnectError> {
    let invalid = |reason: &str| ConnectError::InvalidConnectionString(reason.to_string());

    let mut host = None;
    let mut user = None;
    let mut password = None;
    let mut dbname = None;
    let mut port = None;

    for pair in connection_string.split_whitespace() {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| invalid("expected key=value pairs"))?;

        match key {
            "host" => host = Some(value),
            "user" => user = Some(value),
            "password" => password = Some(value),
            "dbname" => dbname = Some(value),
            "port" => {
                port = Some(
                    value
                        .parse::<u16>()
                        .map_err(|_| invalid("port is not a valid number"))?,
                );
            }
            _ => return Err(invalid("unknown key")),
        }
    }

    Ok(PgParams {
        host: host.ok_or_else(|| invalid("missing host"))?.to_string(),
        user: user.ok_or_else(|| invalid("missing user"))?.to_string(),
        password: password.unwrap_or_default().to_string(),
        dbname: dbname.ok_or_else(|| invalid("missing dbname"))?.to_string(),
        port: port.unwrap_or(DEFAULT_PORT),
    })
}

/// Map parsed parameters onto driver options
#[must_use]
pub fn options(params: &PgParams, tls: &TlsConfig) -> PgConnectOptions {
    let mut options = PgConnectOptions::new()
        .host(&params.host)
        .port(params.port)
        .username(&params.user)
        .password(&params.password)
        .database(&params.dbname);

    options = match tls.mode {
        TlsMode::Disable => options.ssl_mode(PgSslMode::Disable),
        TlsMode::Require => options.ssl_mode(PgSslMode::Require),
        TlsMode::VerifyCA => options.ssl_mode(PgSslMode::VerifyCa),
        TlsMode::VerifyFull => options.ssl_mode(PgSslMode::VerifyFull),
    };

    if tls.mode.verifies_ca()
        && let Some(ca_path) = &tls.ca
    {
        options = options.ssl_root_cert(ca_path);
    }

    options
}

/// Open a single connection
///
/// # Errors
///
/// Returns an error if the connection string is malformed or the server
/// rejects or cannot be reached
pub async fn connect(config: &Config) -> Result<PgConnection, ConnectError> {
    let params = parse(&connection_string(config))?;
    let conn = options(&params, &config.tls).connect().await?;
    Ok(conn)
}
