use dsn::DSN;
use sqlx::{
    ConnectOptions,
    mysql::{MySqlConnectOptions, MySqlConnection, MySqlSslMode},
};

use super::ConnectError;
use crate::config::Config;
use crate::tls::{TlsConfig, TlsMode};

pub const DEFAULT_PORT: u16 = 3306;

/// utf8mb4 charset, typed time values, session in the server's local zone
const PARAMS: &str = "charset=utf8mb4&parseTime=True&loc=Local";

/// `user:password@tcp(host:port)/dbname?charset=utf8mb4&parseTime=True&loc=Local`
#[must_use]
pub fn connection_string(config: &Config) -> String {
    format!(
        "{}:{}@tcp({}:{})/{}?{PARAMS}",
        config.user, config.password, config.host, config.port, config.name
    )
}

/// Parse a connection string produced by [`connection_string`]
///
/// Credentials end at the last `@` before the database path and are taken
/// verbatim: the user runs up to the first `:`, the password is the rest, and
/// neither is percent-decoded. Only the address, database and parameters go
/// through the `dsn` parser.
///
/// # Errors
///
/// Returns [`ConnectError::InvalidConnectionString`] if the string is not a
/// valid `user:password@tcp(host:port)/dbname` DSN
pub fn parse(connection_string: &str) -> Result<DSN, ConnectError> {
    let (head, path) = match connection_string.rsplit_once('/') {
        Some((head, path)) => (head, Some(path)),
        None => (connection_string, None),
    };

    let (credentials, address) = match head.rsplit_once('@') {
        Some((credentials, address)) => (Some(credentials), address),
        None => (None, head),
    };

    // the leading '@' keeps dsn from reading credentials out of the address
    let mut target = format!("mysql://@{address}");
    if let Some(path) = path {
        target.push('/');
        target.push_str(path);
    }

    let mut dsn = dsn::parse(&target)
        .map_err(|e| ConnectError::InvalidConnectionString(e.to_string()))?;

    if let Some(credentials) = credentials {
        let (user, password) = credentials.split_once(':').unwrap_or((credentials, ""));
        dsn.username = Some(user.to_string()).filter(|u| !u.is_empty());
        dsn.password = Some(password.to_string()).filter(|p| !p.is_empty());
    }

    Ok(dsn)
}

/// Map a parsed DSN onto driver options
#[must_use]
pub fn options(dsn: &DSN, tls: &TlsConfig) -> MySqlConnectOptions {
    let mut options = MySqlConnectOptions::new()
        .username(dsn.username.clone().unwrap_or_default().as_ref())
        .password(dsn.password.clone().unwrap_or_default().as_str())
        .database(dsn.database.clone().unwrap_or_default().as_ref());

    if let Some(host) = &dsn.host {
        options = options.host(host.as_str()).port(dsn.port.unwrap_or(DEFAULT_PORT));
    } else if let Some(socket) = &dsn.socket {
        options = options.socket(socket.as_str());
    }

    if let Some(charset) = dsn.params.get("charset") {
        options = options.charset(charset);
    }

    // loc=Local keeps the server's time_zone instead of forcing UTC
    options = match dsn.params.get("loc").map(String::as_str) {
        Some("UTC") => options.timezone(Some(String::from("+00:00"))),
        _ => options.timezone(None::<String>),
    };

    options = match tls.mode {
        TlsMode::Disable => options.ssl_mode(MySqlSslMode::Disabled),
        TlsMode::Require => options.ssl_mode(MySqlSslMode::Required),
        TlsMode::VerifyCA => options.ssl_mode(MySqlSslMode::VerifyCa),
        TlsMode::VerifyFull => options.ssl_mode(MySqlSslMode::VerifyIdentity),
    };

    if tls.mode.verifies_ca()
        && let Some(ca_path) = &tls.ca
    {
        options = options.ssl_ca(ca_path);
    }

    options
}

/// Open a single connection
///
/// # Errors
///
/// Returns an error if the connection string is malformed or the server
/// rejects or cannot be reached
pub async fn connect(config: &Config) -> Result<MySqlConnection, ConnectError> {
    let dsn = parse(&connection_string(config))?;
    let conn = options(&dsn, &config.tls).connect().await?;
    Ok(conn)
}
