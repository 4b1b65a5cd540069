use crate::{
    cli::actions::Action,
    config::{Config, DEFAULT_CONNECT_TIMEOUT, RawConfig},
    tls::{TlsConfig, TlsMode},
};
use anyhow::{Context, Result, anyhow};
use clap::ArgMatches;
use std::{net::IpAddr, path::PathBuf, time::Duration};

/// Extract TLS configuration from `--tls-mode` / `--tls-ca`
fn extract_tls_config(matches: &ArgMatches) -> Result<TlsConfig> {
    let mode = matches
        .get_one::<String>("tls-mode")
        .map(|m| m.parse::<TlsMode>().map_err(|e| anyhow!(e)))
        .transpose()?
        .unwrap_or_default();

    let ca = matches.get_one::<String>("tls-ca").map(PathBuf::from);

    Ok(TlsConfig { mode, ca })
}

fn extract_raw_config(matches: &ArgMatches) -> RawConfig {
    let get = |id: &str| matches.get_one::<String>(id).cloned();

    RawConfig {
        connection: get("db-connection"),
        user: get("db-user"),
        password: get("db-pass"),
        host: get("db-host"),
        port: get("db-port"),
        name: get("db-name"),
    }
}

/// Convert `ArgMatches` into typed Action enum with validation
///
/// # Errors
///
/// Returns an error if a database setting is missing or empty, or the
/// listen address, timeout or TLS mode are invalid
pub fn dispatch(matches: &ArgMatches) -> Result<Action> {
    let connect_timeout = matches
        .get_one::<u64>("connect-timeout")
        .copied()
        .map_or(DEFAULT_CONNECT_TIMEOUT, Duration::from_secs);

    let tls = extract_tls_config(matches)?;

    let config = Config::new(extract_raw_config(matches), connect_timeout, tls)
        .context("invalid configuration")?;

    // Extract and validate listen address
    let listen = matches
        .get_one::<String>("listen")
        .map(|addr| {
            addr.parse::<IpAddr>()
                .with_context(|| format!("Invalid IP address: {addr}"))
        })
        .transpose()?;

    // Extract port with default
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    Ok(Action::Serve {
        config,
        listen,
        port,
    })
}
