use crate::config::{ENV_CONNECTION, ENV_HOST, ENV_NAME, ENV_PASS, ENV_PORT, ENV_USER};
use clap::{
    Arg, ArgAction, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

/// Pure clap command definitions with zero business logic
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new(env!("CARGO_PKG_NAME"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("db-connection")
                .env(ENV_CONNECTION)
                .help("Database dialect: mysql or postgres")
                .long("db-connection")
                .long_help(
                    "Database dialect, matched case-sensitively:\n\n\
                    - mysql: user:password@tcp(host:port)/dbname?charset=utf8mb4&parseTime=True&loc=Local\n\
                    - postgres: host=<host> user=<user> password=<password> dbname=<dbname> port=<port>\n\n\
                    Any other value is accepted at start-up, every probe then answers 500."
                )
                .value_name(ENV_CONNECTION)
                .required(true),
        )
        .arg(
            Arg::new("db-user")
                .env(ENV_USER)
                .help("Database user")
                .long("db-user")
                .value_name(ENV_USER)
                .required(true),
        )
        .arg(
            Arg::new("db-pass")
                .env(ENV_PASS)
                .help("Database password")
                .long("db-pass")
                .value_name(ENV_PASS)
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new("db-host")
                .env(ENV_HOST)
                .help("Database host")
                .long("db-host")
                .value_name(ENV_HOST)
                .required(true),
        )
        .arg(
            Arg::new("db-port")
                .env(ENV_PORT)
                .help("Database port")
                .long("db-port")
                .value_name(ENV_PORT)
                .required(true),
        )
        .arg(
            Arg::new("db-name")
                .env(ENV_NAME)
                .help("Database name")
                .long("db-name")
                .value_name(ENV_NAME)
                .required(true),
        )
        .arg(
            Arg::new("connect-timeout")
                .default_value("5")
                .env("DB_CONNECT_TIMEOUT")
                .help("Seconds to wait for the database to accept a connection")
                .long("connect-timeout")
                .short('t')
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("tls-mode")
                .env("DB_TLS_MODE")
                .help("TLS/SSL mode: disable, require, verify-ca, verify-full")
                .long("tls-mode")
                .long_help(
                    "TLS/SSL connection mode:\n\n\
                    - disable: No TLS (default)\n\
                    - require: TLS required, no certificate verification\n\
                    - verify-ca: Verify server certificate against CA\n\
                    - verify-full: Verify certificate and hostname\n\n\
                    MySQL/MariaDB: Maps to ssl-mode (DISABLED, REQUIRED, VERIFY_CA, VERIFY_IDENTITY)\n\
                    PostgreSQL: Maps to sslmode (disable, require, verify-ca, verify-full)"
                )
                .value_name("MODE")
                .value_parser(["disable", "require", "verify-ca", "verify-full"]),
        )
        .arg(
            Arg::new("tls-ca")
                .env("DB_TLS_CA")
                .help("Path to CA certificate file for TLS verification")
                .long("tls-ca")
                .long_help(
                    "Path to Certificate Authority (CA) certificate file.\n\
                    Used by the verify-ca and verify-full modes.\n\n\
                    Example: /etc/ssl/certs/ca-certificates.crt"
                )
                .value_name("PATH")
                .requires("tls-mode"),
        )
        .arg(
            Arg::new("listen")
                .env("DBPROBE_LISTEN")
                .help("IP address to bind to (default: [::]:port, accepts both IPv6 and IPv4)")
                .long("listen")
                .long_help(
                    "IP address to bind to:\n\
                    Not specified (default) binds to [::]:port which accepts both IPv6 and IPv4 connections.\n\
                    Falls back to 0.0.0.0:port if IPv6 is unavailable.\n\n\
                    Specific IPv4 examples: '0.0.0.0', '127.0.0.1'\n\
                    Specific IPv6: '::', '::1'"
                )
                .short('l')
                .value_name("IP"),
        )
        .arg(
            Arg::new("port")
                .default_value("8080")
                .env("DBPROBE_PORT")
                .help("listening port for the probe and /metrics")
                .long("port")
                .short('p')
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("log-json")
                .env("DBPROBE_LOG_JSON")
                .help("Emit logs as JSON lines")
                .long("log-json")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .help("Increase log verbosity, -vv for trace")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count),
        )
}
