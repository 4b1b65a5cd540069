#![allow(dead_code, clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use dbprobe::{
    config::{Config, RawConfig},
    probe::{self, ProbeResponse},
    tls::TlsConfig,
};
use http_body_util::BodyExt;
use std::{env, path::PathBuf, sync::Arc, time::Duration};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time::{Instant, sleep},
};
use tower::ServiceExt;

pub const MARIADB_HOST: &str = "127.0.0.1";
pub const MARIADB_PORT: &str = "3306";
pub const MARIADB_USER: &str = "dbprobe";
pub const POSTGRES_HOST: &str = "127.0.0.1";
pub const POSTGRES_PORT: &str = "5432";
pub const POSTGRES_USER: &str = "postgres";
pub const PASSWORD: &str = "secret";
pub const DATABASE: &str = "testdb";

/// Every variable the binary reads, cleared before spawning it
pub const DB_VARS: [&str; 6] = [
    "DB_USER",
    "DB_PASS",
    "DB_HOST",
    "DB_NAME",
    "DB_PORT",
    "DB_CONNECTION",
];

pub fn skip_if_no_postgres() -> bool {
    env::var("SKIP_POSTGRES_TESTS").is_ok()
}

pub fn skip_if_no_mariadb() -> bool {
    env::var("SKIP_MARIADB_TESTS").is_ok()
}

pub fn config(connection: &str, host: &str, port: &str, user: &str, password: &str) -> Config {
    Config::new(
        RawConfig {
            connection: Some(connection.into()),
            user: Some(user.into()),
            password: Some(password.into()),
            host: Some(host.into()),
            port: Some(port.into()),
            name: Some(DATABASE.into()),
        },
        Duration::from_secs(3),
        TlsConfig::default(),
    )
    .expect("test config is complete")
}

pub fn mariadb_config() -> Config {
    config("mysql", MARIADB_HOST, MARIADB_PORT, MARIADB_USER, PASSWORD)
}

pub fn postgres_config() -> Config {
    config("postgres", POSTGRES_HOST, POSTGRES_PORT, POSTGRES_USER, PASSWORD)
}

pub fn app(config: Config) -> Router {
    probe::router(Arc::new(config))
}

pub struct ProbeReply {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: ProbeResponse,
}

/// Send one request through the router without a socket
pub async fn call(app: Router, method: Method, uri: &str) -> ProbeReply {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: ProbeResponse = serde_json::from_slice(&bytes).unwrap();

    ProbeReply {
        status,
        content_type,
        body,
    }
}

pub fn pick_free_port() -> u16 {
    std::net::TcpListener::bind(("127.0.0.1", 0))
        .expect("failed to bind random local port")
        .local_addr()
        .expect("failed to read local addr")
        .port()
}

pub fn dbprobe_binary_path() -> PathBuf {
    env::var_os("CARGO_BIN_EXE_dbprobe")
        .map_or_else(|| PathBuf::from("target/debug/dbprobe"), PathBuf::from)
}

/// Minimal HTTP/1.1 GET returning status line, headers and body
pub async fn http_get(port: u16, path: &str) -> Option<(u16, String, String)> {
    let mut stream = TcpStream::connect(("127.0.0.1", port)).await.ok()?;
    let request =
        format!("GET {path} HTTP/1.1\r\nHost: 127.0.0.1:{port}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.ok()?;

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.ok()?;
    let response = String::from_utf8(response).ok()?;
    let (head, body) = response.split_once("\r\n\r\n")?;
    let status = head.split_whitespace().nth(1)?.parse().ok()?;
    Some((status, head.to_lowercase(), body.to_string()))
}

pub async fn wait_for_listener(port: u16, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if TcpStream::connect(("127.0.0.1", port)).await.is_ok() {
            return true;
        }

        if Instant::now() >= deadline {
            return false;
        }

        sleep(Duration::from_millis(100)).await;
    }
}
