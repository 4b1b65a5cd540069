use crate::{
    config::Config,
    connector::{self, Dialect},
    metrics::{CHECKS_TOTAL, CONNECT_DURATION, ERRORS, LAST_SUCCESS, UP, encode_metrics},
};
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{any, get},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::{net::IpAddr, sync::Arc, time::Instant};
use tokio::net::TcpListener;
use tracing::{info, warn};

pub const OK_MESSAGE: &str = "ok";
pub const FAILURE_MESSAGE: &str = "unable to connect to database";

/// Body of every probe response
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub message: String,
}

impl ProbeResponse {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            message: OK_MESSAGE.to_string(),
        }
    }

    #[must_use]
    pub fn failure() -> Self {
        Self {
            message: FAILURE_MESSAGE.to_string(),
        }
    }
}

/// Routes of the probe service
///
/// The probe answers every method on `/` and `/api/rant`; `/metrics` exposes
/// the prometheus registry.
#[must_use]
pub fn router(config: Arc<Config>) -> Router {
    Router::new()
        .route("/", any(probe_handler))
        .route("/api/rant", any(probe_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(config)
}

/// Start the probe service
///
/// # Errors
///
/// Returns an error if the service fails to bind to the port or serve
pub async fn start(config: Config, listen: Option<IpAddr>, port: u16) -> anyhow::Result<()> {
    // Unknown selectors are answered with 500 per request, not refused here
    if let Err(err) = config.connection.parse::<Dialect>() {
        warn!(error = %err, "probe requests will fail until DB_CONNECTION is mysql or postgres");
    }

    // Bind to socket with smart fallback
    let (listener, bind_addr) = match listen {
        Some(addr) => {
            let socket_addr = format!("{addr}:{port}");
            let listener = TcpListener::bind(&socket_addr).await?;
            (listener, socket_addr)
        }
        None => {
            // Auto mode: try IPv6 first, fallback to IPv4
            if let Ok(l) = TcpListener::bind(format!("::0:{port}")).await {
                (l, format!("[::]:{port}"))
            } else {
                let socket_addr = format!("0.0.0.0:{port}");
                (TcpListener::bind(&socket_addr).await?, socket_addr)
            }
        }
    };

    info!(
        address = %bind_addr,
        database = %config.connection,
        host = %config.host,
        connect_timeout = ?config.connect_timeout,
        tls = config.tls.mode.is_enabled(),
        "listening"
    );

    axum::serve(listener, router(Arc::new(config)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");

    Ok(())
}

async fn probe_handler(State(config): State<Arc<Config>>) -> (StatusCode, Json<ProbeResponse>) {
    let start = Instant::now();
    let result = connector::check(&config).await;
    let runtime = start.elapsed();

    match result {
        Ok(dialect) => {
            let database = dialect.as_str();
            UP.set(1);
            CHECKS_TOTAL.with_label_values(&[database, "success"]).inc();
            CONNECT_DURATION
                .with_label_values(&[database])
                .observe(runtime.as_secs_f64());
            LAST_SUCCESS
                .with_label_values(&[database])
                .set(Utc::now().timestamp());

            info!(database, elapsed = ?runtime, "database connection ok");

            (StatusCode::OK, Json(ProbeResponse::ok()))
        }
        Err(err) => {
            let database = config.connection.as_str();
            let error_type = err.error_type();
            UP.set(0);
            CHECKS_TOTAL.with_label_values(&[database, "error"]).inc();
            ERRORS.with_label_values(&[database, error_type]).inc();

            warn!(
                database,
                error_type,
                error = %err,
                elapsed = ?runtime,
                "database connection failed"
            );

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProbeResponse::failure()),
            )
        }
    }
}

async fn metrics_handler() -> impl IntoResponse {
    match encode_metrics() {
        Ok(buffer) => (StatusCode::OK, buffer),
        Err(e) => {
            warn!("{e}");
            (StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
        }
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received Ctrl+C, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
