use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Registry, opts,
    register_histogram_vec_with_registry, register_int_counter_vec_with_registry,
    register_int_gauge_vec_with_registry, register_int_gauge_with_registry,
};
use std::sync::LazyLock;

pub static REGISTRY: LazyLock<Registry> = LazyLock::new(|| {
    let registry = Registry::new();
    register_process_collector(&registry);
    registry
});

#[cfg(target_os = "linux")]
fn register_process_collector(registry: &Registry) {
    let collector = prometheus::process_collector::ProcessCollector::for_self();
    if let Err(err) = registry.register(Box::new(collector)) {
        tracing::warn!(error = %err, "process metrics unavailable");
    }
}

#[cfg(not(target_os = "linux"))]
const fn register_process_collector(_registry: &Registry) {}

trait ResultExt<T> {
    fn or_exit(self, context: &str) -> T;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn or_exit(self, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                eprintln!("failed to initialize metric ({context}): {err}");
                std::process::exit(1);
            }
        }
    }
}

pub static UP: LazyLock<IntGauge> = LazyLock::new(|| {
    register_int_gauge_with_registry!(
        "dbprobe_up",
        "1 if the last probe connected, 0 otherwise",
        &REGISTRY
    )
    .or_exit("metric can be created")
});

pub static CHECKS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec_with_registry!(
        opts!("dbprobe_checks_total", "Total probe requests by result"),
        &["database", "result"],
        &REGISTRY
    )
    .or_exit("metric can be created")
});

pub static ERRORS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec_with_registry!(
        opts!("dbprobe_errors_total", "Total probe failures by error type"),
        &["database", "error_type"],
        &REGISTRY
    )
    .or_exit("metric can be created")
});

pub static CONNECT_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec_with_registry!(
        HistogramOpts::new(
            "dbprobe_connect_duration_seconds",
            "Time to establish the probe connection in seconds"
        ),
        &["database"],
        &REGISTRY
    )
    .or_exit("metric can be created")
});

pub static LAST_SUCCESS: LazyLock<IntGaugeVec> = LazyLock::new(|| {
    register_int_gauge_vec_with_registry!(
        opts!(
            "dbprobe_last_success_timestamp_seconds",
            "Unix timestamp of last successful probe"
        ),
        &["database"],
        &REGISTRY
    )
    .or_exit("metric can be created")
});

/// Encode the registry in the prometheus text format
///
/// # Errors
///
/// Returns an error if the metrics cannot be encoded
pub fn encode_metrics() -> Result<Vec<u8>, String> {
    let mut buffer = Vec::new();
    let encoder = prometheus::TextEncoder::new();

    encoder
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| format!("could not encode custom metrics: {e}"))?;

    Ok(buffer)
}
