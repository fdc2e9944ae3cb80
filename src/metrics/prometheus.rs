//! Prometheus metrics definitions and textfile export

use std::fs;
use std::path::Path;

use prometheus::{
    register_counter_vec, register_histogram, CounterVec, Encoder, Histogram, TextEncoder,
};
use tracing::info;

use crate::error::{Error, Result};

lazy_static::lazy_static! {
    /// Requests sent to the emulator
    pub static ref REQUESTS: CounterVec = register_counter_vec!(
        "pubsub_emulator_sync_requests_total",
        "Requests sent to the emulator by method and status",
        &["method", "status"]
    ).unwrap();

    /// Resources created during rebuild
    pub static ref RESOURCES_CREATED: CounterVec = register_counter_vec!(
        "pubsub_emulator_sync_resources_created_total",
        "Resources created during rebuild",
        &["kind"]
    ).unwrap();

    /// Resources deleted during teardown
    pub static ref RESOURCES_DELETED: CounterVec = register_counter_vec!(
        "pubsub_emulator_sync_resources_deleted_total",
        "Resources deleted during teardown",
        &["kind"]
    ).unwrap();

    /// Teardown steps that failed and were skipped
    pub static ref TEARDOWN_FAILURES: CounterVec = register_counter_vec!(
        "pubsub_emulator_sync_teardown_failures_total",
        "Teardown list or delete calls that failed and were skipped",
        &["kind", "step"]
    ).unwrap();

    /// Readiness probe attempts
    pub static ref STARTUP_PROBES: CounterVec = register_counter_vec!(
        "pubsub_emulator_sync_startup_probes_total",
        "Readiness probe attempts by outcome",
        &["outcome"]
    ).unwrap();

    /// Full sync duration
    pub static ref SYNC_DURATION: Histogram = register_histogram!(
        "pubsub_emulator_sync_duration_seconds",
        "Duration of a full sync in seconds",
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
    ).unwrap();
}

/// Render every registered metric in the Prometheus text format
pub fn render() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| Error::Metrics(format!("Failed to encode metrics: {}", e)))?;

    String::from_utf8(buffer)
        .map_err(|e| Error::Metrics(format!("Metrics are not valid UTF-8: {}", e)))
}

/// Write the metrics textfile
///
/// The content goes to a sibling `.prom.tmp` file that is then renamed over
/// `path`.
pub fn write_textfile(path: &Path) -> Result<()> {
    let rendered = render()?;
    let tmp = path.with_extension("prom.tmp");

    fs::write(&tmp, rendered)?;
    fs::rename(&tmp, path)?;

    info!(path = %path.display(), "Wrote metrics textfile");
    Ok(())
}
