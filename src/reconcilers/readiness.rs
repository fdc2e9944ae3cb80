//! Emulator readiness probe
//!
//! Any HTTP answer on the API root, whatever its status, means the emulator is
//! up. Transport errors are retried until the start timeout has elapsed.

use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, error, info};

use crate::client::ResourceClient;
use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::metrics;

/// Timing of the readiness probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadinessSettings {
    /// Fail once this much time has passed since the first attempt
    pub timeout: Duration,
    /// Pause between attempts
    pub interval: Duration,
    /// Pause before the first attempt
    pub initial_delay: Duration,
}

impl ReadinessSettings {
    pub fn from_config(config: &Configuration) -> Self {
        Self {
            timeout: config.start_timeout(),
            interval: config.startup_check_interval(),
            initial_delay: config.startup_delay(),
        }
    }
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            interval: Duration::from_millis(200),
            initial_delay: Duration::ZERO,
        }
    }
}

/// Poll the emulator until it answers
///
/// Returns the number of attempts made. Fails with [`Error::StartupTimeout`]
/// when the elapsed time exceeds `settings.timeout`.
pub async fn wait_until_ready(
    client: &dyn ResourceClient,
    settings: &ReadinessSettings,
) -> Result<u32> {
    if !settings.initial_delay.is_zero() {
        debug!(delay_ms = settings.initial_delay.as_millis() as u64, "Delaying startup check");
        sleep(settings.initial_delay).await;
    }

    let started = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;

        match client.get("").await {
            Ok(response) => {
                metrics::STARTUP_PROBES.with_label_values(&["ready"]).inc();
                info!(attempts, status = %response.status, "Emulator is ready");
                return Ok(attempts);
            }
            Err(e) => {
                metrics::STARTUP_PROBES.with_label_values(&["not_ready"]).inc();

                if started.elapsed() > settings.timeout {
                    let timeout_ms = u64::try_from(settings.timeout.as_millis()).unwrap_or(u64::MAX);
                    error!(attempts, timeout_ms, error = %e, "Emulator did not become ready");
                    return Err(Error::StartupTimeout { timeout_ms });
                }

                debug!(attempt = attempts, error = %e, "Emulator not ready yet");
                sleep(settings.interval).await;
            }
        }
    }
}
