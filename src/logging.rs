//! Tracing subscriber setup
//!
//! `RUST_LOG` directives win when set. Otherwise `LOG_LEVEL` picks one of
//! DEBUG, INFO, WARN or ERROR, with INFO as the fallback.

use std::env;

use tracing::level_filters::LevelFilter;
use tracing::warn;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Level used when `LOG_LEVEL` is unset or invalid
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::INFO;

/// Noisy dependencies kept at warn
const DEPENDENCY_DIRECTIVES: &str = "hyper=warn,hyper_util=warn,reqwest=warn";

/// Log line format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Parse a `LOG_LEVEL` value, ignoring case
pub fn parse_log_level(value: &str) -> Option<LevelFilter> {
    match value.trim().to_ascii_uppercase().as_str() {
        "DEBUG" => Some(LevelFilter::DEBUG),
        "INFO" => Some(LevelFilter::INFO),
        "WARN" => Some(LevelFilter::WARN),
        "ERROR" => Some(LevelFilter::ERROR),
        _ => None,
    }
}

/// Level for a `LOG_LEVEL` value, plus a warning when the value was rejected
pub fn resolve_level(log_level: Option<&str>) -> (LevelFilter, Option<String>) {
    match log_level.map(str::trim).filter(|v| !v.is_empty()) {
        None => (DEFAULT_LEVEL, None),
        Some(value) => match parse_log_level(value) {
            Some(level) => (level, None),
            None => (
                DEFAULT_LEVEL,
                Some(format!("LOG_LEVEL '{}' not valid, using INFO instead", value)),
            ),
        },
    }
}

/// Build the filter from `LOG_LEVEL` and `RUST_LOG` values
pub fn build_filter(log_level: Option<&str>, rust_log: Option<&str>) -> (EnvFilter, Option<String>) {
    if let Some(directives) = rust_log.filter(|d| !d.trim().is_empty()) {
        match EnvFilter::try_new(directives) {
            Ok(filter) => return (filter, None),
            Err(e) => {
                let (level, _) = resolve_level(log_level);
                return (
                    level_filter(level),
                    Some(format!("RUST_LOG '{}' not valid ({}), using {}", directives, e, level)),
                );
            }
        }
    }

    let (level, warning) = resolve_level(log_level);
    (level_filter(level), warning)
}

fn level_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(DEPENDENCY_DIRECTIVES)
}

/// Initialize the global tracing subscriber, logging to stderr
pub fn init_tracing(format: LogFormat) {
    let log_level = env::var("LOG_LEVEL").ok();
    let rust_log = env::var("RUST_LOG").ok();
    let (filter, warning) = build_filter(log_level.as_deref(), rust_log.as_deref());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }

    if let Some(warning) = warning {
        warn!("{}", warning);
    }
}
