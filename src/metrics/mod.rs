//! Prometheus metrics for emulator sync runs
//!
//! The process is short-lived, so metrics are written once to a textfile that a
//! node exporter textfile collector can pick up.

mod prometheus;

pub use self::prometheus::*;
