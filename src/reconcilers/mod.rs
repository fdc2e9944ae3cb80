//! Reconciliation of the emulator against the configuration
//!
//! - [`readiness`] waits for the emulator to answer
//! - [`sync`] tears down existing topics and subscriptions and rebuilds them

pub mod readiness;
pub mod sync;

pub use readiness::{wait_until_ready, ReadinessSettings};
pub use sync::{list_synced_topics, rebuild, sync, teardown, SyncReport};
