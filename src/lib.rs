//! Pub/Sub emulator sync
//!
//! Waits for a Pub/Sub emulator to come up, deletes the topics and
//! subscriptions of the configured projects and recreates everything declared
//! in a JSON configuration file.

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod reconcilers;
pub mod resources;

pub use error::{Error, Result};
