//! Sync configuration document
//!
//! The JSON file describes the emulator host, the startup check and the
//! projects to provision. Loading normalizes defaults and validates the host;
//! the result is never modified by the reconciler.

mod host;

pub use host::*;

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::resources::{Schema, Topic};

const DEFAULT_START_TIMEOUT_MS: i64 = 30_000;
const DEFAULT_STARTUP_CHECK_INTERVAL_MS: i64 = 200;

/// Desired emulator state
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// `host:port` of the emulator
    #[serde(default)]
    pub host: String,

    /// Give up waiting for the emulator after this long
    #[serde(default)]
    pub start_timeout_ms: i64,

    /// Trust the emulator is already up
    #[serde(default)]
    pub avoid_startup_check: bool,

    /// Pause between readiness probes
    #[serde(default)]
    pub time_between_startup_checks_ms: i64,

    /// Pause before the first readiness probe
    #[serde(default)]
    pub delay_before_startup_check_ms: i64,

    #[serde(default)]
    pub projects: Vec<Project>,
}

/// A project and the resources it should contain
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,

    #[serde(default)]
    pub topics: Vec<Topic>,

    #[serde(default)]
    pub schemas: Vec<Schema>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            start_timeout_ms: DEFAULT_START_TIMEOUT_MS,
            avoid_startup_check: false,
            time_between_startup_checks_ms: DEFAULT_STARTUP_CHECK_INTERVAL_MS,
            delay_before_startup_check_ms: 0,
            projects: Vec::new(),
        }
    }
}

impl Configuration {
    /// Read, normalize and validate a configuration file
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::config(format!("Failed to read {}: {}", path.display(), e)))?;

        debug!(path = %path.display(), "Read configuration file");
        Self::from_json(&raw).await
    }

    /// Parse, normalize and validate a configuration document
    pub async fn from_json(raw: &str) -> Result<Self> {
        let mut configuration: Configuration = serde_json::from_str(raw)
            .map_err(|e| Error::config(format!("Invalid configuration document: {}", e)))?;

        configuration.normalize();
        validate_host(&configuration.host).await?;
        configuration.validate_names()?;

        Ok(configuration)
    }

    /// Reject names that cannot be used as a resource name segment
    pub fn validate_names(&self) -> Result<()> {
        for project in &self.projects {
            check_segment("project", &project.name)?;

            for schema in &project.schemas {
                check_segment("schema", schema.schema_id())?;
            }
            for topic in &project.topics {
                check_segment("topic", &topic.name)?;
                for subscription in &topic.subscriptions {
                    check_segment("subscription", &subscription.name)?;
                }
            }
        }
        Ok(())
    }

    /// Apply defaults to unset or out-of-range values
    pub fn normalize(&mut self) {
        self.host = normalize_host(&self.host);

        if self.start_timeout_ms <= 0 {
            self.start_timeout_ms = DEFAULT_START_TIMEOUT_MS;
        }
        if self.time_between_startup_checks_ms <= 0 {
            self.time_between_startup_checks_ms = DEFAULT_STARTUP_CHECK_INTERVAL_MS;
        }
        if self.delay_before_startup_check_ms < 0 {
            self.delay_before_startup_check_ms = 0;
        }
    }

    /// Replace the host, e.g. from the command line
    ///
    /// The current host is kept if the new one is invalid.
    pub async fn replace_host(&mut self, host: &str) -> Result<()> {
        let host = normalize_host(host);
        validate_host(&host).await?;

        debug!(from = %self.host, to = %host, "Replacing configured host");
        self.host = host;
        Ok(())
    }

    pub fn start_timeout(&self) -> Duration {
        millis(self.start_timeout_ms)
    }

    pub fn startup_check_interval(&self) -> Duration {
        millis(self.time_between_startup_checks_ms)
    }

    pub fn startup_delay(&self) -> Duration {
        millis(self.delay_before_startup_check_ms)
    }
}

fn check_segment(kind: &str, name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') {
        return Err(Error::config(format!(
            "Invalid {} name '{}': must be non-empty and contain no '/'",
            kind, name
        )));
    }
    Ok(())
}

fn millis(ms: i64) -> Duration {
    Duration::from_millis(u64::try_from(ms).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_load_configuration_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "host": "127.0.0.1:8888",
                "startTimeoutMs": 30000,
                "avoidStartupCheck": false,
                "projects": [],
                "timeBetweenStartupChecksMs": 200,
                "delayBeforeStartupCheckMs": 0
            }}"#
        )
        .unwrap();

        let config = Configuration::load(file.path()).await.unwrap();

        assert_eq!(config.host, "127.0.0.1:8888");
        assert_eq!(config.start_timeout_ms, 30000);
        assert!(!config.avoid_startup_check);
        assert_eq!(config.time_between_startup_checks_ms, 200);
        assert_eq!(config.delay_before_startup_check_ms, 0);
        assert!(config.projects.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_config_error() {
        let err = Configuration::load(Path::new("/nonexistent/config.json"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_malformed_document_is_config_error() {
        let err = Configuration::from_json("{\"projects\": [").await.unwrap_err();

        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_normalize_defaults() {
        let mut config = Configuration {
            host: String::new(),
            start_timeout_ms: -5,
            avoid_startup_check: true,
            time_between_startup_checks_ms: 0,
            delay_before_startup_check_ms: -1,
            projects: Vec::new(),
        };

        config.normalize();

        assert_eq!(config.host, "localhost:8085");
        assert_eq!(config.start_timeout(), Duration::from_secs(30));
        assert_eq!(config.startup_check_interval(), Duration::from_millis(200));
        assert_eq!(config.startup_delay(), Duration::ZERO);
    }

    #[test]
    fn test_normalize_port_only_host() {
        let mut config = Configuration {
            host: ":9000".to_string(),
            ..Default::default()
        };

        config.normalize();

        assert_eq!(config.host, "localhost:9000");
    }

    #[tokio::test]
    async fn test_parses_project_tree() {
        let config = Configuration::from_json(
            r#"{
                "host": "127.0.0.1:8085",
                "projects": [{
                    "name": "test-project",
                    "schemas": [{ "id": "s", "name": "s", "type": "AVRO", "definition": "{}" }],
                    "topics": [{
                        "name": "test-topic",
                        "labels": { "env": "dev" },
                        "messageRetentionDuration": "600s",
                        "schemaSettings": { "schema": "s", "encoding": "BINARY" },
                        "subscriptions": [{ "name": "test-subscription" }]
                    }]
                }]
            }"#,
        )
        .await
        .unwrap();

        let project = &config.projects[0];
        assert_eq!(project.name, "test-project");
        assert_eq!(project.schemas[0].schema_id(), "s");
        let topic = &project.topics[0];
        assert_eq!(topic.labels.as_ref().unwrap()["env"], "dev");
        assert_eq!(topic.message_retention_duration.as_deref(), Some("600s"));
        assert!(topic.kms_key_name.is_none());
        assert_eq!(topic.subscriptions[0].name, "test-subscription");
    }

    #[tokio::test]
    async fn test_names_with_slash_are_rejected() {
        let documents = [
            r#"{"host": "127.0.0.1:8085", "projects": [{ "name": "a/topics/b" }]}"#,
            r#"{"host": "127.0.0.1:8085", "projects": [{ "name": "a", "topics": [{ "name": "b/topics/c" }] }]}"#,
            r#"{"host": "127.0.0.1:8085", "projects": [{ "name": "a", "topics": [{ "name": "t", "subscriptions": [{ "name": "" }] }] }]}"#,
            r#"{"host": "127.0.0.1:8085", "projects": [{ "name": "a", "schemas": [{ "id": "s/1", "name": "s" }] }]}"#,
        ];

        for raw in documents {
            let err = Configuration::from_json(raw).await.unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{} should be rejected", raw);
        }
    }

    #[tokio::test]
    async fn test_bare_ipv6_host_fails_at_load() {
        let err = Configuration::from_json(r#"{"host": "::1:8085"}"#)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidHost(_)));
    }

    #[tokio::test]
    async fn test_replace_host() {
        let mut config = Configuration::default();

        config.replace_host("0.0.0.0:8085").await.unwrap();

        assert_eq!(config.host, "0.0.0.0:8085");
    }

    #[tokio::test]
    async fn test_replace_host_rejects_invalid_port() {
        let mut config = Configuration {
            host: "127.0.0.1:8085".to_string(),
            ..Default::default()
        };

        assert!(config.replace_host("127.0.0.1:99999").await.is_err());
        assert_eq!(config.host, "127.0.0.1:8085");
    }
}
