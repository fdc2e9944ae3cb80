//! Topics

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::ResourceClient;
use crate::error::{Error, Result};

use super::names::{collection_path, schema_name, ResourceKind};
use super::subscription::Subscription;
use super::{schema, Labels};

/// Topic as declared in configuration or returned by the emulator
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    /// Local name in configuration, full resource name in emulator responses
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_storage_policy: Option<MessageStoragePolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_key_name: Option<String>,

    /// Duration string such as `"86400s"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_retention_duration: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingestion_data_source_settings: Option<IngestionDataSourceSettings>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_settings: Option<TopicSchemaSettings>,

    /// Subscriptions attached to this topic, created in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subscriptions: Vec<Subscription>,
}

/// Regions where messages may be stored
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageStoragePolicy {
    #[serde(default)]
    pub allowed_persistence_regions: Vec<String>,

    #[serde(default)]
    pub enforce_in_transit: bool,
}

/// Source the emulator ingests messages from
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum IngestionDataSourceSettings {
    AwsKinesis(AwsKinesis),
    CloudStorage(CloudStorage),
}

/// AWS Kinesis data stream source
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AwsKinesis {
    pub stream_arn: String,
    pub consumer_arn: String,
    pub aws_role_arn: String,
    pub gcp_service_account: String,
}

/// Cloud Storage bucket source
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CloudStorage {
    pub bucket: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_format: Option<TextFormat>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avro_format: Option<EmptyFormat>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pubsub_avro_format: Option<EmptyFormat>,

    /// RFC 3339 timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_object_create_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_glob: Option<String>,
}

/// Objects are newline (or `delimiter`) separated text
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TextFormat {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
}

/// Format marker with no options (`{}` on the wire)
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct EmptyFormat {}

/// Message encoding checked against the topic schema
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Encoding {
    EncodingUnspecified,
    Json,
    Binary,
}

/// Schema reference as written in configuration
///
/// `schema` and the revision fields hold schema ids of the same project; the
/// revision ids are looked up on the emulator right before the topic is created.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TopicSchemaSettings {
    pub schema: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<Encoding>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_revision_schema_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_revision_schema_id: Option<String>,
}

/// Schema settings as sent to the emulator
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSettings {
    /// Full schema resource name
    pub schema: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<Encoding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_revision_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_revision_id: Option<String>,
}

/// Body of the topic create request
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTopicBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_storage_policy: Option<MessageStoragePolicy>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kms_key_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_retention_duration: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingestion_data_source_settings: Option<IngestionDataSourceSettings>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_settings: Option<SchemaSettings>,
}

impl CreateTopicBody {
    /// Build the body from a declared topic and its resolved schema settings
    pub fn new(topic: &Topic, schema_settings: Option<SchemaSettings>) -> Self {
        Self {
            labels: topic.labels.clone(),
            message_storage_policy: topic.message_storage_policy.clone(),
            kms_key_name: topic.kms_key_name.clone(),
            message_retention_duration: topic.message_retention_duration.clone(),
            ingestion_data_source_settings: topic.ingestion_data_source_settings.clone(),
            schema_settings,
        }
    }
}

/// Check whether a topic exists
pub async fn exists(client: &dyn ResourceClient, topic_resource_name: &str) -> Result<bool> {
    super::exists(client, topic_resource_name, "IsTopicPresent").await
}

/// Create a topic unless it already exists
///
/// Returns `true` when a create request was sent.
pub async fn create_if_absent(
    client: &dyn ResourceClient,
    topic_resource_name: &str,
    body: &CreateTopicBody,
) -> Result<bool> {
    if exists(client, topic_resource_name).await? {
        debug!(topic = %topic_resource_name, "Topic already present");
        return Ok(false);
    }

    let response = client
        .put(topic_resource_name, super::to_body(body)?)
        .await?;

    if response.status != StatusCode::OK {
        return Err(Error::unexpected_status("CreateTopic", response.status));
    }

    info!(topic = %topic_resource_name, "Created topic");
    Ok(true)
}

/// List the topics of a project
pub async fn list(client: &dyn ResourceClient, project: &str) -> Result<Vec<Topic>> {
    let path = collection_path(project, ResourceKind::Topics);
    super::list(client, project, &path, "topics", "ListTopics").await
}

/// Delete a topic
pub async fn delete(client: &dyn ResourceClient, topic_resource_name: &str) -> Result<()> {
    super::delete(client, topic_resource_name, "DeleteTopic").await
}

/// Turn configured schema ids into the settings sent with the topic
///
/// One revision lookup per configured revision id, first then last.
pub async fn resolve_schema_settings(
    client: &dyn ResourceClient,
    project: &str,
    settings: &TopicSchemaSettings,
) -> Result<SchemaSettings> {
    let first_revision_id = match &settings.first_revision_schema_id {
        Some(schema_id) => Some(schema::revision_id(client, project, schema_id).await?),
        None => None,
    };
    let last_revision_id = match &settings.last_revision_schema_id {
        Some(schema_id) => Some(schema::revision_id(client, project, schema_id).await?),
        None => None,
    };

    Ok(SchemaSettings {
        schema: schema_name(project, &settings.schema),
        encoding: settings.encoding,
        first_revision_id,
        last_revision_id,
    })
}
