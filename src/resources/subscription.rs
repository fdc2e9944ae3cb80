//! Subscriptions

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::ResourceClient;
use crate::error::{Error, Result};

use super::names::{collection_path, ResourceKind};
use super::Labels;

/// Subscription as declared in configuration or returned by the emulator
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    /// Local name in configuration, full resource name in emulator responses
    pub name: String,

    /// Full topic resource name; only set on emulator responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack_deadline_seconds: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retain_acked_messages: Option<bool>,

    /// Duration string such as `"604800s"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_retention_duration: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_message_ordering: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// Body of the subscription create request
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionBody {
    /// Full topic resource name
    pub topic: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ack_deadline_seconds: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub retain_acked_messages: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_retention_duration: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_message_ordering: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl CreateSubscriptionBody {
    /// Build the body for `subscription` attached to `topic_resource_name`
    pub fn new(subscription: &Subscription, topic_resource_name: &str) -> Self {
        Self {
            topic: topic_resource_name.to_string(),
            labels: subscription.labels.clone(),
            ack_deadline_seconds: subscription.ack_deadline_seconds,
            retain_acked_messages: subscription.retain_acked_messages,
            message_retention_duration: subscription.message_retention_duration.clone(),
            enable_message_ordering: subscription.enable_message_ordering,
            filter: subscription.filter.clone(),
        }
    }
}

/// Check whether a subscription exists
pub async fn exists(client: &dyn ResourceClient, subscription_resource_name: &str) -> Result<bool> {
    super::exists(client, subscription_resource_name, "IsSubscriptionPresent").await
}

/// Fetch a subscription
pub async fn get(
    client: &dyn ResourceClient,
    subscription_resource_name: &str,
) -> Result<Subscription> {
    let response = client.get(subscription_resource_name).await?;

    match response.status {
        StatusCode::OK => Ok(serde_json::from_slice(&response.body)?),
        StatusCode::NOT_FOUND => Err(Error::NotFound(subscription_resource_name.to_string())),
        status => Err(Error::unexpected_status("GetSubscription", status)),
    }
}

/// Create a subscription unless it already exists
///
/// Returns `true` when a create request was sent.
pub async fn create_if_absent(
    client: &dyn ResourceClient,
    subscription_resource_name: &str,
    body: &CreateSubscriptionBody,
) -> Result<bool> {
    if exists(client, subscription_resource_name).await? {
        debug!(subscription = %subscription_resource_name, "Subscription already present");
        return Ok(false);
    }

    let response = client
        .put(subscription_resource_name, super::to_body(body)?)
        .await?;

    if response.status != StatusCode::OK {
        return Err(Error::unexpected_status("CreateSubscription", response.status));
    }

    info!(
        subscription = %subscription_resource_name,
        topic = %body.topic,
        "Created subscription"
    );
    Ok(true)
}

/// List the subscriptions of a project
pub async fn list(client: &dyn ResourceClient, project: &str) -> Result<Vec<Subscription>> {
    let path = collection_path(project, ResourceKind::Subscriptions);
    super::list(client, project, &path, "subscriptions", "ListSubscriptions").await
}

/// Delete a subscription
pub async fn delete(client: &dyn ResourceClient, subscription_resource_name: &str) -> Result<()> {
    super::delete(client, subscription_resource_name, "DeleteSubscription").await
}
