//! Pub/Sub resources and their REST operations
//!
//! Each kind module holds the value type decoded from configuration (and from
//! emulator responses) plus `exists`, `create_if_absent`, `list` and `delete`.

pub mod names;
pub mod schema;
pub mod subscription;
pub mod topic;

pub use names::{collection_path, resource_name, ResourceKind};
pub use schema::{Schema, SchemaType};
pub use subscription::Subscription;
pub use topic::{
    AwsKinesis, CloudStorage, Encoding, IngestionDataSourceSettings, MessageStoragePolicy,
    SchemaSettings, TextFormat, Topic, TopicSchemaSettings,
};

use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::{ResourceClient, Response};
use crate::error::{Error, Result};

/// Resource labels
pub type Labels = BTreeMap<String, String>;

/// GET a resource: 200 means present, 404 absent
pub(crate) async fn exists(
    client: &dyn ResourceClient,
    resource_name: &str,
    operation: &'static str,
) -> Result<bool> {
    let response = client.get(resource_name).await?;

    match response.status {
        StatusCode::OK => Ok(true),
        StatusCode::NOT_FOUND => Ok(false),
        status => Err(Error::unexpected_status(operation, status)),
    }
}

/// GET a collection and decode the array under `field`
///
/// An empty body or a missing array yields no entries.
pub(crate) async fn list<T: DeserializeOwned>(
    client: &dyn ResourceClient,
    project: &str,
    path: &str,
    field: &str,
    operation: &'static str,
) -> Result<Vec<T>> {
    let response = client.get(path).await?;

    match response.status {
        StatusCode::OK => decode_list(&response, field),
        StatusCode::NOT_FOUND => Err(Error::ProjectNotFound(project.to_string())),
        status => Err(Error::unexpected_status(operation, status)),
    }
}

/// DELETE a resource; anything but 200 is an error
pub(crate) async fn delete(
    client: &dyn ResourceClient,
    resource_name: &str,
    operation: &'static str,
) -> Result<()> {
    let response = client.delete(resource_name).await?;

    if response.status != StatusCode::OK {
        return Err(Error::unexpected_status(operation, response.status));
    }
    Ok(())
}

/// Encode a request body
pub(crate) fn to_body<T: Serialize>(payload: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(payload)?)
}

fn decode_list<T: DeserializeOwned>(response: &Response, field: &str) -> Result<Vec<T>> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let mut value: serde_json::Value = serde_json::from_slice(&response.body)?;
    match value.get_mut(field).map(serde_json::Value::take) {
        None | Some(serde_json::Value::Null) => Ok(Vec::new()),
        Some(entries) => Ok(serde_json::from_value(entries)?),
    }
}
