//! Schemas
//!
//! Schemas are created with `POST projects/{p}/schemas?schemaId={id}`. They are
//! not part of teardown, so `create_if_absent` keeps reruns from failing on
//! schemas left over from a previous sync.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::client::ResourceClient;
use crate::error::{Error, Result};

use super::names::{collection_path, schema_name, ResourceKind};

/// Schema as declared in configuration or returned by the emulator
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Schema id; falls back to `name` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Local name in configuration, full resource name in emulator responses
    pub name: String,

    #[serde(rename = "type", default)]
    pub schema_type: SchemaType,

    #[serde(default)]
    pub definition: String,

    /// Assigned by the emulator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision_create_time: Option<String>,
}

impl Schema {
    /// Id used in the schema resource name
    pub fn schema_id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.name)
    }
}

/// Schema definition language
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaType {
    #[default]
    TypeUnspecified,
    ProtocolBuffer,
    Avro,
}

/// Body of the schema create request
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct CreateSchemaBody {
    /// Full schema resource name
    pub name: String,

    #[serde(rename = "type")]
    pub schema_type: SchemaType,

    pub definition: String,
}

impl CreateSchemaBody {
    pub fn new(project: &str, schema: &Schema) -> Self {
        Self {
            name: schema_name(project, schema.schema_id()),
            schema_type: schema.schema_type,
            definition: schema.definition.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaRevision {
    #[serde(default)]
    revision_id: Option<String>,
}

/// Check whether a schema exists
pub async fn exists(client: &dyn ResourceClient, schema_resource_name: &str) -> Result<bool> {
    super::exists(client, schema_resource_name, "IsSchemaPresent").await
}

/// Create a schema in `project` unless it already exists
///
/// Returns `true` when a create request was sent.
pub async fn create_if_absent(
    client: &dyn ResourceClient,
    project: &str,
    schema: &Schema,
) -> Result<bool> {
    let body = CreateSchemaBody::new(project, schema);

    if exists(client, &body.name).await? {
        debug!(schema = %body.name, "Schema already present");
        return Ok(false);
    }

    let path = format!(
        "{}?schemaId={}",
        collection_path(project, ResourceKind::Schemas),
        schema.schema_id()
    );
    let response = client.post(&path, super::to_body(&body)?).await?;

    if response.status != StatusCode::OK {
        return Err(Error::unexpected_status("CreateSchema", response.status));
    }

    info!(schema = %body.name, schema_type = ?body.schema_type, "Created schema");
    Ok(true)
}

/// List the schemas of a project, definitions included
pub async fn list(client: &dyn ResourceClient, project: &str) -> Result<Vec<Schema>> {
    let path = format!("{}?view=FULL", collection_path(project, ResourceKind::Schemas));
    super::list(client, project, &path, "schemas", "ListSchemas").await
}

/// Delete a schema
pub async fn delete(client: &dyn ResourceClient, schema_resource_name: &str) -> Result<()> {
    super::delete(client, schema_resource_name, "DeleteSchema").await
}

/// Current revision id of a schema
pub async fn revision_id(
    client: &dyn ResourceClient,
    project: &str,
    schema_id: &str,
) -> Result<String> {
    let response = client.get(&schema_name(project, schema_id)).await?;

    if response.status != StatusCode::OK {
        return Err(Error::unexpected_status(
            "GetSchemaRevisionIdBySchemaId",
            response.status,
        ));
    }

    let revision: SchemaRevision = serde_json::from_slice(&response.body)?;
    revision
        .revision_id
        .ok_or_else(|| Error::NotFound(format!("revision id of {}", schema_name(project, schema_id))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{MockClient, MockReply};
    use reqwest::Method;

    fn avro_schema() -> Schema {
        Schema {
            id: Some("user-events".to_string()),
            name: "User events".to_string(),
            schema_type: SchemaType::Avro,
            definition: r#"{"type":"record","name":"User","fields":[]}"#.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_posts_with_schema_id() {
        let client = MockClient::new(vec![
            MockReply::status(StatusCode::NOT_FOUND),
            MockReply::status(StatusCode::OK),
        ]);

        let created = create_if_absent(&client, "p", &avro_schema()).await.unwrap();

        assert!(created);
        let requests = client.requests();
        assert_eq!(requests[0].method, Method::GET);
        assert_eq!(requests[0].path, "projects/p/schemas/user-events");
        assert_eq!(requests[1].method, Method::POST);
        assert_eq!(requests[1].path, "projects/p/schemas?schemaId=user-events");
        let body = requests[1].json_body().unwrap();
        assert_eq!(body["name"], "projects/p/schemas/user-events");
        assert_eq!(body["type"], "AVRO");
    }

    #[tokio::test]
    async fn test_create_skips_existing_schema() {
        let client = MockClient::always(MockReply::status(StatusCode::OK));

        let created = create_if_absent(&client, "p", &avro_schema()).await.unwrap();

        assert!(!created);
        assert_eq!(client.requests().len(), 1);
    }

    #[test]
    fn test_schema_id_falls_back_to_name() {
        let schema = Schema {
            name: "orders".to_string(),
            ..Default::default()
        };
        assert_eq!(schema.schema_id(), "orders");
        assert_eq!(avro_schema().schema_id(), "user-events");
    }

    #[tokio::test]
    async fn test_revision_id_lookup() {
        let client = MockClient::new(vec![MockReply::json(
            StatusCode::OK,
            r#"{"name":"projects/p/schemas/s","type":"AVRO","revisionId":"a1b2c3"}"#,
        )]);

        let revision = revision_id(&client, "p", "s").await.unwrap();

        assert_eq!(revision, "a1b2c3");
        assert_eq!(client.calls(), vec![(Method::GET, "projects/p/schemas/s".to_string())]);
    }

    #[tokio::test]
    async fn test_revision_id_unknown_schema() {
        let client = MockClient::always(MockReply::status(StatusCode::NOT_FOUND));

        let err = revision_id(&client, "p", "missing").await.unwrap_err();

        assert!(matches!(err, Error::UnexpectedStatus { status: StatusCode::NOT_FOUND, .. }));
    }

    #[tokio::test]
    async fn test_list_uses_full_view() {
        let client = MockClient::new(vec![MockReply::json(
            StatusCode::OK,
            r#"{"schemas":[{"name":"projects/p/schemas/s","type":"PROTOCOL_BUFFER","definition":"syntax = \"proto3\";"}],"nextPageToken":""}"#,
        )]);

        let schemas = list(&client, "p").await.unwrap();

        assert_eq!(schemas.len(), 1);
        assert_eq!(schemas[0].schema_type, SchemaType::ProtocolBuffer);
        assert_eq!(client.calls()[0].1, "projects/p/schemas?view=FULL");
    }

    #[tokio::test]
    async fn test_delete_schema() {
        let client = MockClient::new(vec![MockReply::status(StatusCode::OK)]);

        delete(&client, "projects/p/schemas/s").await.unwrap();

        assert_eq!(client.calls(), vec![(Method::DELETE, "projects/p/schemas/s".to_string())]);
    }
}
