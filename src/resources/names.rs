//! Resource name derivation
//!
//! The only place resource names and collection paths are built. Existence
//! checks, create targets and delete targets all go through here.

use std::fmt;

/// Resource kinds addressable under a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Topics,
    Subscriptions,
    Schemas,
}

impl ResourceKind {
    /// Collection segment used in resource names
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Topics => "topics",
            ResourceKind::Subscriptions => "subscriptions",
            ResourceKind::Schemas => "schemas",
        }
    }

    /// Singular label for logs and metrics
    pub fn singular(&self) -> &'static str {
        match self {
            ResourceKind::Topics => "topic",
            ResourceKind::Subscriptions => "subscription",
            ResourceKind::Schemas => "schema",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `projects/{project}/{kind}/{name}`
///
/// Distinct inputs give distinct names as long as `project` and `name` hold no
/// `/`; configuration loading rejects names that do.
pub fn resource_name(project: &str, kind: ResourceKind, name: &str) -> String {
    format!("{}/{}", collection_path(project, kind), name)
}

/// `projects/{project}/{kind}`
pub fn collection_path(project: &str, kind: ResourceKind) -> String {
    format!("projects/{}/{}", project, kind.as_str())
}

/// Full topic resource name
pub fn topic_name(project: &str, topic: &str) -> String {
    resource_name(project, ResourceKind::Topics, topic)
}

/// Full subscription resource name
pub fn subscription_name(project: &str, subscription: &str) -> String {
    resource_name(project, ResourceKind::Subscriptions, subscription)
}

/// Full schema resource name
pub fn schema_name(project: &str, schema_id: &str) -> String {
    resource_name(project, ResourceKind::Schemas, schema_id)
}
