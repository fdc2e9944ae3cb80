//! Teardown-then-rebuild reconciliation
//!
//! Phases run strictly in order: wait for the emulator, delete every topic and
//! subscription of the configured projects, then create everything declared.
//! Teardown is best effort; rebuild stops at the first failure.

use tracing::{debug, error, info, instrument, warn};

use crate::client::ResourceClient;
use crate::config::{Configuration, Project};
use crate::error::{Error, Result};
use crate::metrics;
use crate::resources::names::{subscription_name, topic_name, ResourceKind};
use crate::resources::subscription::{self, CreateSubscriptionBody};
use crate::resources::topic::{self, CreateTopicBody};
use crate::resources::{schema, Topic};

use super::readiness::{wait_until_ready, ReadinessSettings};

/// What a sync run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub topics_deleted: usize,
    pub subscriptions_deleted: usize,
    /// Deletes that failed and were skipped
    pub delete_failures: usize,
    /// Lists that failed and were treated as empty
    pub list_failures: usize,
    pub schemas_created: usize,
    pub topics_created: usize,
    pub subscriptions_created: usize,
}

/// Make the emulator match `config`
#[instrument(skip_all, fields(host = %config.host, projects = config.projects.len()))]
pub async fn sync(config: &Configuration, client: &dyn ResourceClient) -> Result<SyncReport> {
    let _timer = metrics::SYNC_DURATION.start_timer();

    if config.avoid_startup_check {
        info!("Startup check disabled, assuming the emulator is up");
    } else {
        wait_until_ready(client, &ReadinessSettings::from_config(config)).await?;
    }

    let mut report = SyncReport::default();
    teardown(client, &config.projects, &mut report).await;
    rebuild(client, &config.projects, &mut report).await?;

    info!(
        topics_deleted = report.topics_deleted,
        subscriptions_deleted = report.subscriptions_deleted,
        delete_failures = report.delete_failures,
        list_failures = report.list_failures,
        schemas_created = report.schemas_created,
        topics_created = report.topics_created,
        subscriptions_created = report.subscriptions_created,
        "Sync completed"
    );
    Ok(report)
}

/// Delete every topic, then every subscription, of each project
///
/// A failed list counts as an empty project and a failed delete is skipped;
/// both are logged and counted in `report`.
pub async fn teardown(client: &dyn ResourceClient, projects: &[Project], report: &mut SyncReport) {
    for project in projects {
        let topics = match topic::list(client, &project.name).await {
            Ok(topics) => topics,
            Err(e) => {
                record_list_failure(&project.name, ResourceKind::Topics, report, &e);
                Vec::new()
            }
        };

        for existing in &topics {
            match topic::delete(client, &existing.name).await {
                Ok(()) => {
                    report.topics_deleted += 1;
                    record_deleted(ResourceKind::Topics, &existing.name);
                }
                Err(e) => record_delete_failure(ResourceKind::Topics, &existing.name, report, &e),
            }
        }

        let subscriptions = match subscription::list(client, &project.name).await {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                record_list_failure(&project.name, ResourceKind::Subscriptions, report, &e);
                Vec::new()
            }
        };

        for existing in &subscriptions {
            match subscription::delete(client, &existing.name).await {
                Ok(()) => {
                    report.subscriptions_deleted += 1;
                    record_deleted(ResourceKind::Subscriptions, &existing.name);
                }
                Err(e) => record_delete_failure(
                    ResourceKind::Subscriptions,
                    &existing.name,
                    report,
                    &e,
                ),
            }
        }
    }
}

/// Create schemas, then each topic followed by its subscriptions, in
/// declaration order
pub async fn rebuild(
    client: &dyn ResourceClient,
    projects: &[Project],
    report: &mut SyncReport,
) -> Result<()> {
    for project in projects {
        for declared in &project.schemas {
            let created = schema::create_if_absent(client, &project.name, declared)
                .await
                .inspect_err(|e| {
                    error!(project = %project.name, schema = %declared.schema_id(), error = %e, "Failed to create schema")
                })?;
            if created {
                report.schemas_created += 1;
                record_created(ResourceKind::Schemas);
            }
        }

        for declared in &project.topics {
            rebuild_topic(client, &project.name, declared, report).await?;
        }
    }

    Ok(())
}

#[instrument(skip(client, declared, report), fields(topic = %declared.name))]
async fn rebuild_topic(
    client: &dyn ResourceClient,
    project: &str,
    declared: &Topic,
    report: &mut SyncReport,
) -> Result<()> {
    let topic_resource_name = topic_name(project, &declared.name);

    let schema_settings = match &declared.schema_settings {
        Some(settings) => Some(
            topic::resolve_schema_settings(client, project, settings)
                .await
                .inspect_err(|e| {
                    error!(topic = %topic_resource_name, schema = %settings.schema, error = %e, "Failed to resolve schema revisions")
                })?,
        ),
        None => None,
    };

    let body = CreateTopicBody::new(declared, schema_settings);
    let created = topic::create_if_absent(client, &topic_resource_name, &body)
        .await
        .inspect_err(|e| error!(topic = %topic_resource_name, error = %e, "Failed to create topic"))?;
    if created {
        report.topics_created += 1;
        record_created(ResourceKind::Topics);
    }

    for declared_subscription in &declared.subscriptions {
        let subscription_resource_name = subscription_name(project, &declared_subscription.name);
        let body = CreateSubscriptionBody::new(declared_subscription, &topic_resource_name);

        let created = subscription::create_if_absent(client, &subscription_resource_name, &body)
            .await
            .inspect_err(|e| {
                error!(subscription = %subscription_resource_name, error = %e, "Failed to create subscription")
            })?;
        if created {
            report.subscriptions_created += 1;
            record_created(ResourceKind::Subscriptions);
        }
    }

    Ok(())
}

/// List the topics of every project after a sync
///
/// Each topic is logged at debug. A failed list is an error, since the
/// emulator should answer for every project it was just given.
pub async fn list_synced_topics(
    client: &dyn ResourceClient,
    projects: &[Project],
) -> Result<Vec<Topic>> {
    let mut synced = Vec::new();

    for project in projects {
        let topics = topic::list(client, &project.name)
            .await
            .inspect_err(|e| error!(project = %project.name, error = %e, "Failed to list topics"))?;

        for listed in &topics {
            debug!(project = %project.name, topic = %listed.name, labels = ?listed.labels, "Topic present");
        }
        synced.extend(topics);
    }

    Ok(synced)
}

fn record_created(kind: ResourceKind) {
    metrics::RESOURCES_CREATED
        .with_label_values(&[kind.singular()])
        .inc();
}

fn record_deleted(kind: ResourceKind, name: &str) {
    info!(kind = kind.singular(), name = %name, "Deleted");
    metrics::RESOURCES_DELETED
        .with_label_values(&[kind.singular()])
        .inc();
}

fn record_list_failure(
    project: &str,
    kind: ResourceKind,
    report: &mut SyncReport,
    err: &Error,
) {
    warn!(
        project = %project,
        kind = %kind,
        error = %err,
        "Could not list resources, treating the project as empty"
    );
    report.list_failures += 1;
    metrics::TEARDOWN_FAILURES
        .with_label_values(&[kind.singular(), "list"])
        .inc();
}

fn record_delete_failure(
    kind: ResourceKind,
    name: &str,
    report: &mut SyncReport,
    err: &Error,
) {
    warn!(kind = kind.singular(), name = %name, error = %err, "Could not delete, skipping");
    report.delete_failures += 1;
    metrics::TEARDOWN_FAILURES
        .with_label_values(&[kind.singular(), "delete"])
        .inc();
}
