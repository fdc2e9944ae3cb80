//! Pub/Sub emulator sync
//!
//! Loads the configuration, waits for the emulator and reconciles it. Every
//! failure ends the process with exit status 1.

mod cli;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};

use pubsub_emulator_sync::{
    client::HttpClient, config::Configuration, logging, metrics, reconcilers,
};

use cli::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.log_format);

    let outcome = tokio::select! {
        result = run(&cli) => result,
        _ = shutdown_signal() => Err(anyhow::anyhow!("Interrupted before the sync finished")),
    };

    if let Err(e) = outcome {
        error!(error = %format!("{e:#}"), "Pub/Sub emulator sync failed");
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> anyhow::Result<()> {
    info!(config = %cli.config.display(), "Starting Pub/Sub emulator sync");

    let mut configuration = Configuration::load(&cli.config)
        .await
        .context("There was an error when trying to load the configuration file")?;

    if let Some(host) = &cli.host {
        configuration
            .replace_host(host)
            .await
            .context("The given host is invalid")?;
    }
    info!(host = %configuration.host, projects = configuration.projects.len(), "Configuration loaded");

    let client = HttpClient::new(configuration.host.clone());
    let result = reconcilers::sync(&configuration, &client).await;

    if let Some(path) = &cli.metrics_file {
        if let Err(e) = metrics::write_textfile(path) {
            warn!(path = %path.display(), error = %e, "Failed to write metrics textfile");
        }
    }

    result.context("Sync failed")?;

    let topics = reconcilers::list_synced_topics(&client, &configuration.projects)
        .await
        .context("There was some error while trying to list the topics")?;

    info!(topics = topics.len(), "Pub/Sub emulator sync finished");
    Ok(())
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received CTRL+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
