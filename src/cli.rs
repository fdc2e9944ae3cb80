use std::path::PathBuf;

use clap::Parser;

use pubsub_emulator_sync::logging::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "pubsub-emulator-sync")]
#[command(about = "Recreate Pub/Sub emulator topics, subscriptions and schemas from a JSON configuration")]
#[command(version)]
pub struct Cli {
    /// Path to the JSON configuration
    #[arg(short, long, env = "PUBSUB_SYNC_CONFIG", default_value = "./config.json")]
    pub config: PathBuf,

    /// Host to replace the one in the configuration file
    #[arg(long, env = "PUBSUB_EMULATOR_HOST")]
    pub host: Option<String>,

    /// Write Prometheus metrics to this file once the sync is over
    #[arg(long, env = "PUBSUB_SYNC_METRICS_FILE")]
    pub metrics_file: Option<PathBuf>,

    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["pubsub-emulator-sync"]).unwrap();

        assert_eq!(cli.config, PathBuf::from("./config.json"));
        assert_eq!(cli.log_format, LogFormat::Text);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "pubsub-emulator-sync",
            "--config",
            "/etc/pubsub/config.json",
            "--host",
            ":8681",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("/etc/pubsub/config.json"));
        assert_eq!(cli.host.as_deref(), Some(":8681"));
        assert_eq!(cli.log_format, LogFormat::Json);
    }
}
