use std::path::PathBuf;

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::info;
use warren_core::app::{BuildError, SupervisorBuilder};
use warren_core::domain::ConfigError;
use warren_core::handler::RegistryError;
use warren_core::impls::{ConsumerInspector, FileConfigLoader, DEFAULT_CONFIG_PATH};
use warren_core::logging::{self, LoggingError};
use warren_core::ports::ConfigLoader;

mod demo;

const BANNER: &str = r#"
 __      __
/  \    /  \_____ ______________   ____
\   \/\/   /\__  \\_  __ \_  __ \_/ __ \ /    \
 \        /  / __ \|  | \/|  | \/\  ___/|   |  \
  \__/\  /  (____  /__|   |__|    \___  >___|  /
       \/        \/                   \/     \/
"#;

#[derive(Parser)]
#[command(name = "warren", author, version, about = "Keeps queue consumers alive", long_about = None)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "WARREN_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check whether a consumer is active on a queue (RabbitMQ management API)
    Inspect { queue: String, consumer_tag: String },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Build(#[from] BuildError),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("warren: {err}");
            1
        }
    };

    // Worker の終了は待たない
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32, CliError> {
    let config = FileConfigLoader::new(&cli.config).load()?;

    if let Some(Command::Inspect {
        queue,
        consumer_tag,
    }) = cli.command
    {
        let inspector = ConsumerInspector::from_config(&config)?;
        return Ok(if inspector.is_active(&queue, &consumer_tag).await {
            println!("active");
            0
        } else {
            println!("inactive");
            1
        });
    }

    println!("{BANNER}");

    // guard は run() の終わりまで保持する（drop でファイルに flush される）
    let _guard = logging::try_init(&config.logging()?)?;

    let supervisor = SupervisorBuilder::new(config)
        .handlers(demo::shared_registry()?)
        .build()?;

    let closed = supervisor.run().await?;
    info!(restarts = closed.restarts, notified = ?closed.notified, "supervisor closed");

    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;
    use std::path::Path;
    use warren_core::app::WorkerPlan;

    fn sample_config() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/warren.yml")
    }

    #[test]
    fn sample_config_matches_demo_capabilities() {
        let config = FileConfigLoader::new(sample_config())
            .with_vars(HashMap::new())
            .load()
            .unwrap();

        let plan = WorkerPlan::from_config(&config).unwrap();
        assert_eq!(plan.workers.len(), 3);
        assert_eq!(config.discord_webhook_url(), None);

        let built = SupervisorBuilder::new(config)
            .handlers(demo::shared_registry().unwrap())
            .require_registered_handlers()
            .build();
        assert!(built.is_ok());
    }

    #[test]
    fn parses_inspect_subcommand() {
        let cli = Cli::try_parse_from(["warren", "-c", "x.yml", "inspect", "orders", "ctag-1"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("x.yml"));
        assert_matches!(
            cli.command,
            Some(Command::Inspect { queue, consumer_tag }) if queue == "orders" && consumer_tag == "ctag-1"
        );
    }
}
