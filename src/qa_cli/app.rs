use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use super::args::CliArgs;
use super::dispatch::dispatch;
use super::runtime::{init_logging, load_config, load_local_env_overrides, LoadedConfig};

pub async fn run() -> Result<()> {
    load_local_env_overrides();
    let cli = CliArgs::parse();
    init_logging(&cli.log_level, cli.debug)?;

    info!("starting qa-engine v{}", env!("CARGO_PKG_VERSION"));
    let LoadedConfig { config, .. } = load_config(cli.config.as_ref())?;

    match dispatch(&cli.command, config).await {
        Ok(()) => {
            info!("command completed successfully");
            Ok(())
        }
        Err(err) => {
            error!("command failed: {err}");
            Err(err)
        }
    }
}
