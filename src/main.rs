use anyhow::{Result, anyhow};
use clap::Parser;
use tracing::warn;

use meridian::cli::args::Cli;
use meridian::cli::context::{init_tracing, load_configuration};

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_configuration(cli.config.clone()).map_err(|err| anyhow!(err))?;
    init_tracing(&config.global.logging)?;

    tokio::select! {
        result = meridian::cli::run(cli, config) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!(target: "meridian", "收到 Ctrl+C，评估已中止");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}
