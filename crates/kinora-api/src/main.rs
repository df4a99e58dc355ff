use clap::Parser;
use kinora_core::Config;
use std::path::PathBuf;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Kinora media transfer service
#[derive(Debug, Parser)]
#[command(name = "kinora-api", version)]
struct Cli {
    /// Load environment variables from this file before reading configuration
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    if let Some(ref path) = cli.env_file {
        kinora_core::config::load_env_file(path)?;
    }
    let config = Config::from_env()?;

    let (_state, router) = kinora_api::setup::initialize_app(config.clone()).await?;

    kinora_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
