use anyhow::Result;
use clap::Parser;

use frame_stream::cli::Cli;
use frame_stream::config::ServerConfig;
use frame_stream::server;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = ServerConfig::from_cli(&cli)?;
    server::serve(config).await
}
