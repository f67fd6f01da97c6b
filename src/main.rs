use anyhow::Result;
use clap::Parser;
use mftp::config::Config;
use mftp::core_cli::ServerCli;
use mftp::core_log::logger::init_logger;
use mftp::server;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = ServerCli::parse();

    init_logger("info", args.verbose);

    // Load configuration from the TOML file, if one was given
    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    };

    // Override the listening port from CLI if provided
    if let Some(port) = args.port {
        config.server.listen_port = port;
    }

    server::run(config).await
}
