use crate::config::{log_config, Config};
use crate::core_network::network;
use anyhow::{Context, Result};
use log::{error, info};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Binds the control listener described by `config`.
pub fn bind(config: &Config) -> Result<TcpListener> {
    let ip: IpAddr = config
        .server
        .listen_address
        .parse()
        .with_context(|| format!("Invalid listen address: {}", config.server.listen_address))?;
    let addr = SocketAddr::new(ip, config.server.listen_port);
    network::bind_listener(addr).with_context(|| format!("Failed to listen on {}", addr))
}

/// Runs the server with the provided configuration until the listener fails.
///
/// # Arguments
///
/// * `config` - The server configuration.
///
/// # Returns
///
/// Result<(), anyhow::Error> indicating the success or failure of the operation.
pub async fn run(config: Config) -> Result<()> {
    info!("Starting server with config:");
    log_config(&config);

    let listener = bind(&config)?;

    match network::serve(listener, Arc::new(config)).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Server stopped: {}", e);
            Err(e.into())
        }
    }
}
