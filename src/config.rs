use crate::constants::{
    CLIENT_DATA_PORT, DEFAULT_LISTEN_PORT, DEFAULT_PASSWORD, DEFAULT_USERNAME, MAX_BUF_SIZE,
};
use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    pub listen_port: u16,
    /// Port the server connects to on the client's host for data transfers.
    pub client_data_port: u16,
    pub buffer_size: usize,
    /// Initial working directory of every session. Defaults to the process's.
    pub root_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: String::from("0.0.0.0"),
            listen_port: DEFAULT_LISTEN_PORT,
            client_data_port: CLIENT_DATA_PORT,
            buffer_size: MAX_BUF_SIZE,
            root_dir: None,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: String::from(DEFAULT_USERNAME),
            password: String::from(DEFAULT_PASSWORD),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        Self::parse(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))
    }

    pub fn parse(config_str: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(config_str)?;
        if config.server.buffer_size == 0 {
            config.server.buffer_size = MAX_BUF_SIZE;
        }
        Ok(config)
    }
}

/// Settings of the interactive client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Port the client listens on for data connections.
    pub data_port: u16,
    pub buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_port: CLIENT_DATA_PORT,
            buffer_size: MAX_BUF_SIZE,
        }
    }
}

// Helper function to log configuration options
pub fn log_config(config: &Config) {
    info!("  Listen Address: {}", config.server.listen_address);
    info!("  Listen Port: {}", config.server.listen_port);
    info!("  Client Data Port: {}", config.server.client_data_port);
    info!("  Buffer Size: {} bytes", config.server.buffer_size);
    match &config.server.root_dir {
        Some(dir) => info!("  Root Directory: {}", dir.display()),
        None => info!("  Root Directory: <current directory>"),
    }
    info!("  User: {}", config.auth.username);
}
