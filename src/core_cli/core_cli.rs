use crate::constants::{CLIENT_DATA_PORT, MAX_BUF_SIZE};
use clap::Parser;
use std::path::PathBuf;

/// Server command-line arguments
#[derive(Parser, Debug)]
#[command(name = "mftpd", about = "A minimal active-mode file transfer server.")]
pub struct ServerCli {
    /// Port to listen on (overrides the configuration file)
    pub port: Option<u16>,

    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}

/// Client command-line arguments
#[derive(Parser, Debug)]
#[command(name = "mftp", about = "A minimal active-mode file transfer client.")]
pub struct ClientCli {
    /// Server address
    pub server: String,

    /// Server control port
    pub port: u16,

    /// Local port the server connects to for data transfers
    #[arg(short, long, default_value_t = CLIENT_DATA_PORT)]
    pub data_port: u16,

    /// Size of the transfer buffer in bytes
    #[arg(short, long, default_value_t = MAX_BUF_SIZE)]
    pub buffer_size: usize,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_port_is_optional() {
        let cli = ServerCli::parse_from(["mftpd"]);
        assert_eq!(cli.port, None);

        let cli = ServerCli::parse_from(["mftpd", "2121", "-c", "mftpd.toml", "-v"]);
        assert_eq!(cli.port, Some(2121));
        assert_eq!(cli.config, Some(PathBuf::from("mftpd.toml")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_client_positionals() {
        let cli = ClientCli::parse_from(["mftp", "127.0.0.1", "2121"]);
        assert_eq!(cli.server, "127.0.0.1");
        assert_eq!(cli.port, 2121);
        assert_eq!(cli.data_port, CLIENT_DATA_PORT);
        assert_eq!(cli.buffer_size, MAX_BUF_SIZE);

        assert!(ClientCli::try_parse_from(["mftp", "127.0.0.1"]).is_err());
    }
}
