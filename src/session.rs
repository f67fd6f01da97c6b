use crate::config::Config;
use crate::core_error::Result;
use crate::core_network::port;
use crate::core_wire::{write_response, Command, FrameBuffer, ResponseCode};
use log::debug;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Authenticating,
    Ready,
    Closed,
}

/// Server-side state of one control connection.
///
/// A session is owned by the task that accepted its connection and is never
/// shared; only the configuration behind `config` is common to all sessions.
#[derive(Debug)]
pub struct Session {
    pub control: TcpStream,
    pub peer: SocketAddr,
    pub config: Arc<Config>,
    /// Directory that relative paths and listings resolve against.
    pub current_dir: PathBuf,
    pub state: SessionState,
    /// Partially received command frame, kept across failed reads.
    frame: FrameBuffer,
}

impl Session {
    pub fn new(control: TcpStream, peer: SocketAddr, config: Arc<Config>, current_dir: PathBuf) -> Self {
        Self {
            control,
            peer,
            config,
            current_dir,
            state: SessionState::Connecting,
            frame: FrameBuffer::new(),
        }
    }

    pub async fn respond(&mut self, code: ResponseCode) -> Result<()> {
        debug!("[{}] -> {}", self.peer, code);
        write_response(&mut self.control, code).await?;
        Ok(())
    }

    /// Reads the next command. After an error, the next call continues the
    /// same frame.
    pub async fn read_command(&mut self) -> std::io::Result<Option<Command>> {
        self.frame.read_from(&mut self.control).await
    }

    /// Resolves a client-supplied path against the working directory.
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.current_dir.join(Path::new(name))
    }

    pub fn buffer_size(&self) -> usize {
        self.config.server.buffer_size
    }

    /// Waits for the client's acknowledgment and connects to its data port.
    pub async fn open_data_channel(&mut self) -> Result<TcpStream> {
        port::connect_data_channel(&mut self.control, self.config.server.client_data_port).await
    }

    pub async fn close(&mut self) {
        self.state = SessionState::Closed;
        if let Err(e) = self.control.shutdown().await {
            debug!("[{}] Control connection shutdown failed: {}", self.peer, e);
        }
    }
}
