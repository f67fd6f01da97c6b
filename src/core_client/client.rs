//! Client side of the protocol.
//!
//! Every operation runs to completion, including its data transfer, before
//! returning. Messages meant for the operator are written to the output
//! handle the client was built with.

use crate::config::ClientConfig;
use crate::core_client::input::Operator;
use crate::core_client::local::run_local;
use crate::core_error::{MftpError, Result};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_network::port::{accept_data_connection, DataConnection};
use crate::core_network::transfer::stream_bytes;
use crate::core_wire::{read_response, write_command, Command, Reply, ResponseCode};
use log::{debug, warn};
use std::io::Write;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};

pub struct FtpClient<W: Write> {
    control: TcpStream,
    config: ClientConfig,
    local_dir: PathBuf,
    out: W,
}

impl<W: Write> FtpClient<W> {
    /// Connects the control channel and reads the service-ready greeting.
    pub async fn connect<A: ToSocketAddrs>(addr: A, config: ClientConfig, out: W) -> Result<Self> {
        let control = TcpStream::connect(addr).await?;
        let local_dir = std::env::current_dir()?;
        let mut client = Self {
            control,
            config,
            local_dir,
            out,
        };

        let greeting = client.read_reply().await?;
        client.report(&greeting)?;
        if !greeting.is(ResponseCode::ServiceReady) {
            return Err(MftpError::UnexpectedReply(greeting));
        }
        Ok(client)
    }

    /// Directory that local file names resolve against.
    pub fn local_dir(&self) -> &Path {
        &self.local_dir
    }

    pub fn set_local_dir(&mut self, dir: impl Into<PathBuf>) {
        self.local_dir = dir.into();
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Sends the username and checks that the server asks for a password.
    ///
    /// Any other reply ends the login with [`MftpError::UnexpectedReply`]
    /// before a password is requested from the operator.
    pub async fn send_username(&mut self, username: &str) -> Result<()> {
        self.send(&Command::with_argument(FtpCommand::User, username)?).await?;
        let reply = self.read_reply().await?;
        if !reply.is(ResponseCode::NeedPassword) {
            self.report(&reply)?;
            return Err(MftpError::UnexpectedReply(reply));
        }
        Ok(())
    }

    /// Sends the password that completes the login.
    ///
    /// Returns [`MftpError::InvalidCredentials`] when the server rejects
    /// the pair.
    pub async fn send_password(&mut self, password: &str) -> Result<()> {
        self.send(&Command::with_argument(FtpCommand::Pass, password)?).await?;
        let reply = self.read_reply().await?;
        self.report(&reply)?;
        match reply {
            Reply::Code(ResponseCode::LoggedIn) => Ok(()),
            Reply::Code(ResponseCode::InvalidCredentials) => Err(MftpError::InvalidCredentials),
            other => Err(MftpError::UnexpectedReply(other)),
        }
    }

    /// Both login steps with credentials known up front.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<()> {
        self.send_username(username).await?;
        self.send_password(password).await
    }

    /// Downloads `remote` from the server into `local`.
    pub async fn get(&mut self, remote: &str, local: &Path) -> Result<Reply> {
        self.send(&Command::with_argument(FtpCommand::Get, remote)?).await?;
        let reply = self.read_reply().await?;
        if !reply.is(ResponseCode::OpenDataConnection) {
            self.report(&reply)?;
            return Ok(reply);
        }

        let DataConnection {
            stream: mut data_stream,
            reply: finished,
        } = match self.open_data_channel().await? {
            Ok(connection) => connection,
            Err(reply) => return Ok(reply),
        };

        let saved = match File::create(local).await {
            Ok(mut file) => {
                let result = stream_bytes(&mut data_stream, &mut file, self.config.buffer_size).await;
                result.map(|bytes| debug!("Received {} bytes into {:?}", bytes, local))
            }
            Err(e) => {
                warn!("Cannot create {:?}: {}", local, e);
                writeln!(self.out, "{}: {}", local.display(), e)?;
                stream_bytes(&mut data_stream, &mut tokio::io::sink(), self.config.buffer_size)
                    .await
                    .and(Err(e))
            }
        };
        drop(data_stream);

        match saved {
            Ok(()) => writeln!(self.out, "{} is retrieved", remote)?,
            Err(e) => warn!("Download of {} failed: {}", remote, e),
        }

        let reply = self.final_reply(finished).await?;
        self.report(&reply)?;
        Ok(reply)
    }

    /// Uploads `local` to the server as `remote`.
    pub async fn put(&mut self, local: &Path, remote: &str) -> Result<Reply> {
        let mut file = match File::open(local).await {
            Ok(file) => file,
            Err(_) => return Err(MftpError::NoSuchLocalFile(PathBuf::from(remote))),
        };

        self.send(&Command::with_argument(FtpCommand::Put, remote)?).await?;
        let reply = self.read_reply().await?;
        if reply.is(ResponseCode::BadSequence) {
            writeln!(
                self.out,
                "Operation not allowed: file with same name exists on server"
            )?;
            self.report(&reply)?;
            return Ok(reply);
        }
        if !reply.is(ResponseCode::OpenDataConnection) {
            self.report(&reply)?;
            return Ok(reply);
        }

        let DataConnection {
            stream: mut data_stream,
            reply: finished,
        } = match self.open_data_channel().await? {
            Ok(connection) => connection,
            Err(reply) => return Ok(reply),
        };

        let sent = stream_bytes(&mut file, &mut data_stream, self.config.buffer_size).await;
        if let Err(e) = data_stream.shutdown().await {
            debug!("Error shutting down data stream: {}", e);
        }
        drop(data_stream);

        match sent {
            Ok(bytes) => {
                debug!("Sent {} bytes from {:?}", bytes, local);
                writeln!(self.out, "{} is uploaded", remote)?;
            }
            Err(e) => warn!("Upload of {} failed: {}", remote, e),
        }

        let reply = self.final_reply(finished).await?;
        self.report(&reply)?;
        Ok(reply)
    }

    /// Runs `ls` or `pwd` on the server and prints its output.
    pub async fn dir(&mut self, kind: FtpCommand) -> Result<Reply> {
        self.send(&Command::bare(kind)?).await?;
        let reply = self.read_reply().await?;
        if !reply.is(ResponseCode::OpenDataConnection) {
            self.report(&reply)?;
            return Ok(reply);
        }

        let mut data_stream = match self.open_data_channel().await? {
            Ok(connection) => connection.stream,
            Err(reply) => return Ok(reply),
        };

        let mut buffer = vec![0u8; self.config.buffer_size.max(1)];
        loop {
            let bytes_read = data_stream.read(&mut buffer).await?;
            if bytes_read == 0 {
                break;
            }
            self.out.write_all(&buffer[..bytes_read])?;
        }
        self.out.flush()?;
        Ok(reply)
    }

    /// Changes the server's working directory for this session.
    pub async fn chdir(&mut self, dir: &str) -> Result<Reply> {
        self.send(&Command::with_argument(FtpCommand::Cd, dir)?).await?;
        let reply = self.read_reply().await?;
        self.report(&reply)?;
        Ok(reply)
    }

    /// Asks the server to close the session.
    pub async fn quit(&mut self) -> Result<Reply> {
        self.send(&Command::bare(FtpCommand::Quit)?).await?;
        let reply = self.read_reply().await?;
        if !reply.is(ResponseCode::ClosingControlConnection) {
            writeln!(self.out, "fail to get quitting response code")?;
            return Ok(reply);
        }

        self.report(&reply)?;
        if let Err(e) = self.control.shutdown().await {
            debug!("Error shutting down control connection: {}", e);
        }
        writeln!(self.out, "quitted")?;
        Ok(reply)
    }

    /// Runs one operator command. `Break` once the session has ended.
    pub async fn execute(&mut self, operator: Operator) -> Result<ControlFlow<()>> {
        let command = match operator {
            Operator::Local(local) => {
                run_local(&local, &mut self.local_dir, &mut self.out).await?;
                return Ok(ControlFlow::Continue(()));
            }
            Operator::Remote(command) => command,
        };

        let argument = command.argument().unwrap_or_default().to_string();
        match command.kind() {
            Some(FtpCommand::Get) => {
                let local = self.local_dir.join(&argument);
                self.get(&argument, &local).await?;
            }
            Some(FtpCommand::Put) => {
                let local = self.local_dir.join(&argument);
                self.put(&local, &argument).await?;
            }
            Some(kind @ (FtpCommand::Ls | FtpCommand::Pwd)) => {
                self.dir(kind).await?;
            }
            Some(FtpCommand::Cd) => {
                self.chdir(&argument).await?;
            }
            Some(FtpCommand::Quit) => {
                if self.quit().await?.is(ResponseCode::ClosingControlConnection) {
                    return Ok(ControlFlow::Break(()));
                }
            }
            _ => return Err(MftpError::InvalidCommand(command.to_string())),
        }
        Ok(ControlFlow::Continue(()))
    }

    async fn send(&mut self, command: &Command) -> Result<()> {
        write_command(&mut self.control, command).await
    }

    /// Reads a response; a closed control connection is an error here.
    async fn read_reply(&mut self) -> Result<Reply> {
        match read_response(&mut self.control).await? {
            Reply::Disconnected => Err(MftpError::Disconnected),
            reply => Ok(reply),
        }
    }

    /// Accepts the data connection. The inner `Err` carries the reply the
    /// server sent instead of connecting, already reported to the operator.
    async fn open_data_channel(&mut self) -> Result<std::result::Result<DataConnection, Reply>> {
        match accept_data_connection(&mut self.control, self.config.data_port).await {
            Ok(connection) => Ok(Ok(connection)),
            Err(MftpError::DataChannelRefused(reply)) => {
                self.report(&reply)?;
                Ok(Err(reply))
            }
            Err(e) => Err(e),
        }
    }

    /// Response closing a transfer, unless it already arrived while the data
    /// connection was being accepted.
    async fn final_reply(&mut self, finished: Option<Reply>) -> Result<Reply> {
        match finished {
            Some(reply) => Ok(reply),
            None => self.read_reply().await,
        }
    }

    fn report(&mut self, reply: &Reply) -> Result<()> {
        writeln!(self.out, "{}", reply)?;
        Ok(())
    }
}
