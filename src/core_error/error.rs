// Error handling shared by the client and the server
use crate::constants::{MAX_ARG_LEN, MAX_NAME_LEN};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_wire::response::{Reply, ResponseCode};
use std::io::{self, ErrorKind};
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MftpError>;

#[derive(Error, Debug)]
pub enum MftpError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Command name '{0}' is longer than {MAX_NAME_LEN} characters")]
    NameTooLong(String),

    #[error("Argument of {0} bytes is longer than {MAX_ARG_LEN} bytes")]
    ArgumentTooLong(usize),

    #[error("'{0}' requires an argument")]
    MissingArgument(FtpCommand),

    #[error("'{0}' does not take an argument")]
    UnexpectedArgument(FtpCommand),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("{}: no such file", .0.display())]
    NoSuchLocalFile(PathBuf),

    #[error("Data connection failed: {0}")]
    DataChannel(#[source] io::Error),

    #[error("Data connection refused: {0}")]
    DataChannelRefused(Reply),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Unexpected reply: {0}")]
    UnexpectedReply(Reply),

    #[error("Connection closed by peer")]
    Disconnected,
}

impl MftpError {
    /// The response code a server sends when an operation fails with this error.
    pub fn to_response_code(&self) -> ResponseCode {
        match self {
            MftpError::Io(e) if e.kind() == ErrorKind::AlreadyExists => ResponseCode::BadSequence,
            MftpError::Io(_) | MftpError::DataChannel(_) => ResponseCode::FileUnavailable,
            _ => ResponseCode::CommandNotImplemented,
        }
    }

    /// Errors after which the client cannot keep talking to the server.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MftpError::Io(_) | MftpError::Disconnected | MftpError::InvalidCredentials
        )
    }
}
