//! Fixed-size command frames.
//!
//! A frame is always [`MAX_BUF_SIZE`] bytes: the command name, optionally a
//! single space and the argument, then zero padding up to the frame size.

use crate::constants::{MAX_ARG_LEN, MAX_BUF_SIZE, MAX_NAME_LEN};
use crate::core_error::{MftpError, Result};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use std::fmt;
use std::io::{self, ErrorKind};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    argument: Option<String>,
}

impl Command {
    /// Builds a command, checking its arity and the frame limits.
    pub fn new(kind: FtpCommand, argument: Option<String>) -> Result<Self> {
        if kind.requires_argument() && argument.is_none() {
            return Err(MftpError::MissingArgument(kind));
        }
        if !kind.requires_argument() && argument.is_some() {
            return Err(MftpError::UnexpectedArgument(kind));
        }
        let command = Command {
            name: kind.as_str().to_string(),
            argument,
        };
        command.check_limits()?;
        Ok(command)
    }

    /// Builds a command from the client operator's input, where an empty
    /// username or password is still a present argument.
    pub fn with_argument(kind: FtpCommand, argument: impl Into<String>) -> Result<Self> {
        Self::new(kind, Some(argument.into()))
    }

    pub fn bare(kind: FtpCommand) -> Result<Self> {
        Self::new(kind, None)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn argument(&self) -> Option<&str> {
        self.argument.as_deref()
    }

    /// `None` for names the protocol does not know.
    pub fn kind(&self) -> Option<FtpCommand> {
        FtpCommand::from_name(&self.name)
    }

    /// Known name with the arity that name requires.
    pub fn is_well_formed(&self) -> bool {
        self.kind()
            .is_some_and(|kind| kind.accepts(self.argument()))
    }

    fn check_limits(&self) -> Result<()> {
        if self.name.len() > MAX_NAME_LEN {
            return Err(MftpError::NameTooLong(self.name.clone()));
        }
        if let Some(argument) = &self.argument {
            if argument.len() > MAX_ARG_LEN {
                return Err(MftpError::ArgumentTooLong(argument.len()));
            }
        }
        Ok(())
    }

    pub fn encode(&self) -> Result<[u8; MAX_BUF_SIZE]> {
        self.check_limits()?;

        let mut frame = [0u8; MAX_BUF_SIZE];
        let name = self.name.as_bytes();
        frame[..name.len()].copy_from_slice(name);
        if let Some(argument) = &self.argument {
            let start = name.len() + 1;
            frame[name.len()] = b' ';
            frame[start..start + argument.len()].copy_from_slice(argument.as_bytes());
        }
        Ok(frame)
    }

    /// Parses a frame. Never fails: unknown names come back as commands
    /// whose [`Command::kind`] is `None`.
    pub fn decode(frame: &[u8]) -> Command {
        let end = frame.iter().position(|&b| b == 0).unwrap_or(frame.len());
        let text = String::from_utf8_lossy(&frame[..end]);
        let text = text.trim_end_matches(char::is_control);

        match text.find(char::is_whitespace) {
            Some(split) => {
                let rest = text[split..].trim_start();
                Command {
                    name: text[..split].to_string(),
                    argument: (!rest.is_empty()).then(|| rest.to_string()),
                }
            }
            None => Command {
                name: text.to_string(),
                argument: None,
            },
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.argument {
            Some(argument) => write!(f, "{} {}", self.name, argument),
            None => f.write_str(&self.name),
        }
    }
}

pub async fn write_command<W>(writer: &mut W, command: &Command) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let frame = command.encode()?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// A command frame being received. Bytes read so far survive a failed read,
/// so a retry resumes where the previous attempt stopped.
#[derive(Debug)]
pub struct FrameBuffer {
    frame: [u8; MAX_BUF_SIZE],
    filled: usize,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            frame: [0u8; MAX_BUF_SIZE],
            filled: 0,
        }
    }

    /// Bytes of the current frame received so far.
    pub fn pending(&self) -> usize {
        self.filled
    }

    /// Fills the frame from `reader`. `None` when the peer closed before
    /// sending any byte of it.
    pub async fn read_from<R>(&mut self, reader: &mut R) -> io::Result<Option<Command>>
    where
        R: AsyncRead + Unpin,
    {
        while self.filled < MAX_BUF_SIZE {
            let n = reader.read(&mut self.frame[self.filled..]).await?;
            if n == 0 {
                if self.filled == 0 {
                    return Ok(None);
                }
                return Err(io::Error::new(
                    ErrorKind::UnexpectedEof,
                    "command frame truncated",
                ));
            }
            self.filled += n;
        }
        self.filled = 0;
        Ok(Some(Command::decode(&self.frame)))
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads one frame. `None` when the peer closed before sending anything.
pub async fn read_command<R>(reader: &mut R) -> io::Result<Option<Command>>
where
    R: AsyncRead + Unpin,
{
    FrameBuffer::new().read_from(reader).await
}
