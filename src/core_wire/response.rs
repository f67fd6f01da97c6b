//! Response codes sent by the server on the control connection.
//!
//! Every code travels as a 4-byte big-endian unsigned integer. A read that
//! hits end-of-stream before the first byte is reported as
//! [`Reply::Disconnected`] rather than as an error.

use crate::constants::RESPONSE_LEN;
use std::fmt;
use std::io::{self, ErrorKind};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ResponseCode {
    OpenDataConnection = 150,
    ServiceReady = 220,
    ClosingControlConnection = 221,
    CloseDataConnection = 226,
    LoggedIn = 230,
    CommandOk = 250,
    NeedPassword = 331,
    InvalidCredentials = 430,
    CommandNotImplemented = 502,
    BadSequence = 503,
    FileUnavailable = 550,
}

impl ResponseCode {
    pub const ALL: [ResponseCode; 11] = [
        ResponseCode::OpenDataConnection,
        ResponseCode::ServiceReady,
        ResponseCode::ClosingControlConnection,
        ResponseCode::CloseDataConnection,
        ResponseCode::LoggedIn,
        ResponseCode::CommandOk,
        ResponseCode::NeedPassword,
        ResponseCode::InvalidCredentials,
        ResponseCode::CommandNotImplemented,
        ResponseCode::BadSequence,
        ResponseCode::FileUnavailable,
    ];

    pub fn from_u32(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.code() == value)
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    /// Human-readable meaning shown to the client operator.
    pub fn description(self) -> &'static str {
        match self {
            ResponseCode::OpenDataConnection => "Open data connection",
            ResponseCode::ServiceReady => "Service ready",
            ResponseCode::ClosingControlConnection => "Close connection",
            ResponseCode::CloseDataConnection => "Finish data transmission",
            ResponseCode::LoggedIn => "User logged in",
            ResponseCode::CommandOk => "Command OK",
            ResponseCode::NeedPassword => "Need password",
            ResponseCode::InvalidCredentials => "Invalid credentials",
            ResponseCode::CommandNotImplemented => "Command cannot be executed",
            ResponseCode::BadSequence => "Command has bad sequence",
            ResponseCode::FileUnavailable => "No such file on server",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.description(), self.code())
    }
}

/// Outcome of reading one response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Code(ResponseCode),
    /// A complete frame carrying a value outside [`ResponseCode`].
    Unknown(u32),
    Disconnected,
}

impl Reply {
    pub fn is(&self, code: ResponseCode) -> bool {
        *self == Reply::Code(code)
    }
}

impl From<ResponseCode> for Reply {
    fn from(code: ResponseCode) -> Self {
        Reply::Code(code)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Code(code) => fmt::Display::fmt(code, f),
            Reply::Unknown(value) => write!(f, "Internal service error [{}]", value),
            Reply::Disconnected => f.write_str("Connection closed"),
        }
    }
}

pub fn encode_response(code: ResponseCode) -> [u8; RESPONSE_LEN] {
    code.code().to_be_bytes()
}

pub fn decode_response(frame: [u8; RESPONSE_LEN]) -> Reply {
    let value = u32::from_be_bytes(frame);
    match ResponseCode::from_u32(value) {
        Some(code) => Reply::Code(code),
        None => Reply::Unknown(value),
    }
}

pub async fn write_response<W>(writer: &mut W, code: ResponseCode) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&encode_response(code)).await?;
    writer.flush().await
}

pub async fn read_response<R>(reader: &mut R) -> io::Result<Reply>
where
    R: AsyncRead + Unpin,
{
    match read_word(reader).await? {
        Some(frame) => Ok(decode_response(frame)),
        None => Ok(Reply::Disconnected),
    }
}

/// Reads one 4-byte word. `None` when the stream ends before its first byte.
pub(crate) async fn read_word<R>(reader: &mut R) -> io::Result<Option<[u8; RESPONSE_LEN]>>
where
    R: AsyncRead + Unpin,
{
    let mut frame = [0u8; RESPONSE_LEN];
    let mut filled = 0;
    while filled < RESPONSE_LEN {
        let n = reader.read(&mut frame[filled..]).await?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                "response frame truncated",
            ));
        }
        filled += n;
    }
    Ok(Some(frame))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_code_round_trips() {
        for code in ResponseCode::ALL {
            assert_eq!(decode_response(encode_response(code)), Reply::Code(code));
        }
    }

    #[test]
    fn test_encoding_is_big_endian() {
        assert_eq!(encode_response(ResponseCode::ServiceReady), [0, 0, 0, 220]);
        assert_eq!(encode_response(ResponseCode::FileUnavailable), [0, 0, 2, 38]);
    }

    #[test]
    fn test_unknown_value() {
        assert_eq!(decode_response(7u32.to_be_bytes()), Reply::Unknown(7));
    }

    #[test]
    fn test_display() {
        assert_eq!(ResponseCode::CommandOk.to_string(), "Command OK [250]");
        assert_eq!(Reply::Unknown(1).to_string(), "Internal service error [1]");
    }

    #[tokio::test]
    async fn test_empty_stream_is_disconnected() {
        let mut empty: &[u8] = &[];
        assert_eq!(read_response(&mut empty).await.unwrap(), Reply::Disconnected);
    }

    #[tokio::test]
    async fn test_truncated_frame_is_an_error() {
        let mut partial: &[u8] = &[0, 0];
        let err = read_response(&mut partial).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let mut wire = Vec::new();
        write_response(&mut wire, ResponseCode::LoggedIn).await.unwrap();
        write_response(&mut wire, ResponseCode::BadSequence).await.unwrap();

        let mut reader = wire.as_slice();
        assert!(read_response(&mut reader).await.unwrap().is(ResponseCode::LoggedIn));
        assert!(read_response(&mut reader).await.unwrap().is(ResponseCode::BadSequence));
        assert_eq!(read_response(&mut reader).await.unwrap(), Reply::Disconnected);
    }
}
