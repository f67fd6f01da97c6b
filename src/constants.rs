// src/constants.rs

/// Size of every command frame on the control connection.
pub const MAX_BUF_SIZE: usize = 512;
pub const MAX_NAME_LEN: usize = 4;
/// Longest argument that still fits a frame after the name and its separator.
pub const MAX_ARG_LEN: usize = MAX_BUF_SIZE - MAX_NAME_LEN - 1;

/// Width of a response-code frame and of the data connection acknowledgment.
pub const RESPONSE_LEN: usize = 4;
/// Word sent by the client once its data port is listening.
pub const DATA_CONN_ACK: u32 = 1;

pub const MAX_PENDING: u32 = 5;
pub const CLIENT_DATA_PORT: u16 = 10240;
pub const DEFAULT_LISTEN_PORT: u16 = 2121;

pub const DEFAULT_USERNAME: &str = "user";
pub const DEFAULT_PASSWORD: &str = "pass";
