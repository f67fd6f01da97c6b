//! A minimal active-mode file transfer protocol: one control connection per
//! client carrying fixed-size command frames and 4-byte response codes, and
//! one short-lived data connection per transfer, opened by the server
//! towards a port the client listens on.

pub mod config;
pub mod constants;
pub mod core_auth;
pub mod core_cli;
pub mod core_client;
pub mod core_error;
pub mod core_ftpcommand;
pub mod core_log;
pub mod core_network;
pub mod core_wire;
pub mod server;
pub mod session;

pub use config::{ClientConfig, Config};
pub use core_error::{MftpError, Result};
