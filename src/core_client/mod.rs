pub mod client;
pub mod input;
pub mod local;
pub mod prompt;

pub use client::FtpClient;
pub use input::{parse_input, LocalCommand, Operator};
