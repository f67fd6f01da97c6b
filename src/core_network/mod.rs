pub mod network;
pub mod port;
pub mod transfer;

pub use network::{bind_listener, handle_connection, serve};
