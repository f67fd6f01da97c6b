// Wire codec for the control connection
pub mod command;
pub mod response;

pub use command::{read_command, write_command, Command, FrameBuffer};
pub use response::{read_response, write_response, Reply, ResponseCode};
