pub mod error;

pub use error::{MftpError, Result};
