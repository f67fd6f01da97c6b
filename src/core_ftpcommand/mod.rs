// Here's the list of the commands implemented
pub mod cwd;
pub mod ftpcommand;
pub mod handlers;
pub mod list;
pub mod quit;
pub mod retr;
pub mod stor;

pub use ftpcommand::FtpCommand;
