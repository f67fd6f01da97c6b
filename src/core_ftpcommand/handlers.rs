use crate::core_error::Result;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::{cwd, list, quit, retr, stor};
use crate::core_wire::{Command, ResponseCode};
use crate::session::Session;
use log::warn;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// A command handler borrows the session for the whole command cycle,
/// including any data transfer.
pub type CommandHandler = for<'a> fn(&'a mut Session, Command) -> HandlerFuture<'a>;

pub fn initialize_command_handlers() -> HashMap<FtpCommand, CommandHandler> {
    let mut handlers: HashMap<FtpCommand, CommandHandler> = HashMap::new();

    handlers.insert(FtpCommand::Get, get_handler);
    handlers.insert(FtpCommand::Put, put_handler);
    handlers.insert(FtpCommand::Ls, dir_handler);
    handlers.insert(FtpCommand::Pwd, dir_handler);
    handlers.insert(FtpCommand::Cd, cd_handler);
    handlers.insert(FtpCommand::Quit, quit_handler);
    handlers.insert(FtpCommand::User, login_again);
    handlers.insert(FtpCommand::Pass, login_again);

    handlers
}

fn get_handler(session: &mut Session, command: Command) -> HandlerFuture<'_> {
    Box::pin(retr::handle_get_command(session, command))
}

fn put_handler(session: &mut Session, command: Command) -> HandlerFuture<'_> {
    Box::pin(stor::handle_put_command(session, command))
}

fn dir_handler(session: &mut Session, command: Command) -> HandlerFuture<'_> {
    Box::pin(list::handle_dir_command(session, command))
}

fn cd_handler(session: &mut Session, command: Command) -> HandlerFuture<'_> {
    Box::pin(cwd::handle_cd_command(session, command))
}

fn quit_handler(session: &mut Session, command: Command) -> HandlerFuture<'_> {
    Box::pin(quit::handle_quit_command(session, command))
}

// user/pass after login
fn login_again(session: &mut Session, command: Command) -> HandlerFuture<'_> {
    Box::pin(async move {
        warn!("'{}' received from {} after login", command.name(), session.peer);
        session.respond(ResponseCode::BadSequence).await
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_command_has_a_handler() {
        let handlers = initialize_command_handlers();
        for kind in [
            FtpCommand::User,
            FtpCommand::Pass,
            FtpCommand::Put,
            FtpCommand::Get,
            FtpCommand::Ls,
            FtpCommand::Pwd,
            FtpCommand::Cd,
            FtpCommand::Quit,
        ] {
            assert!(handlers.contains_key(&kind), "no handler for {}", kind);
        }
    }
}
