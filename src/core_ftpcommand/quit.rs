use crate::core_error::Result;
use crate::core_wire::{Command, ResponseCode};
use crate::session::Session;
use log::info;

/// Handles the `quit` command: answers, then closes the control connection.
pub async fn handle_quit_command(session: &mut Session, _command: Command) -> Result<()> {
    info!("Received quit from {}. Closing connection.", session.peer);
    let response = session.respond(ResponseCode::ClosingControlConnection).await;
    session.close().await;
    response
}
