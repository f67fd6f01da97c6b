use crate::core_error::Result;
use crate::core_wire::{Command, ResponseCode};
use crate::session::Session;
use log::{info, warn};
use tokio::fs;

/// Handles the `cd` command. No data connection is involved.
pub async fn handle_cd_command(session: &mut Session, command: Command) -> Result<()> {
    let target = session.resolve(command.argument().unwrap_or_default());

    let new_dir = match fs::canonicalize(&target).await {
        Ok(dir) => dir,
        Err(e) => {
            warn!("Failed to change directory to {:?}: {}", target, e);
            return session.respond(ResponseCode::CommandNotImplemented).await;
        }
    };
    match fs::metadata(&new_dir).await {
        Ok(metadata) if metadata.is_dir() => {}
        _ => {
            warn!("Not a directory: {:?}", new_dir);
            return session.respond(ResponseCode::CommandNotImplemented).await;
        }
    }

    info!("[{}] Working directory is now {:?}", session.peer, new_dir);
    session.current_dir = new_dir;
    session.respond(ResponseCode::CommandOk).await
}
