use crate::core_error::{MftpError, Result};
use crate::core_network::transfer::stream_lines;
use crate::core_wire::{Command, ResponseCode};
use crate::session::Session;
use log::{error, info, warn};
use std::process::Stdio;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::process::Command as Process;

/// Handles the `ls` and `pwd` commands.
///
/// Only the command name itself is run, through `sh -c` in the session's
/// working directory; arguments never reach the shell. The output goes over
/// the data connection and its end is signalled by closing that connection,
/// so no response follows the transfer.
pub async fn handle_dir_command(session: &mut Session, command: Command) -> Result<()> {
    let program = command.name().to_string();

    let mut child = match Process::new("sh")
        .arg("-c")
        .arg(&program)
        .current_dir(&session.current_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            error!("Failed to execute '{}': {}", program, e);
            session.respond(ResponseCode::CommandNotImplemented).await?;
            return Ok(());
        }
    };
    let Some(stdout) = child.stdout.take() else {
        error!("No output captured for '{}'", program);
        session.respond(ResponseCode::CommandNotImplemented).await?;
        return Ok(());
    };

    session.respond(ResponseCode::OpenDataConnection).await?;

    let mut data_stream = match session.open_data_channel().await {
        Ok(stream) => stream,
        Err(MftpError::DataChannel(_)) => {
            session.respond(ResponseCode::CommandNotImplemented).await?;
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let mut output = BufReader::new(stdout);
    match stream_lines(&mut output, &mut data_stream).await {
        Ok(bytes) => info!("Sent '{}' output ({} bytes)", program, bytes),
        Err(e) => error!("Failed to send '{}' output: {}", program, e),
    }
    if let Err(e) = data_stream.shutdown().await {
        warn!("Error shutting down data stream: {}", e);
    }
    drop(data_stream);
    drop(output);

    if let Err(e) = child.wait().await {
        warn!("Failed to reap '{}': {}", program, e);
    }
    Ok(())
}
