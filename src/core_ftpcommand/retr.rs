use crate::core_error::{MftpError, Result};
use crate::core_network::transfer::stream_bytes;
use crate::core_wire::{Command, ResponseCode};
use crate::session::Session;
use log::{error, info, warn};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// Handles the `get` command.
///
/// Sends the named file over a fresh data connection. A file that cannot be
/// opened for reading is answered with file-unavailable before any data
/// connection is negotiated.
///
/// # Arguments
///
/// * `session` - The control session the command arrived on.
/// * `command` - A well-formed `get` command carrying the file name.
///
/// # Returns
///
/// An error only when the control connection itself fails.
pub async fn handle_get_command(session: &mut Session, command: Command) -> Result<()> {
    let name = command.argument().unwrap_or_default();
    let path = session.resolve(name);

    let mut file = match open_regular_file(&path).await {
        Ok(file) => file,
        Err(e) => {
            warn!("File not found or could not be opened: {:?}, error: {}", path, e);
            session.respond(ResponseCode::FileUnavailable).await?;
            return Ok(());
        }
    };

    session.respond(ResponseCode::OpenDataConnection).await?;

    let mut data_stream = match session.open_data_channel().await {
        Ok(stream) => stream,
        Err(MftpError::DataChannel(_)) => {
            session.respond(ResponseCode::FileUnavailable).await?;
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    info!("Sending file: {:?}", path);
    let result = stream_bytes(&mut file, &mut data_stream, session.buffer_size()).await;
    if let Err(e) = data_stream.shutdown().await {
        warn!("Error shutting down data stream: {}", e);
    }
    drop(data_stream);

    match result {
        Ok(bytes) => {
            info!("File transfer completed: {:?} ({} bytes)", path, bytes);
            session.respond(ResponseCode::CloseDataConnection).await
        }
        Err(e) => {
            error!("Error sending file {:?}: {}", path, e);
            session.respond(ResponseCode::FileUnavailable).await
        }
    }
}

async fn open_regular_file(path: &std::path::Path) -> std::io::Result<File> {
    let file = File::open(path).await?;
    if !file.metadata().await?.is_file() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a regular file",
        ));
    }
    Ok(file)
}
