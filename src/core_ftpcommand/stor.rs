use crate::core_error::{MftpError, Result};
use crate::core_network::transfer::stream_bytes;
use crate::core_wire::{Command, ResponseCode};
use crate::session::Session;
use log::{error, info, warn};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Handles the `put` command.
///
/// Existing files are never overwritten: the target is created with
/// create-new semantics, and a name that already exists is answered with
/// bad-sequence without opening a data connection.
pub async fn handle_put_command(session: &mut Session, command: Command) -> Result<()> {
    let name = command.argument().unwrap_or_default();
    let path = session.resolve(name);

    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path).await {
        Ok(file) => file,
        Err(e) => {
            warn!("Refusing upload to {:?}: {}", path, e);
            let code = MftpError::from(e).to_response_code();
            session.respond(code).await?;
            return Ok(());
        }
    };

    session.respond(ResponseCode::OpenDataConnection).await?;

    let mut data_stream = match session.open_data_channel().await {
        Ok(stream) => stream,
        Err(err) => {
            drop(file);
            if let Err(e) = fs::remove_file(&path).await {
                warn!("Failed to remove {:?} after aborted upload: {}", path, e);
            }
            if let MftpError::DataChannel(_) = err {
                session.respond(ResponseCode::FileUnavailable).await?;
                return Ok(());
            }
            return Err(err);
        }
    };

    info!("Receiving file: {:?}", path);
    let result = stream_bytes(&mut data_stream, &mut file, session.buffer_size()).await;
    if let Err(e) = data_stream.shutdown().await {
        warn!("Error shutting down data stream: {}", e);
    }
    drop(data_stream);

    match result {
        Ok(bytes) => {
            info!("File stored successfully: {:?} ({} bytes)", path, bytes);
            session.respond(ResponseCode::CloseDataConnection).await
        }
        Err(e) => {
            error!("Error receiving file {:?}: {}", path, e);
            session.respond(ResponseCode::FileUnavailable).await
        }
    }
}
