use crate::config::Config;
use crate::constants::MAX_PENDING;
use crate::core_auth::handshake::{authenticate, AuthOutcome};
use crate::core_error::Result;
use crate::core_ftpcommand::handlers::initialize_command_handlers;
use crate::core_wire::ResponseCode;
use crate::session::{Session, SessionState};
use log::{error, info, warn};
use std::io::{self, ErrorKind};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpSocket, TcpStream};

/// Binds a listening socket with address reuse enabled.
pub fn bind_listener(addr: SocketAddr) -> io::Result<TcpListener> {
    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(MAX_PENDING)
}

/// Accepts control connections forever, one task per connection.
pub async fn serve(listener: TcpListener, config: Arc<Config>) -> Result<()> {
    let root_dir = match &config.server.root_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    info!("Server listening on {}", listener.local_addr()?);

    loop {
        let (socket, addr) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                error!("Failed to accept connection: {}", e);
                continue;
            }
        };
        info!("New connection from {}", addr);

        let config = Arc::clone(&config);
        let root_dir = root_dir.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, addr, config, root_dir).await {
                error!("Connection error for {}: {}", addr, e);
            }
            info!("Client disconnected: {}", addr);
        });
    }
}

/// Runs one control session from greeting to close.
pub async fn handle_connection(
    socket: TcpStream,
    addr: SocketAddr,
    config: Arc<Config>,
    root_dir: PathBuf,
) -> Result<()> {
    let mut session = Session::new(socket, addr, config, root_dir);

    session.respond(ResponseCode::ServiceReady).await?;
    session.state = SessionState::Authenticating;

    match authenticate(&mut session).await? {
        AuthOutcome::Authenticated => {
            session.state = SessionState::Ready;
            session.respond(ResponseCode::LoggedIn).await?;
        }
        AuthOutcome::Rejected => {
            warn!("Authentication failed for {}", addr);
            session.respond(ResponseCode::InvalidCredentials).await?;
            session.close().await;
            return Ok(());
        }
        AuthOutcome::Disconnected => {
            session.state = SessionState::Closed;
            return Ok(());
        }
    }

    let handlers = initialize_command_handlers();

    while session.state == SessionState::Ready {
        let command = match session.read_command().await {
            Ok(Some(command)) => command,
            Ok(None) => {
                info!("Control connection closed by {}", addr);
                break;
            }
            Err(e) if is_transient(&e) => {
                warn!("Failed to receive command from {}: {}", addr, e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        info!("Command received from {}: {}", addr, command);

        let Some(kind) = command.kind() else {
            warn!("Unrecognized command from {}: {:?}", addr, command.name());
            break;
        };
        if !command.is_well_formed() {
            warn!("Malformed '{}' command from {}", kind, addr);
            session.respond(ResponseCode::CommandNotImplemented).await?;
            continue;
        }

        match handlers.get(&kind) {
            Some(handler) => handler(&mut session, command).await?,
            None => session.respond(ResponseCode::CommandNotImplemented).await?,
        }
    }

    session.state = SessionState::Closed;
    Ok(())
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut
    )
}
