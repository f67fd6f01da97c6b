//! Active-mode data connections.
//!
//! The client listens on its data port and acknowledges on the control
//! connection; only then does the server connect to that port, using the IP
//! address the control connection came from.

use crate::constants::DATA_CONN_ACK;
use crate::core_error::{MftpError, Result};
use crate::core_network::network::bind_listener;
use crate::core_wire::response::{read_response, read_word};
use crate::core_wire::{Reply, ResponseCode};
use log::{debug, error, warn};
use std::net::{Ipv4Addr, SocketAddr};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// Server side: waits for the acknowledgment, then connects to the client.
///
/// A peer that closes the control connection instead of acknowledging yields
/// [`MftpError::Disconnected`]. A failed connect yields
/// [`MftpError::DataChannel`], which only aborts the current operation.
pub async fn connect_data_channel(control: &mut TcpStream, data_port: u16) -> Result<TcpStream> {
    let peer = control.peer_addr()?;
    let addr = SocketAddr::new(peer.ip(), data_port);

    wait_for_ack(control).await?;

    debug!("Connecting to data port {}", addr);
    let data_stream = TcpStream::connect(addr).await.map_err(|e| {
        error!("Failed to connect to data port {}: {}", addr, e);
        MftpError::DataChannel(e)
    })?;
    Ok(data_stream)
}

async fn wait_for_ack(control: &mut TcpStream) -> Result<()> {
    match read_word(control).await? {
        Some(word) => {
            let ack = u32::from_be_bytes(word);
            if ack != DATA_CONN_ACK {
                warn!("Unexpected data connection acknowledgment: {}", ack);
            }
            Ok(())
        }
        None => Err(MftpError::Disconnected),
    }
}

pub async fn send_ack(control: &mut TcpStream) -> std::io::Result<()> {
    control.write_all(&DATA_CONN_ACK.to_be_bytes()).await?;
    control.flush().await
}

/// A data connection accepted by the client.
#[derive(Debug)]
pub struct DataConnection {
    pub stream: TcpStream,
    /// The server's final response, when it finished the transfer before the
    /// connection was picked up from the listen queue.
    pub reply: Option<Reply>,
}

/// Client side: listens on `data_port`, acknowledges, accepts one connection.
///
/// The control connection is watched while waiting. Any response other
/// than finish-data-transmission arriving there means the server gave up on
/// connecting, and ends the operation with
/// [`MftpError::DataChannelRefused`]. The listening socket is closed before
/// returning.
pub async fn accept_data_connection(control: &mut TcpStream, data_port: u16) -> Result<DataConnection> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, data_port));
    let listener = match bind_listener(addr) {
        Ok(listener) => Some(listener),
        Err(e) => {
            // Still acknowledge so the server's connect fails and it answers.
            error!("Failed to listen on data port {}: {}", data_port, e);
            None
        }
    };

    send_ack(control).await?;

    let Some(listener) = listener else {
        let reply = read_response(control).await?;
        return Err(refused(reply));
    };

    // The peek consumes nothing; the response is read in full below.
    let mut first = [0u8; 1];
    tokio::select! {
        biased;
        accepted = listener.accept() => {
            let (stream, addr) = accepted.map_err(MftpError::DataChannel)?;
            debug!("Accepted data connection from {}", addr);
            return Ok(DataConnection { stream, reply: None });
        }
        peeked = control.peek(&mut first) => {
            peeked?;
        }
    }

    let reply = read_response(control).await?;
    if !reply.is(ResponseCode::CloseDataConnection) {
        return Err(refused(reply));
    }

    // The server only finishes after its connect succeeded, so the
    // connection is already queued.
    let (stream, addr) = listener.accept().await.map_err(MftpError::DataChannel)?;
    debug!("Accepted finished data connection from {}", addr);
    Ok(DataConnection {
        stream,
        reply: Some(reply),
    })
}

fn refused(reply: Reply) -> MftpError {
    match reply {
        Reply::Disconnected => MftpError::Disconnected,
        reply => MftpError::DataChannelRefused(reply),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_wire::write_response;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    async fn control_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (client, accepted) = tokio::join!(TcpStream::connect(addr), listener.accept());
        (client.unwrap(), accepted.unwrap().0)
    }

    #[tokio::test]
    async fn test_handshake_connects_after_ack() {
        let (mut client_control, mut server_control) = control_pair().await;
        let data_port = 24711;

        let server = tokio::spawn(async move {
            let mut data = connect_data_channel(&mut server_control, data_port).await.unwrap();
            data.write_all(b"payload").await.unwrap();
        });

        let mut data = accept_data_connection(&mut client_control, data_port).await.unwrap();
        let mut received = Vec::new();
        data.stream.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, b"payload");
        server.await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_transfer_finished_before_accept_is_not_lost() {
        let (mut client_control, mut server_control) = control_pair().await;
        let data_port = 24715;

        for _ in 0..100 {
            let server = tokio::spawn(async move {
                let mut data = connect_data_channel(&mut server_control, data_port).await.unwrap();
                data.write_all(b"ok").await.unwrap();
                drop(data);
                write_response(&mut server_control, ResponseCode::CloseDataConnection)
                    .await
                    .unwrap();
                server_control
            });

            let mut data = accept_data_connection(&mut client_control, data_port).await.unwrap();
            let mut received = Vec::new();
            data.stream.read_to_end(&mut received).await.unwrap();
            assert_eq!(received, b"ok");

            let reply = match data.reply {
                Some(reply) => reply,
                None => read_response(&mut client_control).await.unwrap(),
            };
            assert!(reply.is(ResponseCode::CloseDataConnection));
            server_control = server.await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_server_reply_aborts_accept() {
        let (mut client_control, mut server_control) = control_pair().await;
        let data_port = 24712;

        let server = tokio::spawn(async move {
            wait_for_ack(&mut server_control).await.unwrap();
            write_response(&mut server_control, ResponseCode::FileUnavailable)
                .await
                .unwrap();
            server_control
        });

        let err = accept_data_connection(&mut client_control, data_port)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MftpError::DataChannelRefused(Reply::Code(ResponseCode::FileUnavailable))
        ));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_ack_is_a_disconnect() {
        let (client_control, mut server_control) = control_pair().await;
        drop(client_control);

        let err = connect_data_channel(&mut server_control, 24713).await.unwrap_err();
        assert!(matches!(err, MftpError::Disconnected));
    }

    #[tokio::test]
    async fn test_connect_failure_is_local_to_the_operation() {
        let (mut client_control, mut server_control) = control_pair().await;
        send_ack(&mut client_control).await.unwrap();

        // Nothing listens on the data port.
        let err = connect_data_channel(&mut server_control, 24714).await.unwrap_err();
        assert!(matches!(err, MftpError::DataChannel(_)));
    }
}
