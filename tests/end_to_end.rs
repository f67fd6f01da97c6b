//! Client/server sessions over loopback.
//!
//! Every test runs its own server on an ephemeral control port and uses its
//! own client data port, so tests can run in parallel.

use mftp::config::{ClientConfig, Config};
use mftp::constants::MAX_BUF_SIZE;
use mftp::core_client::FtpClient;
use mftp::core_ftpcommand::FtpCommand;
use mftp::core_network::network;
use mftp::core_wire::{read_command, read_response, write_command, write_response, Command, Reply, ResponseCode};
use mftp::{server, MftpError};
use std::net::SocketAddr;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

struct Harness {
    addr: SocketAddr,
    data_port: u16,
    server_dir: TempDir,
    client_dir: TempDir,
}

impl Harness {
    async fn start(data_port: u16) -> Self {
        Self::start_with(data_port, data_port).await
    }

    /// Server that connects to `server_data_port` while the client listens
    /// on `client_data_port`.
    async fn start_with(client_data_port: u16, server_data_port: u16) -> Self {
        let server_dir = tempdir().unwrap();
        let client_dir = tempdir().unwrap();

        let mut config = Config::default();
        config.server.listen_address = "127.0.0.1".to_string();
        config.server.listen_port = 0;
        config.server.client_data_port = server_data_port;
        config.server.root_dir = Some(server_dir.path().to_path_buf());

        let listener = server::bind(&config).unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(network::serve(listener, Arc::new(config)));

        Harness {
            addr,
            data_port: client_data_port,
            server_dir,
            client_dir,
        }
    }

    async fn client(&self) -> FtpClient<Vec<u8>> {
        let config = ClientConfig {
            data_port: self.data_port,
            buffer_size: MAX_BUF_SIZE,
        };
        let mut client = FtpClient::connect(self.addr, config, Vec::new()).await.unwrap();
        client.set_local_dir(self.client_dir.path());
        client
    }

    async fn logged_in_client(&self) -> FtpClient<Vec<u8>> {
        let mut client = self.client().await;
        client.login("user", "pass").await.unwrap();
        client
    }

    fn server_path(&self, name: &str) -> std::path::PathBuf {
        self.server_dir.path().join(name)
    }

    fn client_path(&self, name: &str) -> std::path::PathBuf {
        self.client_dir.path().join(name)
    }
}

fn output(client: &FtpClient<Vec<u8>>) -> String {
    String::from_utf8_lossy(client.output()).into_owned()
}

async fn raw_login(addr: SocketAddr, username: &str, password: &str) -> (TcpStream, Reply) {
    let mut control = TcpStream::connect(addr).await.unwrap();
    assert!(read_response(&mut control).await.unwrap().is(ResponseCode::ServiceReady));

    write_command(&mut control, &Command::with_argument(FtpCommand::User, username).unwrap())
        .await
        .unwrap();
    assert!(read_response(&mut control).await.unwrap().is(ResponseCode::NeedPassword));

    write_command(&mut control, &Command::with_argument(FtpCommand::Pass, password).unwrap())
        .await
        .unwrap();
    let reply = read_response(&mut control).await.unwrap();
    (control, reply)
}

async fn send_raw_frame(control: &mut TcpStream, text: &[u8]) {
    let mut frame = [0u8; MAX_BUF_SIZE];
    frame[..text.len()].copy_from_slice(text);
    control.write_all(&frame).await.unwrap();
}

#[tokio::test]
async fn test_upload_then_download_is_byte_identical() {
    let harness = Harness::start(25101).await;
    let original: Vec<u8> = (0..10 * 1024u32).map(|i| (i * 7 % 256) as u8).collect();
    std::fs::write(harness.client_path("a.txt"), &original).unwrap();

    let mut client = harness.logged_in_client().await;

    let reply = client.put(&harness.client_path("a.txt"), "a.txt").await.unwrap();
    assert!(reply.is(ResponseCode::CloseDataConnection));
    assert_eq!(std::fs::read(harness.server_path("a.txt")).unwrap(), original);

    let reply = client.get("a.txt", &harness.client_path("b.txt")).await.unwrap();
    assert!(reply.is(ResponseCode::CloseDataConnection));
    assert_eq!(std::fs::read(harness.client_path("b.txt")).unwrap(), original);

    let transcript = output(&client);
    assert!(transcript.contains("a.txt is uploaded"));
    assert!(transcript.contains("a.txt is retrieved"));
    assert!(transcript.contains("Finish data transmission [226]"));
}

#[tokio::test]
async fn test_empty_file_round_trip() {
    let harness = Harness::start(25102).await;
    std::fs::write(harness.client_path("empty.bin"), b"").unwrap();

    let mut client = harness.logged_in_client().await;
    let reply = client.put(&harness.client_path("empty.bin"), "empty.bin").await.unwrap();
    assert!(reply.is(ResponseCode::CloseDataConnection));

    let reply = client.get("empty.bin", &harness.client_path("copy.bin")).await.unwrap();
    assert!(reply.is(ResponseCode::CloseDataConnection));
    assert!(std::fs::read(harness.client_path("copy.bin")).unwrap().is_empty());
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let harness = Harness::start(25103).await;
    let mut client = harness.client().await;

    let err = client.login("user", "wrong").await.unwrap_err();
    assert!(matches!(err, MftpError::InvalidCredentials));
    assert!(output(&client).contains("Invalid credentials [430]"));
}

#[tokio::test]
async fn test_rejected_session_reads_no_more_commands() {
    let harness = Harness::start(25104).await;
    let (mut control, reply) = raw_login(harness.addr, "nobody", "pass").await;
    assert!(reply.is(ResponseCode::InvalidCredentials));

    // The server closes the connection right after answering.
    assert_eq!(read_response(&mut control).await.unwrap(), Reply::Disconnected);
}

#[tokio::test]
async fn test_upload_collision_leaves_target_untouched() {
    let harness = Harness::start(25105).await;
    std::fs::write(harness.server_path("a.txt"), b"original").unwrap();
    std::fs::write(harness.client_path("a.txt"), b"replacement").unwrap();

    let mut client = harness.logged_in_client().await;
    let reply = client.put(&harness.client_path("a.txt"), "a.txt").await.unwrap();

    assert!(reply.is(ResponseCode::BadSequence));
    assert_eq!(std::fs::read(harness.server_path("a.txt")).unwrap(), b"original");
    assert!(output(&client).contains("Operation not allowed: file with same name exists on server"));

    // The session is still usable.
    assert!(client.chdir(".").await.unwrap().is(ResponseCode::CommandOk));
}

#[tokio::test]
async fn test_download_of_missing_file() {
    let harness = Harness::start(25106).await;
    let mut client = harness.logged_in_client().await;

    let reply = client.get("missing.txt", &harness.client_path("missing.txt")).await.unwrap();
    assert!(reply.is(ResponseCode::FileUnavailable));
    assert!(!harness.client_path("missing.txt").exists());
    assert!(output(&client).contains("No such file on server [550]"));
}

#[tokio::test]
async fn test_upload_of_missing_local_file_never_reaches_server() {
    let harness = Harness::start(25107).await;
    let mut client = harness.logged_in_client().await;

    let err = client
        .put(&harness.client_path("ghost.txt"), "ghost.txt")
        .await
        .unwrap_err();
    assert!(matches!(err, MftpError::NoSuchLocalFile(_)));
    assert!(!err.is_fatal());
    assert!(!harness.server_path("ghost.txt").exists());

    assert!(client.chdir(".").await.unwrap().is(ResponseCode::CommandOk));
}

#[tokio::test]
async fn test_pwd_twice_gives_same_output() {
    let harness = Harness::start(25108).await;
    let mut client = harness.logged_in_client().await;

    let before = client.output().len();
    assert!(client.dir(FtpCommand::Pwd).await.unwrap().is(ResponseCode::OpenDataConnection));
    let first = client.output()[before..].to_vec();

    let before = client.output().len();
    client.dir(FtpCommand::Pwd).await.unwrap();
    let second = client.output()[before..].to_vec();

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_cd_changes_listing_directory() {
    let harness = Harness::start(25109).await;
    std::fs::create_dir(harness.server_path("docs")).unwrap();
    std::fs::write(harness.server_path("docs").join("readme.md"), b"hi").unwrap();

    let mut client = harness.logged_in_client().await;

    assert!(client.chdir("docs").await.unwrap().is(ResponseCode::CommandOk));
    let before = client.output().len();
    client.dir(FtpCommand::Ls).await.unwrap();
    let listing = String::from_utf8_lossy(&client.output()[before..]).into_owned();
    assert_eq!(listing, "readme.md\n");

    let reply = client.chdir("nowhere").await.unwrap();
    assert!(reply.is(ResponseCode::CommandNotImplemented));

    // Downloads resolve against the new directory.
    let reply = client.get("readme.md", &harness.client_path("readme.md")).await.unwrap();
    assert!(reply.is(ResponseCode::CloseDataConnection));
    assert_eq!(std::fs::read(harness.client_path("readme.md")).unwrap(), b"hi");
}

#[tokio::test]
async fn test_quit_then_new_connection() {
    let harness = Harness::start(25110).await;

    let mut client = harness.logged_in_client().await;
    let reply = client.quit().await.unwrap();
    assert!(reply.is(ResponseCode::ClosingControlConnection));
    assert!(output(&client).contains("Close connection [221]"));

    let mut client = harness.logged_in_client().await;
    assert!(client.chdir(".").await.unwrap().is(ResponseCode::CommandOk));
}

#[tokio::test]
async fn test_unknown_command_ends_session() {
    let harness = Harness::start(25111).await;
    let (mut control, reply) = raw_login(harness.addr, "user", "pass").await;
    assert!(reply.is(ResponseCode::LoggedIn));

    send_raw_frame(&mut control, b"RETR a.txt").await;
    assert_eq!(read_response(&mut control).await.unwrap(), Reply::Disconnected);
}

#[tokio::test]
async fn test_malformed_command_keeps_session() {
    let harness = Harness::start(25112).await;
    let (mut control, reply) = raw_login(harness.addr, "user", "pass").await;
    assert!(reply.is(ResponseCode::LoggedIn));

    send_raw_frame(&mut control, b"get").await;
    assert!(read_response(&mut control)
        .await
        .unwrap()
        .is(ResponseCode::CommandNotImplemented));

    send_raw_frame(&mut control, b"user again").await;
    assert!(read_response(&mut control).await.unwrap().is(ResponseCode::BadSequence));

    send_raw_frame(&mut control, b"quit").await;
    assert!(read_response(&mut control)
        .await
        .unwrap()
        .is(ResponseCode::ClosingControlConnection));
    assert_eq!(read_response(&mut control).await.unwrap(), Reply::Disconnected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_repeated_small_downloads_all_arrive() {
    let harness = Harness::start(25113).await;
    std::fs::write(harness.server_path("tiny.txt"), b"hi").unwrap();
    let mut client = harness.logged_in_client().await;

    for i in 0..200 {
        let local = harness.client_path(&format!("tiny-{}.txt", i));
        let reply = client.get("tiny.txt", &local).await.unwrap();
        assert!(reply.is(ResponseCode::CloseDataConnection));
        assert_eq!(std::fs::read(&local).unwrap(), b"hi", "download {} lost", i);
    }
    assert_eq!(output(&client).matches("tiny.txt is retrieved").count(), 200);
}

#[tokio::test]
async fn test_unreachable_data_port_fails_only_the_operation() {
    // The server connects to a port nobody listens on.
    let harness = Harness::start_with(25114, 25115).await;
    std::fs::write(harness.server_path("a.txt"), b"data").unwrap();
    let mut client = harness.logged_in_client().await;

    let reply = client.get("a.txt", &harness.client_path("a.txt")).await.unwrap();
    assert!(reply.is(ResponseCode::FileUnavailable));
    assert!(!harness.client_path("a.txt").exists());

    let reply = client.dir(FtpCommand::Ls).await.unwrap();
    assert!(reply.is(ResponseCode::CommandNotImplemented));

    std::fs::write(harness.client_path("up.txt"), b"data").unwrap();
    let reply = client.put(&harness.client_path("up.txt"), "up.txt").await.unwrap();
    assert!(reply.is(ResponseCode::FileUnavailable));
    assert!(!harness.server_path("up.txt").exists());

    assert!(client.chdir(".").await.unwrap().is(ResponseCode::CommandOk));
}

#[tokio::test]
async fn test_cd_to_regular_file_is_refused() {
    let harness = Harness::start(25116).await;
    std::fs::write(harness.server_path("a.txt"), b"data").unwrap();
    let mut client = harness.logged_in_client().await;

    let reply = client.chdir("a.txt").await.unwrap();
    assert!(reply.is(ResponseCode::CommandNotImplemented));

    // The working directory did not move.
    let reply = client.get("a.txt", &harness.client_path("a.txt")).await.unwrap();
    assert!(reply.is(ResponseCode::CloseDataConnection));
}

#[tokio::test]
async fn test_login_in_two_steps() {
    let harness = Harness::start(25117).await;
    let mut client = harness.client().await;

    client.send_username("user").await.unwrap();
    client.send_password("pass").await.unwrap();
    assert!(output(&client).contains("User logged in [230]"));
}

#[tokio::test]
async fn test_username_refused_stops_before_password() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (mut control, _) = listener.accept().await.unwrap();
        write_response(&mut control, ResponseCode::ServiceReady).await.unwrap();
        let user = read_command(&mut control).await.unwrap().unwrap();
        assert_eq!(user.kind(), Some(FtpCommand::User));
        write_response(&mut control, ResponseCode::CommandNotImplemented)
            .await
            .unwrap();
        // Nothing else arrives before the client hangs up.
        read_command(&mut control).await.unwrap()
    });

    let config = ClientConfig {
        data_port: 25118,
        buffer_size: MAX_BUF_SIZE,
    };
    let mut client = FtpClient::connect(addr, config, Vec::new()).await.unwrap();
    let err = client.send_username("user").await.unwrap_err();
    assert!(matches!(
        err,
        MftpError::UnexpectedReply(Reply::Code(ResponseCode::CommandNotImplemented))
    ));
    drop(client);

    assert_eq!(server.await.unwrap(), None);
}
