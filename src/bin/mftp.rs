use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use mftp::config::ClientConfig;
use mftp::core_cli::ClientCli;
use mftp::core_client::prompt::{read_line, read_password};
use mftp::core_client::{parse_input, FtpClient};
use mftp::core_log::logger::init_logger;
use std::io;
use std::ops::ControlFlow;

#[tokio::main]
async fn main() -> Result<()> {
    let args = ClientCli::parse();

    init_logger("warn", args.verbose);

    let config = ClientConfig {
        data_port: args.data_port,
        buffer_size: args.buffer_size,
    };

    let addr = (args.server.as_str(), args.port);
    let mut client = FtpClient::connect(addr, config, io::stdout())
        .await
        .with_context(|| format!("Failed to connect to {}:{}", args.server, args.port))?;
    println!("{} connected", args.server);

    let username = read_line("username: ")?.unwrap_or_default();
    client.send_username(&username).await?;
    let password = read_password("password: ")?;
    client.send_password(&password).await?;

    loop {
        let operator = match read_line("mftp> ")? {
            Some(line) => match parse_input(&line) {
                Ok(operator) => operator,
                Err(e) => {
                    debug!("{}", e);
                    println!("Invalid command");
                    continue;
                }
            },
            // stdin closed: leave the session cleanly
            None => {
                client.quit().await?;
                break;
            }
        };

        match client.execute(operator).await {
            Ok(ControlFlow::Break(())) => break,
            Ok(ControlFlow::Continue(())) => {}
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => eprintln!("{}", e),
        }
    }

    Ok(())
}
