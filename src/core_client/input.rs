use crate::core_error::{MftpError, Result};
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_wire::Command;

/// Commands prefixed with `!` that run on the client machine only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalCommand {
    Ls,
    Pwd,
    Cd(String),
}

/// One validated line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operator {
    Remote(Command),
    Local(LocalCommand),
}

/// Parses and validates an operator line. Anything rejected here never
/// reaches the control connection.
pub fn parse_input(line: &str) -> Result<Operator> {
    let line = line.trim();
    let (name, argument) = match line.find(char::is_whitespace) {
        Some(split) => (&line[..split], Some(line[split..].trim_start().to_string())),
        None => (line, None),
    };

    if let Some(local) = name.strip_prefix('!') {
        return match (local, argument) {
            ("ls", None) => Ok(Operator::Local(LocalCommand::Ls)),
            ("pwd", None) => Ok(Operator::Local(LocalCommand::Pwd)),
            ("cd", Some(dir)) => Ok(Operator::Local(LocalCommand::Cd(dir))),
            _ => Err(MftpError::InvalidCommand(line.to_string())),
        };
    }

    match FtpCommand::from_name(name) {
        // Credentials are only sent by the login sequence.
        Some(FtpCommand::User) | Some(FtpCommand::Pass) | None => {
            Err(MftpError::InvalidCommand(line.to_string()))
        }
        Some(kind) => Ok(Operator::Remote(Command::new(kind, argument)?)),
    }
}
