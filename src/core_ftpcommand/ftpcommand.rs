use std::fmt;

/// The command names understood on the control connection.
#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    User,
    Pass,
    Put,
    Get,
    Ls,
    Pwd,
    Cd,
    Quit,
}

impl FtpCommand {
    /// Looks up a command by its wire name. Names are case-sensitive.
    pub fn from_name(cmd: &str) -> Option<FtpCommand> {
        match cmd {
            "user" => Some(FtpCommand::User),
            "pass" => Some(FtpCommand::Pass),
            "put" => Some(FtpCommand::Put),
            "get" => Some(FtpCommand::Get),
            "ls" => Some(FtpCommand::Ls),
            "pwd" => Some(FtpCommand::Pwd),
            "cd" => Some(FtpCommand::Cd),
            "quit" => Some(FtpCommand::Quit),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FtpCommand::User => "user",
            FtpCommand::Pass => "pass",
            FtpCommand::Put => "put",
            FtpCommand::Get => "get",
            FtpCommand::Ls => "ls",
            FtpCommand::Pwd => "pwd",
            FtpCommand::Cd => "cd",
            FtpCommand::Quit => "quit",
        }
    }

    pub fn requires_argument(&self) -> bool {
        matches!(
            self,
            FtpCommand::User | FtpCommand::Pass | FtpCommand::Put | FtpCommand::Get | FtpCommand::Cd
        )
    }

    /// Whether `argument` satisfies this command's arity.
    pub fn accepts(&self, argument: Option<&str>) -> bool {
        self.requires_argument() == argument.is_some()
    }
}

impl fmt::Display for FtpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
