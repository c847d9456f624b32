use std::fmt;

/// The FTP verbs understood by both the server and the client engine.
#[derive(Eq, Hash, PartialEq, Debug, Clone, Copy)]
pub enum FtpCommand {
    USER,
    PASS,
    PWD,
    CWD,
    LIST,
    RETR,
    STOR,
    DELE,
    PASV,
    EPSV,
    PORT,
    TYPE,
    QUIT,
}

/// Whether a verb takes an argument.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ArgumentRule {
    Required,
    Optional,
    None,
}

impl FtpCommand {
    pub const ALL: [FtpCommand; 13] = [
        FtpCommand::USER,
        FtpCommand::PASS,
        FtpCommand::PWD,
        FtpCommand::CWD,
        FtpCommand::LIST,
        FtpCommand::RETR,
        FtpCommand::STOR,
        FtpCommand::DELE,
        FtpCommand::PASV,
        FtpCommand::EPSV,
        FtpCommand::PORT,
        FtpCommand::TYPE,
        FtpCommand::QUIT,
    ];

    /// Matches a verb exactly; `user` is not `USER`.
    pub fn from_str(cmd: &str) -> Option<FtpCommand> {
        match cmd {
            "USER" => Some(FtpCommand::USER),
            "PASS" => Some(FtpCommand::PASS),
            "PWD" => Some(FtpCommand::PWD),
            "CWD" => Some(FtpCommand::CWD),
            "LIST" => Some(FtpCommand::LIST),
            "RETR" => Some(FtpCommand::RETR),
            "STOR" => Some(FtpCommand::STOR),
            "DELE" => Some(FtpCommand::DELE),
            "PASV" => Some(FtpCommand::PASV),
            "EPSV" => Some(FtpCommand::EPSV),
            "PORT" => Some(FtpCommand::PORT),
            "TYPE" => Some(FtpCommand::TYPE),
            "QUIT" => Some(FtpCommand::QUIT),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FtpCommand::USER => "USER",
            FtpCommand::PASS => "PASS",
            FtpCommand::PWD => "PWD",
            FtpCommand::CWD => "CWD",
            FtpCommand::LIST => "LIST",
            FtpCommand::RETR => "RETR",
            FtpCommand::STOR => "STOR",
            FtpCommand::DELE => "DELE",
            FtpCommand::PASV => "PASV",
            FtpCommand::EPSV => "EPSV",
            FtpCommand::PORT => "PORT",
            FtpCommand::TYPE => "TYPE",
            FtpCommand::QUIT => "QUIT",
        }
    }

    pub fn argument_rule(&self) -> ArgumentRule {
        match self {
            FtpCommand::USER
            | FtpCommand::PASS
            | FtpCommand::CWD
            | FtpCommand::RETR
            | FtpCommand::STOR
            | FtpCommand::DELE
            | FtpCommand::PORT
            | FtpCommand::TYPE => ArgumentRule::Required,
            FtpCommand::LIST => ArgumentRule::Optional,
            FtpCommand::PWD | FtpCommand::PASV | FtpCommand::EPSV | FtpCommand::QUIT => {
                ArgumentRule::None
            }
        }
    }

    /// Commands that move bytes over a data connection.
    pub fn is_data_command(&self) -> bool {
        matches!(self, FtpCommand::LIST | FtpCommand::RETR | FtpCommand::STOR)
    }

    /// Commands accepted before the session has logged in.
    pub fn allowed_before_login(&self) -> bool {
        matches!(self, FtpCommand::USER | FtpCommand::PASS | FtpCommand::QUIT)
    }
}

impl fmt::Display for FtpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scanned control line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: FtpCommand,
    pub argument: Option<String>,
}

impl Command {
    pub fn new(kind: FtpCommand) -> Self {
        Self {
            kind,
            argument: None,
        }
    }

    pub fn with_argument(kind: FtpCommand, argument: impl Into<String>) -> Self {
        Self {
            kind,
            argument: Some(argument.into()),
        }
    }

    pub fn arg(&self) -> &str {
        self.argument.as_deref().unwrap_or_default()
    }

    /// Wire form without the line terminator.
    pub fn to_line(&self) -> String {
        match &self.argument {
            Some(arg) => format!("{} {}", self.kind, arg),
            None => self.kind.to_string(),
        }
    }
}
