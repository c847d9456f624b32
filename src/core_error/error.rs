use crate::core_ftpcommand::ftpcommand::FtpCommand;
use thiserror::Error;

pub type FtpResult<T> = Result<T, FtpError>;

#[derive(Error, Debug)]
pub enum FtpError {
    #[error("No command")]
    NoCommand,

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Command line longer than {0} bytes")]
    CommandTooLong(usize),

    #[error("No argument for command {0}")]
    NoArgument(FtpCommand),

    #[error("Command: {0} not implemented")]
    NotImplemented(FtpCommand),

    #[error("Good Bye")]
    ExitRequested,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid addr format: {0}")]
    InvalidAddressFormat(String),

    #[error("Authentication failed for user {0}")]
    AuthenticationFailed(String),

    #[error("No connection mode specified, use PORT or PASV first")]
    UnknownConnectionMode,

    #[error("Timed out waiting for the data connection")]
    DataConnectionTimeout,

    #[error("Can't open data connection: {0}")]
    DataConnectionFailed(String),

    #[error("Local error: {0}")]
    LocalError(String),

    #[error("Server connection closed")]
    ConnectionClosed,

    #[error("Invalid reply: {0}")]
    InvalidReply(String),

    #[error("Expected status code {expected} but received status {received}")]
    UnexpectedStatus { expected: u16, received: u16 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl FtpError {
    /// The control reply the server sends for this error.
    pub fn to_ftp_response(&self) -> String {
        match self {
            FtpError::InvalidCommand(verb) => format!("500 '{}': command not understood.", verb),
            FtpError::CommandTooLong(_) => "500 Command line too long.".to_string(),
            FtpError::NoArgument(cmd) => format!("501 No argument for command {}.", cmd),
            FtpError::NotImplemented(cmd) => format!("500 '{}': command not implemented.", cmd),
            FtpError::ExitRequested => "221 Goodbye.".to_string(),
            FtpError::FileNotFound(_) => "550 File not found.".to_string(),
            FtpError::InvalidPath(_) => "550 Invalid path.".to_string(),
            FtpError::InvalidAddressFormat(_) => {
                "501 Syntax error in parameters or arguments.".to_string()
            }
            FtpError::AuthenticationFailed(_) => "530 Login failed.".to_string(),
            FtpError::UnknownConnectionMode => {
                "425 No connection mode specified, use PORT or PASV first.".to_string()
            }
            FtpError::DataConnectionTimeout | FtpError::DataConnectionFailed(_) => {
                "425 Can't open data connection.".to_string()
            }
            _ => "451 Requested action aborted. Local error in processing.".to_string(),
        }
    }

    /// Errors raised while scanning a line. The line is answered and
    /// reading goes on.
    pub fn is_scanner_error(&self) -> bool {
        matches!(
            self,
            FtpError::InvalidCommand(_) | FtpError::CommandTooLong(_) | FtpError::NoArgument(_)
        )
    }

    /// Errors that end the control connection instead of a single command.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FtpError::NoCommand
                | FtpError::ExitRequested
                | FtpError::ConnectionClosed
                | FtpError::Io(_)
        )
    }
}
