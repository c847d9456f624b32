use crate::core_error::error::{FtpError, FtpResult};
use crate::core_ftpcommand::ftpcommand::{ArgumentRule, Command, FtpCommand};
use log::{trace, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// Longest accepted control line, line ending included.
pub const MAX_COMMAND_LENGTH: usize = 512;

/// Reads control lines and turns them into commands.
///
/// Used by the server on the control connection and by the client on its
/// command script or stdin. Lines are read as bytes and decoded lossily, so
/// a non UTF-8 path still reaches the command handler.
pub struct CommandScanner<R> {
    input: R,
    line: Vec<u8>,
    max_length: usize,
}

impl<R: AsyncBufRead + Unpin> CommandScanner<R> {
    pub fn new(input: R) -> Self {
        Self {
            input,
            line: Vec::new(),
            max_length: MAX_COMMAND_LENGTH,
        }
    }

    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length.max(1);
        self
    }

    /// Returns the next command. Blank lines are skipped and end of input
    /// yields `FtpError::NoCommand`. A line longer than the limit is
    /// consumed and reported as `FtpError::CommandTooLong`.
    pub async fn next_command(&mut self) -> FtpResult<Command> {
        loop {
            self.line.clear();
            let n = (&mut self.input)
                .take(self.max_length as u64)
                .read_until(b'\n', &mut self.line)
                .await?;
            if n == 0 {
                return Err(FtpError::NoCommand);
            }
            if !self.line.ends_with(b"\n") && n == self.max_length {
                self.skip_rest_of_line().await?;
                warn!("Dropped control line longer than {} bytes", self.max_length);
                return Err(FtpError::CommandTooLong(self.max_length));
            }

            let line = String::from_utf8_lossy(&self.line);
            trace!("Scanned line: {:?}", line);
            if line.trim().is_empty() {
                continue;
            }
            return parse_line(&line);
        }
    }

    /// Throws away input up to and including the next newline, holding at
    /// most one limit's worth of bytes at a time.
    async fn skip_rest_of_line(&mut self) -> FtpResult<()> {
        loop {
            self.line.clear();
            let n = (&mut self.input)
                .take(self.max_length as u64)
                .read_until(b'\n', &mut self.line)
                .await?;
            if n == 0 || self.line.ends_with(b"\n") {
                return Ok(());
            }
        }
    }
}

/// Splits a line on its first whitespace run into verb and argument.
pub fn parse_line(line: &str) -> FtpResult<Command> {
    let line = line.trim_end_matches(['\r', '\n']).trim_start();
    if line.is_empty() {
        return Err(FtpError::NoCommand);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim_start()),
        None => (line, ""),
    };

    let kind = FtpCommand::from_str(verb)
        .ok_or_else(|| FtpError::InvalidCommand(verb.to_string()))?;

    match kind.argument_rule() {
        ArgumentRule::None => Ok(Command::new(kind)),
        ArgumentRule::Optional if rest.is_empty() => Ok(Command::new(kind)),
        ArgumentRule::Optional => Ok(Command::with_argument(kind, rest)),
        ArgumentRule::Required => {
            // A bare verb as argument means the real argument was left out.
            if rest.is_empty() || FtpCommand::from_str(rest).is_some() {
                return Err(FtpError::NoArgument(kind));
            }
            Ok(Command::with_argument(kind, rest))
        }
    }
}
