use crate::core_error::error::{FtpError, FtpResult};
use log::trace;
use std::fmt;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// A status line on the control connection: `CODE TEXT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: u16,
    pub text: String,
}

impl Reply {
    pub fn new(code: u16, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
        }
    }

    /// Parses a single `CODE TEXT` or `CODE-TEXT` line.
    pub fn parse(line: &str) -> FtpResult<Reply> {
        let line = line.trim_end_matches(['\r', '\n']);
        let code = line
            .get(..3)
            .and_then(|c| c.parse::<u16>().ok())
            .filter(|c| (100..600).contains(c))
            .ok_or_else(|| FtpError::InvalidReply(line.to_string()))?;
        let text = match line.as_bytes().get(3) {
            None => "",
            Some(b' ') | Some(b'-') => &line[4..],
            Some(_) => return Err(FtpError::InvalidReply(line.to_string())),
        };
        Ok(Reply::new(code, text))
    }

    /// Reads one complete reply, folding `CODE-` continuation lines into the
    /// text of the final `CODE ` line.
    pub async fn read<R: AsyncBufRead + Unpin>(reader: &mut R) -> FtpResult<Reply> {
        let first = read_line(reader).await?;
        let mut reply = Reply::parse(&first)?;
        if first.as_bytes().get(3) != Some(&b'-') {
            trace!("<<< {}", reply);
            return Ok(reply);
        }

        let terminator = format!("{} ", reply.code);
        loop {
            let next = read_line(reader).await?;
            let next = next.trim_end_matches(['\r', '\n']);
            if let Some(text) = next.strip_prefix(&terminator) {
                reply.text.push('\n');
                reply.text.push_str(text);
                break;
            }
            reply.text.push('\n');
            reply.text.push_str(
                next.strip_prefix(&format!("{}-", reply.code))
                    .unwrap_or(next),
            );
        }
        trace!("<<< {}", reply);
        Ok(reply)
    }

    pub fn is_positive_preliminary(&self) -> bool {
        (100..200).contains(&self.code)
    }

    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// Wire form including CRLF.
    pub fn to_line(&self) -> String {
        format!("{} {}\r\n", self.code, self.text)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.text)
    }
}

async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> FtpResult<String> {
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Err(FtpError::ConnectionClosed);
    }
    Ok(line)
}
