use crate::reply::Reply;
use log::trace;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Write side of a control connection, shared between the session loop and
/// the command handlers.
pub type ControlWriter = Arc<Mutex<Box<dyn AsyncWrite + Send + Unpin>>>;

pub fn control_writer<W>(writer: W) -> ControlWriter
where
    W: AsyncWrite + Send + Unpin + 'static,
{
    Arc::new(Mutex::new(Box::new(writer)))
}

/// Sends a response to the client.
pub async fn send_response(writer: &ControlWriter, message: &[u8]) -> Result<(), std::io::Error> {
    let mut writer = writer.lock().await;
    writer.write_all(message).await?;
    writer.flush().await?;
    Ok(())
}

/// Sends `CODE TEXT\r\n`.
pub async fn send_reply(
    writer: &ControlWriter,
    code: u16,
    text: impl Into<String>,
) -> Result<(), std::io::Error> {
    let reply = Reply::new(code, text);
    trace!(">>> {}", reply);
    send_response(writer, reply.to_line().as_bytes()).await
}

/// Sends a multi-line reply: every line but the last uses `CODE-`.
pub async fn send_multiline_reply(
    writer: &ControlWriter,
    code: u16,
    lines: &[&str],
    last: &str,
) -> Result<(), std::io::Error> {
    let mut message = String::new();
    for line in lines {
        message.push_str(&format!("{}-{}\r\n", code, line));
    }
    message.push_str(&Reply::new(code, last).to_line());
    send_response(writer, message.as_bytes()).await
}
