use crate::core_error::error::{FtpError, FtpResult};
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use log::{debug, error};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

/// Takes the session's pending data connection and opens it.
///
/// The connection is consumed even when opening fails, so every transfer
/// needs its own PASV/EPSV/PORT.
pub async fn open_data_stream(
    session: &Arc<Mutex<Session>>,
    limit: Duration,
) -> FtpResult<TcpStream> {
    let data = session.lock().await.take_data_connection()?;
    data.open(limit).await.map_err(|e| match e {
        FtpError::Io(e) => FtpError::DataConnectionFailed(e.to_string()),
        other => other,
    })
}

/// Copies `source` into `sink`, then closes the write side of `sink`.
///
/// The control reply is sent here: 226 once every byte went through, 426
/// when the copy broke off. Only a failed control write is returned as an
/// error.
pub async fn relay_and_complete<R, W>(
    writer: &ControlWriter,
    source: &mut R,
    sink: &mut W,
) -> FtpResult<()>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let copied = async {
        let n = tokio::io::copy(source, sink).await?;
        sink.shutdown().await?;
        Ok::<u64, std::io::Error>(n)
    }
    .await;

    match copied {
        Ok(n) => {
            debug!("Transferred {} bytes", n);
            send_reply(writer, 226, "Transfer complete.").await?;
        }
        Err(e) => {
            error!("Data transfer aborted: {}", e);
            send_reply(writer, 426, "Connection closed; transfer aborted.").await?;
        }
    }
    Ok(())
}
