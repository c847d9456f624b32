use crate::config::Config;
use crate::core_error::error::{FtpError, FtpResult};
use crate::core_ftpcommand::utils::{file_name, resolve_fs_path};
use crate::core_network::handlers::{open_data_stream, relay_and_complete};
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use log::{error, info};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::BufWriter;
use tokio::sync::Mutex;

/// Handles the STOR (Store File) FTP command.
///
/// The target is created or truncated inside the root; its parent directory
/// has to exist already.
pub async fn handle_stor_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> FtpResult<()> {
    let file_path = {
        let session = session.lock().await;
        resolve_fs_path(&session.base_path, &session.current_dir, &arg)
    }
    .filter(|path| !path.is_dir())
    .ok_or_else(|| FtpError::InvalidPath(arg.clone()))?;

    let mut stream = open_data_stream(&session, config.server.data_timeout()).await?;

    let file = File::create(&file_path).await.map_err(|e| {
        error!("Failed to create file: {:?}, error: {}", file_path, e);
        FtpError::LocalError(e.to_string())
    })?;

    send_reply(
        &writer,
        150,
        format!("Opening BINARY mode data connection for {}.", file_name(&arg)),
    )
    .await?;

    let mut file = BufWriter::with_capacity(config.server.upload_buffer_size, file);
    relay_and_complete(&writer, &mut stream, &mut file).await?;
    info!("File stored: {:?}", file_path);
    Ok(())
}
