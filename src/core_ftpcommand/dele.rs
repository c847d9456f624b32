use crate::config::Config;
use crate::core_error::error::{FtpError, FtpResult};
use crate::core_ftpcommand::utils::resolve_fs_path;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use log::{error, info};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

/// Handles the DELE (Delete File) FTP command.
///
/// Only regular files inside the root can be removed; anything else is
/// reported as not found.
pub async fn handle_dele_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> FtpResult<()> {
    let file_path = {
        let session = session.lock().await;
        resolve_fs_path(&session.base_path, &session.current_dir, &arg)
    }
    .filter(|path| path.is_file())
    .ok_or_else(|| FtpError::FileNotFound(arg.clone()))?;

    if let Err(e) = fs::remove_file(&file_path).await {
        error!("Failed to delete {:?}: {}", file_path, e);
        return Err(FtpError::LocalError(e.to_string()));
    }

    info!("Deleted file: {:?}", file_path);
    send_reply(&writer, 200, "DELE command successful.").await?;
    Ok(())
}
