use crate::config::Config;
use crate::core_error::error::{FtpError, FtpResult};
use crate::core_ftpcommand::utils::resolve_fs_path;
use crate::core_network::handlers::{open_data_stream, relay_and_complete};
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use log::{debug, error};
use std::path::Path;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::Mutex;

/// Handles the LIST FTP command.
///
/// Sends the `ls -l` output for the current directory, or for the optional
/// path argument, over the data connection. Arguments starting with `-` are
/// client options and are ignored.
pub async fn handle_list_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> FtpResult<()> {
    let target = if arg.is_empty() || arg.starts_with('-') {
        "."
    } else {
        arg.as_str()
    };

    let path = {
        let session = session.lock().await;
        resolve_fs_path(&session.base_path, &session.current_dir, target)
    }
    .filter(|path| path.exists())
    .ok_or_else(|| FtpError::FileNotFound(target.to_string()))?;

    let listing = list_directory(&path).await?;
    let mut stream = open_data_stream(&session, config.server.data_timeout()).await?;

    send_reply(&writer, 150, "Opening ASCII mode data connection for file list.").await?;
    let mut source = listing.as_slice();
    relay_and_complete(&writer, &mut source, &mut stream).await
}

/// Runs the external listing utility against `path`.
pub async fn list_directory(path: &Path) -> FtpResult<Vec<u8>> {
    debug!("Listing {:?}", path);
    let output = Command::new("ls")
        .arg("-l")
        .arg(path)
        .output()
        .await
        .map_err(|e| {
            error!("Failed to run ls: {}", e);
            FtpError::LocalError(e.to_string())
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("ls -l {:?} failed: {}", path, stderr.trim());
        return Err(FtpError::LocalError(stderr.trim().to_string()));
    }
    Ok(output.stdout)
}
