use crate::config::Config;
use crate::core_error::error::{FtpError, FtpResult};
use crate::core_ftpcommand::utils::{construct_path, is_within_root, resolve_path};
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the CWD FTP command.
///
/// The target must be an existing directory below the root. On failure the
/// current directory is left untouched.
pub async fn handle_cwd_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> FtpResult<()> {
    {
        let mut session = session.lock().await;
        let new_dir = resolve_path(&session.current_dir, &arg)
            .ok_or_else(|| FtpError::InvalidPath(arg.clone()))?;
        let dir_path = construct_path(&session.base_path, &new_dir);

        if !dir_path.is_dir() || !is_within_root(&session.base_path, &dir_path) {
            warn!("CWD to invalid directory: {:?}", dir_path);
            return Err(FtpError::InvalidPath(arg));
        }

        debug!("CWD {} -> {}", session.current_dir, new_dir);
        session.current_dir = new_dir;
    }

    send_reply(&writer, 250, "CWD command successful.").await?;
    Ok(())
}
