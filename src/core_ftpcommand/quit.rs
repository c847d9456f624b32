use crate::config::Config;
use crate::core_error::error::{FtpError, FtpResult};
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the QUIT FTP command.
///
/// Says goodbye and returns `FtpError::ExitRequested`, which ends the
/// session loop and closes the control connection.
pub async fn handle_quit_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    _session: Arc<Mutex<Session>>,
    _arg: String,
) -> FtpResult<()> {
    info!("Received QUIT command. Closing connection.");
    send_reply(&writer, 221, "Goodbye.").await?;
    Err(FtpError::ExitRequested)
}
