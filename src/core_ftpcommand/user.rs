use crate::config::Config;
use crate::core_error::error::FtpResult;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use log::info;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the USER FTP command.
///
/// Records the user name for the following PASS and asks for the password.
/// A new USER always drops a previous login, so the session stays
/// unauthenticated until PASS succeeds again.
pub async fn handle_user_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    username: String,
) -> FtpResult<()> {
    info!("Received USER command with username: {}", username);

    {
        let mut session = session.lock().await;
        session.username = Some(username.clone());
        session.is_authenticated = false;
    }

    send_reply(&writer, 331, format!("Password required for {}.", username)).await?;
    Ok(())
}
