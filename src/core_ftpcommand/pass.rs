use crate::config::Config;
use crate::core_error::error::{FtpError, FtpResult};
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the PASS FTP command.
///
/// The credential check is delegated to the authentication worker; this
/// task only waits for its answer. A failed attempt may be retried with
/// another USER/PASS pair.
pub async fn handle_pass_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    password: String,
) -> FtpResult<()> {
    let (username, auth) = {
        let session = session.lock().await;
        (session.username.clone().unwrap_or_default(), session.auth.clone())
    };

    if !auth.authenticate(&username, &password).await {
        warn!("Login failed for user: {}", username);
        return Err(FtpError::AuthenticationFailed(username));
    }

    session.lock().await.is_authenticated = true;
    info!("User logged in: {}", username);
    send_reply(&writer, 230, "User logged in.").await?;
    Ok(())
}
