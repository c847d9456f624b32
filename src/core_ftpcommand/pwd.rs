use crate::config::Config;
use crate::core_error::error::FtpResult;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_pwd_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> FtpResult<()> {
    let current_dir = session.lock().await.current_dir.clone();
    send_reply(&writer, 257, format!("\"{}\" is current directory.", current_dir)).await?;
    Ok(())
}
