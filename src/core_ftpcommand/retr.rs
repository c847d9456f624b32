use crate::config::Config;
use crate::core_error::error::{FtpError, FtpResult};
use crate::core_ftpcommand::utils::{file_name, resolve_fs_path};
use crate::core_network::handlers::{open_data_stream, relay_and_complete};
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use log::{error, info};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::BufReader;
use tokio::sync::Mutex;

/// Handles the RETR (Retrieve) FTP command.
///
/// A missing file is answered with 550 before the data connection is
/// touched. Otherwise the data connection is opened, 150 is sent, the file
/// is streamed and 226 follows once the last byte is written.
pub async fn handle_retr_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> FtpResult<()> {
    let file_path = {
        let session = session.lock().await;
        resolve_fs_path(&session.base_path, &session.current_dir, &arg)
    }
    .filter(|path| path.is_file())
    .ok_or_else(|| FtpError::FileNotFound(arg.clone()))?;

    let file = File::open(&file_path).await.map_err(|e| {
        error!("File could not be opened: {:?}, error: {}", file_path, e);
        FtpError::FileNotFound(arg.clone())
    })?;

    let mut stream = open_data_stream(&session, config.server.data_timeout()).await?;

    send_reply(
        &writer,
        150,
        format!("Opening BINARY mode data connection for {}.", file_name(&arg)),
    )
    .await?;
    info!("Sending file: {:?}", file_path);

    let mut reader = BufReader::with_capacity(config.server.download_buffer_size, file);
    relay_and_complete(&writer, &mut reader, &mut stream).await
}
