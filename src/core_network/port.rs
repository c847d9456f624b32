use crate::config::Config;
use crate::core_error::error::{FtpError, FtpResult};
use crate::core_network::address;
use crate::core_network::data::DataConnection;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handles the PORT (Active Mode) FTP command.
///
/// Only records the client's address; the connection is dialed when the
/// next LIST/RETR/STOR needs it. A pending PASV listener is closed.
pub async fn handle_port_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    arg: String,
) -> FtpResult<()> {
    let decoded = address::decode(&arg)?;
    let addr: SocketAddr = decoded
        .parse()
        .map_err(|_| FtpError::InvalidAddressFormat(arg.clone()))?;

    info!("Received PORT command with address: {}", addr);
    session
        .lock()
        .await
        .set_data_connection(DataConnection::Active(addr));

    send_reply(&writer, 200, "PORT command successful.").await?;
    Ok(())
}
