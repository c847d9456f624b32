use crate::core_auth::AuthHandle;
use crate::core_error::error::{FtpError, FtpResult};
use crate::core_network::data::{ConnectionMode, DataConnection};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Per control connection state. Owned by the task serving that connection.
#[derive(Debug)]
pub struct Session {
    pub is_authenticated: bool,
    pub username: Option<String>,
    /// Slash rooted logical path, never above `/`.
    pub current_dir: String,
    /// Canonical root directory; `current_dir` is resolved below it.
    pub base_path: PathBuf,
    pub mode: ConnectionMode,
    pub data_connection: Option<DataConnection>,
    /// Local address of the control connection, advertised by PASV.
    pub local_ip: IpAddr,
    pub auth: AuthHandle,
}

impl Session {
    pub fn new(base_path: PathBuf, auth: AuthHandle) -> Self {
        Self {
            is_authenticated: false,
            username: None,
            current_dir: String::from("/"),
            base_path,
            mode: ConnectionMode::Unset,
            data_connection: None,
            local_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            auth,
        }
    }

    pub fn with_local_ip(mut self, local_ip: IpAddr) -> Self {
        self.local_ip = local_ip;
        self
    }

    /// Replaces any pending data connection; an unaccepted PASV listener is
    /// closed when dropped here.
    pub fn set_data_connection(&mut self, data: DataConnection) {
        self.mode = data.mode();
        self.data_connection = Some(data);
    }

    /// Hands the pending data connection to a single transfer.
    pub fn take_data_connection(&mut self) -> FtpResult<DataConnection> {
        let data = self
            .data_connection
            .take()
            .ok_or(FtpError::UnknownConnectionMode)?;
        self.mode = ConnectionMode::Unset;
        Ok(data)
    }
}
