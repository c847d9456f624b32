use crate::core_error::error::{FtpError, FtpResult};
use log::debug;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

/// How the data connection for the next transfer is obtained.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ConnectionMode {
    #[default]
    Unset,
    /// The server connects out to the address given by PORT.
    Active,
    /// The client connects in to the listener opened by PASV/EPSV.
    Passive,
}

/// The pending data connection of a session, consumed by exactly one
/// LIST/RETR/STOR.
#[derive(Debug)]
pub enum DataConnection {
    /// Bound by PASV/EPSV, not accepted yet.
    Passive(TcpListener),
    /// Recorded by PORT, dialed when the transfer starts.
    Active(SocketAddr),
}

impl DataConnection {
    pub fn mode(&self) -> ConnectionMode {
        match self {
            DataConnection::Passive(_) => ConnectionMode::Passive,
            DataConnection::Active(_) => ConnectionMode::Active,
        }
    }

    /// Accepts or dials the stream, giving up after `limit`.
    pub async fn open(self, limit: Duration) -> FtpResult<TcpStream> {
        let stream = match self {
            DataConnection::Passive(listener) => {
                let (stream, peer) = timeout(limit, listener.accept())
                    .await
                    .map_err(|_| FtpError::DataConnectionTimeout)??;
                debug!("Accepted data connection from: {}", peer);
                stream
            }
            DataConnection::Active(addr) => {
                let stream = timeout(limit, TcpStream::connect(addr))
                    .await
                    .map_err(|_| FtpError::DataConnectionTimeout)??;
                debug!("Data connection established with {}", addr);
                stream
            }
        };
        Ok(stream)
    }
}
