use crate::config::Config;
use crate::core_error::error::{FtpError, FtpResult};
use crate::core_network::address;
use crate::core_network::data::DataConnection;
use crate::helpers::{send_reply, ControlWriter};
use crate::session::Session;
use log::{debug, error};
use std::net::IpAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// Handles the PASV FTP command.
///
/// Binds a fresh listener next to the control connection and advertises it
/// in the six-number form. Any earlier unaccepted listener is dropped.
pub async fn handle_pasv_command(
    writer: ControlWriter,
    config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> FtpResult<()> {
    let local_ip = session.lock().await.local_ip;
    let (listener, port) = setup_pasv_listener(local_ip).await?;

    let host = match &config.server.pasv_address {
        Some(pasv_address) => pasv_address.clone(),
        None => advertised_host(local_ip),
    };
    let encoded = address::encode(&host, &port.to_string())?;

    session
        .lock()
        .await
        .set_data_connection(DataConnection::Passive(listener));

    let response = format!("Entering Passive Mode ({}).", encoded);
    debug!("PASV response sent to client: {}", response);
    send_reply(&writer, 227, response).await?;
    Ok(())
}

/// Handles the EPSV FTP command: like PASV, but only the port is announced.
pub async fn handle_epsv_command(
    writer: ControlWriter,
    _config: Arc<Config>,
    session: Arc<Mutex<Session>>,
    _arg: String,
) -> FtpResult<()> {
    let local_ip = session.lock().await.local_ip;
    let (listener, port) = setup_pasv_listener(local_ip).await?;

    session
        .lock()
        .await
        .set_data_connection(DataConnection::Passive(listener));

    send_reply(
        &writer,
        229,
        format!("Entering Extended Passive Mode (|||{}|).", port),
    )
    .await?;
    Ok(())
}

/// Binds a passive mode listener on an ephemeral port of `ip`.
pub async fn setup_pasv_listener(ip: IpAddr) -> FtpResult<(TcpListener, u16)> {
    let bound = async {
        let listener = TcpListener::bind((ip, 0)).await?;
        let port = listener.local_addr()?.port();
        Ok::<_, std::io::Error>((listener, port))
    }
    .await;

    match bound {
        Ok((listener, port)) => {
            debug!("PASV listener set up on IP: {}, Port: {}", ip, port);
            Ok((listener, port))
        }
        Err(e) => {
            error!("Failed to bind passive listener on {}: {}", ip, e);
            Err(FtpError::DataConnectionFailed(e.to_string()))
        }
    }
}

/// The IPv4 text for a PASV reply. Hosts without an IPv4 form become the
/// wildcard.
fn advertised_host(ip: IpAddr) -> String {
    match ip {
        IpAddr::V4(v4) => v4.to_string(),
        IpAddr::V6(v6) => v6
            .to_ipv4_mapped()
            .map(|v4| v4.to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_advertised_host() {
        assert_eq!(advertised_host(IpAddr::V4(Ipv4Addr::LOCALHOST)), "127.0.0.1");
        assert_eq!(
            advertised_host(IpAddr::V6(Ipv4Addr::new(10, 0, 0, 7).to_ipv6_mapped())),
            "10.0.0.7"
        );
        assert_eq!(advertised_host(IpAddr::V6(Ipv6Addr::LOCALHOST)), "");
    }

    #[tokio::test]
    async fn test_setup_pasv_listener() {
        let (listener, port) = setup_pasv_listener(IpAddr::V4(Ipv4Addr::LOCALHOST))
            .await
            .unwrap();
        assert_ne!(port, 0);
        assert_eq!(listener.local_addr().unwrap().port(), port);
    }
}
