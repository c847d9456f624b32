use crate::config::Config;
use crate::core_auth::AuthHandle;
use crate::core_error::error::{FtpError, FtpResult};
use crate::core_ftpcommand::handlers::{dispatch, CommandHandlers};
use crate::core_ftpcommand::scanner::CommandScanner;
use crate::helpers::{
    control_writer, send_multiline_reply, send_reply, send_response, ControlWriter,
};
use crate::session::Session;
use log::{error, info, warn};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{watch, Mutex};

/// Everything a session task needs from the server.
#[derive(Clone)]
pub struct ServerContext {
    pub config: Arc<Config>,
    pub base_path: PathBuf,
    pub auth: AuthHandle,
    pub handlers: Arc<CommandHandlers>,
}

/// Accepts control connections until `shutdown` flips to true, spawning one
/// session task per connection.
pub async fn start_server(
    listener: TcpListener,
    context: ServerContext,
    mut shutdown: watch::Receiver<bool>,
) -> FtpResult<()> {
    info!("Server listening on {}", listener.local_addr()?);

    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            accepted = listener.accept() => {
                let (socket, addr) = match accepted {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!("Failed to accept connection: {}", e);
                        continue;
                    }
                };
                info!("New connection from {}", addr);

                let context = context.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(socket, addr, context).await {
                        error!("Connection error for {}: {}", addr, e);
                    }
                    info!("Connection closed for {}", addr);
                });
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    info!("Server stopped accepting connections");
    Ok(())
}

/// Serves one control connection: welcome, then read-dispatch until the
/// peer hangs up or sends QUIT. Both socket halves are dropped on every
/// return path.
pub async fn handle_connection(
    socket: TcpStream,
    addr: SocketAddr,
    context: ServerContext,
) -> FtpResult<()> {
    let local_ip = socket.local_addr()?.ip();
    let (read_half, write_half) = socket.into_split();
    let writer = control_writer(write_half);

    let session = Arc::new(Mutex::new(
        Session::new(context.base_path.clone(), context.auth.clone()).with_local_ip(local_ip),
    ));

    send_welcome_message(&writer, &context.config).await?;

    let mut scanner = CommandScanner::new(BufReader::new(read_half))
        .with_max_length(context.config.server.max_command_length);
    loop {
        let command = match scanner.next_command().await {
            Ok(command) => command,
            Err(FtpError::NoCommand) => {
                info!("Client {} disconnected", addr);
                break;
            }
            Err(e) if e.is_scanner_error() => {
                warn!("{}: {}", addr, e);
                let response = format!("{}\r\n", e.to_ftp_response());
                send_response(&writer, response.as_bytes()).await?;
                continue;
            }
            Err(e) => return Err(e),
        };

        match dispatch(&context.handlers, &writer, &context.config, &session, command).await {
            Ok(()) => {}
            Err(FtpError::ExitRequested) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Sends the optional banner as `220-` lines followed by `220 Service ready.`
pub async fn send_welcome_message(writer: &ControlWriter, config: &Config) -> FtpResult<()> {
    match &config.server.banner {
        Some(banner) if !banner.trim().is_empty() => {
            let lines: Vec<&str> = banner.lines().collect();
            send_multiline_reply(writer, 220, &lines, "Service ready.").await?;
        }
        _ => send_reply(writer, 220, "Service ready.").await?,
    }
    Ok(())
}
