use crate::core_client::printer::OutputSender;
use crate::core_error::error::{FtpError, FtpResult};
use crate::core_ftpcommand::ftpcommand::{Command, FtpCommand};
use crate::core_ftpcommand::scanner::CommandScanner;
use crate::core_ftpcommand::utils::file_name;
use crate::core_network::address;
use crate::core_network::data::ConnectionMode;
use crate::reply::Reply;
use log::{debug, info, warn};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

const CHUNK_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Where RETR stores downloaded files.
    pub out_dir: PathBuf,
    /// Bound on every data connection accept or dial.
    pub data_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("./"),
            data_timeout: Duration::from_secs(30),
        }
    }
}

/// Our side of a data connection.
enum DataEndpoint {
    /// Passive mode: connect to the address from the PASV/EPSV reply.
    Dial(SocketAddr),
    /// Active mode: wait for the server on the address sent with PORT.
    Listen(TcpListener),
}

impl DataEndpoint {
    async fn open(self, limit: Duration) -> FtpResult<TcpStream> {
        let stream = match self {
            DataEndpoint::Dial(addr) => timeout(limit, TcpStream::connect(addr))
                .await
                .map_err(|_| FtpError::DataConnectionTimeout)?,
            DataEndpoint::Listen(listener) => timeout(limit, listener.accept())
                .await
                .map_err(|_| FtpError::DataConnectionTimeout)?
                .map(|(stream, _)| stream),
        };
        stream.map_err(|e| FtpError::DataConnectionFailed(e.to_string()))
    }
}

/// Drives an FTP session from a command script or an interactive input.
pub struct FtpClient<R, W, I> {
    control: BufReader<R>,
    writer: W,
    input: CommandScanner<I>,
    mode: ConnectionMode,
    data_addr: Option<String>,
    peer_ip: Option<IpAddr>,
    out_dir: PathBuf,
    data_timeout: Duration,
    output: OutputSender,
}

impl<I: AsyncBufRead + Unpin> FtpClient<OwnedReadHalf, OwnedWriteHalf, I> {
    /// Opens the control connection to `server`.
    pub async fn connect(
        server: &str,
        input: I,
        output: OutputSender,
        options: ClientOptions,
    ) -> FtpResult<Self> {
        let stream = TcpStream::connect(server).await?;
        let peer_ip = stream.peer_addr()?.ip();
        info!("Connected to {}", server);
        let (read_half, write_half) = stream.into_split();
        Ok(Self::new(read_half, write_half, input, output, options).with_peer_ip(peer_ip))
    }
}

impl<R, W, I> FtpClient<R, W, I>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    I: AsyncBufRead + Unpin,
{
    pub fn new(
        control: R,
        writer: W,
        input: I,
        output: OutputSender,
        options: ClientOptions,
    ) -> Self {
        Self {
            control: BufReader::new(control),
            writer,
            input: CommandScanner::new(input),
            mode: ConnectionMode::Unset,
            data_addr: None,
            peer_ip: None,
            out_dir: options.out_dir,
            data_timeout: options.data_timeout,
            output,
        }
    }

    /// Host used for EPSV replies, which only carry a port.
    pub fn with_peer_ip(mut self, peer_ip: IpAddr) -> Self {
        self.peer_ip = Some(peer_ip);
        self
    }

    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    /// Reads the 220 greeting and queues it for printing ahead of any
    /// command output.
    pub async fn read_welcome_message(&mut self) -> FtpResult<Reply> {
        let reply = Reply::read(&mut self.control).await?;
        self.print(format!("{}\n", reply));
        Ok(reply)
    }

    /// Logs in with USER/PASS. Any status other than 331 then 230 is an
    /// error the caller should treat as fatal.
    pub async fn authenticate(&mut self, user: &str, password: &str) -> FtpResult<()> {
        let reply = self
            .exchange(&Command::with_argument(FtpCommand::USER, user))
            .await?;
        expect_status(&reply, 331)?;

        let reply = self
            .exchange(&Command::with_argument(FtpCommand::PASS, password))
            .await?;
        expect_status(&reply, 230)?;
        info!("Authentication successful");
        Ok(())
    }

    /// Runs every command from the input until it ends or QUIT is answered.
    ///
    /// Command errors are printed and skipped. A lost control connection is
    /// returned.
    pub async fn process_commands(&mut self) -> FtpResult<()> {
        loop {
            let command = match self.input.next_command().await {
                Ok(command) => command,
                Err(FtpError::NoCommand) => break,
                Err(e) if e.is_scanner_error() => {
                    warn!("{}", e);
                    self.print(format!("{}.\n", e));
                    continue;
                }
                Err(e) => return Err(e),
            };

            let kind = command.kind;
            if kind == FtpCommand::PASS {
                info!("Processing cmd: {}, arg: ****", kind);
            } else {
                info!("Processing cmd: {}, arg: {}", kind, command.arg());
            }

            match self.execute(command).await {
                Ok(reply) => {
                    self.print(format!("{}\n", reply));
                    if kind == FtpCommand::QUIT {
                        break;
                    }
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!("{} failed: {}", kind, e);
                    self.print(format!("Error: {}.\n", e));
                }
            }
        }
        Ok(())
    }

    /// Sends one command and returns the server's final reply for it.
    pub async fn execute(&mut self, command: Command) -> FtpResult<Reply> {
        match command.kind {
            kind if kind.is_data_command() => self.transfer(command).await,
            FtpCommand::PORT => {
                let target = command.arg().to_string();
                let encoded = address::encode_addr(&target)?;
                let reply = self
                    .exchange(&Command::with_argument(FtpCommand::PORT, encoded))
                    .await?;
                if reply.is_positive_completion() {
                    self.mode = ConnectionMode::Active;
                    self.data_addr = Some(target);
                }
                Ok(reply)
            }
            FtpCommand::PASV => {
                let reply = self.exchange(&command).await?;
                if reply.code == 227 {
                    self.data_addr = Some(address::decode(&reply.text)?);
                    self.mode = ConnectionMode::Passive;
                }
                Ok(reply)
            }
            FtpCommand::EPSV => {
                let reply = self.exchange(&command).await?;
                if reply.code == 229 {
                    let port = address::decode_epsv_port(&reply.text)?;
                    let host = self
                        .peer_ip
                        .ok_or_else(|| FtpError::InvalidAddressFormat(reply.text.clone()))?;
                    self.data_addr = Some(SocketAddr::new(host, port).to_string());
                    self.mode = ConnectionMode::Passive;
                }
                Ok(reply)
            }
            _ => self.exchange(&command).await,
        }
    }

    /// LIST, RETR and STOR. The data side runs in its own task, started
    /// before the command is written, and is awaited only when the server
    /// reports a completed transfer. Otherwise it is aborted.
    ///
    /// STOR reads its argument as a local path and stores it under its base
    /// name, the mirror of RETR saving into the output directory.
    async fn transfer(&mut self, command: Command) -> FtpResult<Reply> {
        let kind = command.kind;
        let arg = command.arg().to_string();

        let data_addr = match (self.mode, &self.data_addr) {
            (ConnectionMode::Unset, _) | (_, None) => {
                return Err(FtpError::UnknownConnectionMode)
            }
            (_, Some(addr)) => addr.clone(),
        };

        let (wire_command, payload) = if kind == FtpCommand::STOR {
            let bytes = tokio::fs::read(&arg)
                .await
                .map_err(|e| FtpError::LocalError(format!("{}: {}", arg, e)))?;
            (Command::with_argument(kind, file_name(&arg)), Some(bytes))
        } else {
            (command, None)
        };

        let endpoint = match self.mode {
            ConnectionMode::Active => {
                let listener = TcpListener::bind(&data_addr)
                    .await
                    .map_err(|e| FtpError::DataConnectionFailed(e.to_string()))?;
                DataEndpoint::Listen(listener)
            }
            _ => DataEndpoint::Dial(
                data_addr
                    .parse()
                    .map_err(|_| FtpError::InvalidAddressFormat(data_addr.clone()))?,
            ),
        };
        // One transfer per PORT/PASV, whatever the outcome.
        self.mode = ConnectionMode::Unset;

        debug!("Starting data channel on addr {}", data_addr);
        let task = tokio::spawn(run_transfer(
            endpoint,
            payload,
            kind == FtpCommand::RETR,
            self.data_timeout,
            self.output.clone(),
        ));

        let reply = match self.send_and_await_final(&wire_command).await {
            Ok(reply) => reply,
            Err(e) => {
                task.abort();
                return Err(e);
            }
        };
        if !reply.is_positive_completion() {
            debug!("{} rejected with {}, dropping data channel", kind, reply.code);
            task.abort();
            return Ok(reply);
        }

        let received = task
            .await
            .map_err(|e| FtpError::LocalError(e.to_string()))??;

        match kind {
            FtpCommand::LIST => self.print(String::from_utf8_lossy(&received).into_owned()),
            FtpCommand::RETR => {
                let path = self.out_dir.join(file_name(&arg));
                tokio::fs::write(&path, &received)
                    .await
                    .map_err(|e| FtpError::LocalError(format!("{}: {}", path.display(), e)))?;
                info!("Saved {} bytes to {}", received.len(), path.display());
            }
            _ => self.print(format!("File {} saved to server.\n", arg)),
        }
        Ok(reply)
    }

    /// Writes `command` and reads past any 1xx preliminary replies.
    async fn send_and_await_final(&mut self, command: &Command) -> FtpResult<Reply> {
        self.send(command).await?;
        loop {
            let reply = Reply::read(&mut self.control).await?;
            if !reply.is_positive_preliminary() {
                return Ok(reply);
            }
            debug!("Preliminary reply: {}", reply);
        }
    }

    async fn exchange(&mut self, command: &Command) -> FtpResult<Reply> {
        self.send(command).await?;
        Reply::read(&mut self.control).await
    }

    async fn send(&mut self, command: &Command) -> FtpResult<()> {
        let line = format!("{}\r\n", command.to_line());
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    fn print(&self, text: String) {
        if self.output.send(text).is_err() {
            warn!("Output printer is gone");
        }
    }
}

fn expect_status(reply: &Reply, expected: u16) -> FtpResult<()> {
    if reply.code != expected {
        return Err(FtpError::UnexpectedStatus {
            expected,
            received: reply.code,
        });
    }
    Ok(())
}

/// Body of the data task: uploads `payload` when given, otherwise reads the
/// stream to its end and returns the bytes.
async fn run_transfer(
    endpoint: DataEndpoint,
    payload: Option<Vec<u8>>,
    show_progress: bool,
    limit: Duration,
    output: OutputSender,
) -> FtpResult<Vec<u8>> {
    let mut stream = endpoint.open(limit).await?;
    let broken = |e: std::io::Error| FtpError::DataConnectionFailed(e.to_string());

    if let Some(bytes) = payload {
        stream.write_all(&bytes).await.map_err(broken)?;
        stream.shutdown().await.map_err(broken)?;
        return Ok(Vec::new());
    }

    let mut received = Vec::new();
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        let n = stream.read(&mut chunk).await.map_err(broken)?;
        if n == 0 {
            break;
        }
        received.extend_from_slice(&chunk[..n]);
        if show_progress {
            let _ = output.send(format!("\rDownloaded: {} bytes.", received.len()));
        }
    }
    if show_progress && !received.is_empty() {
        let _ = output.send("\n".to_string());
    }
    Ok(received)
}
