#![allow(dead_code)]

use rouilleftp::config::Config;
use rouilleftp::core_network::address;
use rouilleftp::{FtpServer, StopHandle};
use std::net::SocketAddr;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

pub const FILE_CONTENT: &[u8] = b"hello world";

pub struct TestServer {
    pub addr: SocketAddr,
    pub stop: StopHandle,
    pub task: JoinHandle<anyhow::Result<()>>,
    /// Canonical root, as the server sees it.
    pub root: PathBuf,
    _dir: TempDir,
}

/// Starts a server on an ephemeral port over a fresh root holding `sub/`
/// and `file.txt`.
pub async fn start_server() -> TestServer {
    start_server_with(|_| {}).await
}

pub async fn start_server_with(customize: impl FnOnce(&mut Config)) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    std::fs::create_dir(root.join("sub")).unwrap();
    std::fs::write(root.join("file.txt"), FILE_CONTENT).unwrap();

    let mut config = Config::default();
    config.server.listen_address = "127.0.0.1".to_string();
    config.server.listen_port = 0;
    config.server.root_dir = root.clone();
    config.server.data_timeout_secs = 5;
    customize(&mut config);

    let server = FtpServer::bind(config).await.unwrap();
    let addr = server.local_addr().unwrap();
    let stop = server.stop_handle();
    let task = tokio::spawn(server.run());
    TestServer {
        addr,
        stop,
        task,
        root,
        _dir: dir,
    }
}

/// A raw control connection speaking lines.
pub struct Control {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Control {
    /// Connects without consuming the welcome message.
    pub async fn connect_raw(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, writer) = stream.into_split();
        Control {
            reader: BufReader::new(read_half),
            writer,
        }
    }

    pub async fn connect(addr: SocketAddr) -> Self {
        let mut control = Self::connect_raw(addr).await;
        assert_eq!(control.read_line().await, "220 Service ready.");
        control
    }

    pub async fn read_line(&mut self) -> String {
        let mut line = String::new();
        self.reader.read_line(&mut line).await.unwrap();
        line.trim_end().to_string()
    }

    pub async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{}\r\n", line).as_bytes())
            .await
            .unwrap();
    }

    /// Writes `bytes` as they are, terminator included.
    pub async fn send_bytes(&mut self, bytes: &[u8]) {
        self.writer.write_all(bytes).await.unwrap();
    }

    pub async fn cmd(&mut self, line: &str) -> String {
        self.send(line).await;
        self.read_line().await
    }

    pub async fn login(&mut self) {
        assert_eq!(self.cmd("USER demo").await, "331 Password required for demo.");
        assert_eq!(self.cmd("PASS password").await, "230 User logged in.");
    }

    /// Sends PASV and returns the advertised data address.
    pub async fn pasv(&mut self) -> SocketAddr {
        let reply = self.cmd("PASV").await;
        assert!(
            reply.starts_with("227 Entering Passive Mode (") && reply.ends_with(")."),
            "{}",
            reply
        );
        address::decode(&reply).unwrap().parse().unwrap()
    }
}
