use crate::config::Config;
use crate::core_auth::helper::load_user_table;
use crate::core_auth::{spawn_auth_worker, PasswdEntry};
use crate::core_ftpcommand::handlers::initialize_command_handlers;
use crate::core_network::network::{self, ServerContext};
use anyhow::{Context, Result};
use log::{error, info};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// A bound FTP server, ready to run.
pub struct FtpServer {
    listener: TcpListener,
    config: Arc<Config>,
    base_path: PathBuf,
    users: HashMap<String, PasswdEntry>,
    shutdown: watch::Sender<bool>,
}

/// Stops a running [`FtpServer`]: the accept loop ends and the
/// authentication worker exits. Sessions already running finish on their own.
#[derive(Clone)]
pub struct StopHandle {
    shutdown: watch::Sender<bool>,
}

impl StopHandle {
    pub fn stop(&self) {
        info!("Stop requested");
        self.shutdown.send_replace(true);
    }
}

impl FtpServer {
    /// Resolves the root directory, loads the user table and binds the
    /// control listener.
    pub async fn bind(config: Config) -> Result<Self> {
        let base_path = config.server.root_dir.canonicalize().with_context(|| {
            format!(
                "Root directory {} is not accessible",
                config.server.root_dir.display()
            )
        })?;
        let users = load_user_table(&config)?;

        let addr = config.server.listen_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;

        let (shutdown, _) = watch::channel(false);
        info!("Serving {} to {} user(s)", base_path.display(), users.len());
        Ok(Self {
            listener,
            config: Arc::new(config),
            base_path,
            users,
            shutdown,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            shutdown: self.shutdown.clone(),
        }
    }

    /// Serves until the stop handle fires.
    pub async fn run(self) -> Result<()> {
        let (auth, auth_worker) = spawn_auth_worker(self.users, self.shutdown.subscribe());
        let context = ServerContext {
            config: self.config,
            base_path: self.base_path,
            auth,
            handlers: Arc::new(initialize_command_handlers()),
        };

        let served = network::start_server(self.listener, context, self.shutdown.subscribe()).await;
        // The loop may also end on its own; make sure the worker follows.
        self.shutdown.send_replace(true);
        if let Err(e) = auth_worker.await {
            error!("Authentication worker failed: {}", e);
        }

        served.context("Server loop failed")
    }
}
