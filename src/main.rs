use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use rouilleftp::config::Config;
use rouilleftp::core_auth::helper::hash_password;
use rouilleftp::core_cli::Cli;
use rouilleftp::core_log::logger::init_logger;
use rouilleftp::server::FtpServer;
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "/etc/rouilleftpd.conf";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    if let Some(password) = &args.hash_password {
        println!("{}", hash_password(password).context("Failed to hash password")?);
        return Ok(());
    }

    init_logger(if args.verbose { "debug" } else { "info" });

    let mut config = load_config(&args)?;

    // CLI overrides
    if let Some(root) = args.root {
        config.server.root_dir = root;
    }
    if let Some(ip) = args.ip {
        config.server.listen_address = ip;
    }
    if let Some(port) = args.port {
        config.server.listen_port = port;
    }

    let server = FtpServer::bind(config).await?;
    info!("rouilleftpd listening on {}", server.local_addr()?);

    let stop = server.stop_handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => stop.stop(),
            Err(e) => error!("Failed to listen for ctrl-c: {}", e),
        }
    });

    server.run().await
}

fn load_config(args: &Cli) -> Result<Config> {
    match &args.config {
        Some(path) => Config::load_from_file(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            Config::load_from_file(Path::new(DEFAULT_CONFIG_PATH))
        }
        None => Ok(Config::default()),
    }
}
