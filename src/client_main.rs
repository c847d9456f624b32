use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rouilleftp::core_cli::ClientCli;
use rouilleftp::core_client::{spawn_printer, ClientOptions, FtpClient};
use rouilleftp::core_log::logger::init_logger;
use std::time::Duration;
use tokio::io::{AsyncBufRead, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    let args = ClientCli::parse();

    // stdout carries the session, logs go to stderr only on request
    init_logger(if args.log { "info" } else { "off" });
    info!("Starting FTP client, interactive mode {}", args.it);

    let input: Box<dyn AsyncBufRead + Unpin + Send> = if args.it {
        Box::new(BufReader::new(tokio::io::stdin()))
    } else {
        Box::new(std::io::Cursor::new(args.script().into_bytes()))
    };

    let options = ClientOptions {
        out_dir: args.out.clone(),
        data_timeout: Duration::from_secs(args.timeout),
    };

    let (output, printer) = spawn_printer(tokio::io::stdout());
    let session = async {
        let mut client = FtpClient::connect(&args.server, input, output, options)
            .await
            .with_context(|| format!("Failed to connect to {}", args.server))?;

        client.read_welcome_message().await?;

        client
            .authenticate(&args.user, &args.pw)
            .await
            .context("Login failed")?;

        client.process_commands().await?;
        Ok::<(), anyhow::Error>(())
    };
    let result = session.await;

    // Every sender is gone once the client is dropped; drain what is queued.
    printer.await??;
    result
}
