use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "rouilleftpd", about = "A FTP server written in Rust.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Root directory served to clients
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    pub ip: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Print a bcrypt hash of the given password for a passwd file and exit
    #[arg(long, value_name = "PASSWORD")]
    pub hash_password: Option<String>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}

/// Command-line arguments of the client
#[derive(Parser, Debug)]
#[command(name = "rouilleftp", about = "A FTP client written in Rust.")]
pub struct ClientCli {
    /// FTP server user name
    #[arg(short, long)]
    pub user: String,

    /// FTP server password
    #[arg(long)]
    pub pw: String,

    /// Interactive mode, commands are read from stdin
    #[arg(long)]
    pub it: bool,

    /// Enable logging
    #[arg(long)]
    pub log: bool,

    /// The folder in which downloads will be saved
    #[arg(long, default_value = "./")]
    pub out: PathBuf,

    /// Seconds to wait for a data connection
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Server address, host:port
    pub server: String,

    /// Commands separated by ';', required unless --it is given
    #[arg(required_unless_present = "it")]
    pub commands: Option<String>,
}

impl ClientCli {
    /// The command script with one command per line.
    pub fn script(&self) -> String {
        self.commands
            .as_deref()
            .unwrap_or_default()
            .replace(';', "\n")
    }
}
