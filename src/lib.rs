//! rouilleftp: an FTP server and client engine on tokio.
//!
//! The server side lives in [`server`], [`core_network`] and
//! [`core_ftpcommand`]. The client side is [`core_client`]. Both share the
//! command scanner, the address codec and [`reply::Reply`].

pub mod config;
pub mod core_auth;
pub mod core_cli;
pub mod core_client;
pub mod core_error;
pub mod core_ftpcommand;
pub mod core_log;
pub mod core_network;
pub mod helpers;
pub mod reply;
pub mod server;
pub mod session;

pub use config::Config;
pub use server::{FtpServer, StopHandle};
