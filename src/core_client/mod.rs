pub mod client;
pub mod printer;

pub use client::{ClientOptions, FtpClient};
pub use printer::{spawn_printer, OutputSender};
