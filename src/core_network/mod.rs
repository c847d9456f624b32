pub mod address;
pub mod data;
pub mod handlers;
pub mod network;
pub mod pasv;
pub mod port;
