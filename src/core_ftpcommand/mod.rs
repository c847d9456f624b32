// Here's the list of the FTP commands implemented
pub mod user;
pub mod pass;
pub mod quit;
pub mod handlers;
pub mod pwd;
pub mod list;
pub mod cwd;
pub mod dele;
pub mod retr;
pub mod stor;

// Command model and parsing
pub mod ftpcommand;
pub mod scanner;

// The utils and common functions are here
pub mod utils;
