pub mod core_auth;
pub mod helper;

pub use core_auth::{spawn_auth_worker, AuthHandle, AuthRequest, PasswdEntry};
