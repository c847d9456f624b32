use crate::core_ftpcommand::scanner::MAX_COMMAND_LENGTH;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_address: String,
    pub listen_port: u16,
    pub root_dir: PathBuf,
    /// IPv4 address advertised in PASV replies. Defaults to the local
    /// address of the control connection.
    pub pasv_address: Option<String>,
    pub data_timeout_secs: u64,
    pub download_buffer_size: usize,
    pub upload_buffer_size: usize,
    pub banner: Option<String>,
    /// Longest accepted control line in bytes, line ending included.
    pub max_command_length: usize,
    pub passwd_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub users: HashMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: String::from("0.0.0.0"),
            listen_port: 2121,
            root_dir: PathBuf::from("/tmp"),
            pasv_address: None,
            data_timeout_secs: 30,
            download_buffer_size: 128 * 1024, // Default 128 KB
            upload_buffer_size: 256 * 1024,   // Default 256 KB
            banner: None,
            max_command_length: MAX_COMMAND_LENGTH,
            passwd_file: None,
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.listen_address, self.listen_port)
    }

    pub fn data_timeout(&self) -> Duration {
        Duration::from_secs(self.data_timeout_secs)
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(config_str)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = Config::from_toml(
            r#"
            [server]
            listen_port = 10000
            root_dir = "/srv/ftp"

            [users]
            demo = "password"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.listen_port, 10000);
        assert_eq!(config.server.root_dir, PathBuf::from("/srv/ftp"));
        assert_eq!(config.server.listen_address, "0.0.0.0");
        assert_eq!(config.server.data_timeout(), Duration::from_secs(30));
        assert_eq!(config.server.download_buffer_size, 128 * 1024);
        assert_eq!(config.server.max_command_length, 512);
        assert_eq!(config.users.get("demo").map(String::as_str), Some("password"));
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.listen_addr(), "0.0.0.0:2121");
        assert!(config.users.is_empty());
    }

    #[test]
    fn test_rejects_bad_types() {
        assert!(Config::from_toml("[server]\nlisten_port = \"x\"\n").is_err());
    }
}
