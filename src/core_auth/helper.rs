use crate::config::Config;
use crate::core_auth::core_auth::PasswdEntry;
use anyhow::{Context, Result};
use bcrypt::{hash, verify, BcryptResult, DEFAULT_COST};
use log::{info, warn};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const DEFAULT_USER: &str = "demo";
pub const DEFAULT_PASSWORD: &str = "password";

pub fn hash_password(password: &str) -> BcryptResult<String> {
    hash(password, DEFAULT_COST)
}

pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    verify(password, hashed_password).unwrap_or(false)
}

pub fn load_passwd_file(path: &Path) -> Result<HashMap<String, PasswdEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read passwd file: {}", path.display()))?;

    let mut passwd_map = HashMap::new();
    for (lineno, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match PasswdEntry::from_line(line) {
            Some(entry) => {
                passwd_map.insert(entry.get_username().to_string(), entry);
            }
            None => warn!("Skipping malformed passwd line {} in {}", lineno + 1, path.display()),
        }
    }
    Ok(passwd_map)
}

/// Builds the table handed to the authentication worker: the `[users]`
/// section, then the passwd file on top. Falls back to the demo account.
pub fn load_user_table(config: &Config) -> Result<HashMap<String, PasswdEntry>> {
    let mut users: HashMap<String, PasswdEntry> = config
        .users
        .iter()
        .map(|(user, secret)| (user.clone(), PasswdEntry::new(user.as_str(), secret.as_str())))
        .collect();

    if let Some(path) = &config.server.passwd_file {
        users.extend(load_passwd_file(path)?);
    }

    if users.is_empty() {
        info!("No users configured, enabling the {} account", DEFAULT_USER);
        users.insert(
            DEFAULT_USER.to_string(),
            PasswdEntry::new(DEFAULT_USER, DEFAULT_PASSWORD),
        );
    }
    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_user_table() {
        let users = load_user_table(&Config::default()).unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[DEFAULT_USER].verify(DEFAULT_PASSWORD));
    }

    #[test]
    fn test_passwd_file_overrides_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "alice:wonderland").unwrap();
        writeln!(file, "garbage").unwrap();
        writeln!(file, "bob:{}", bcrypt::hash("builder", 4).unwrap()).unwrap();

        let mut config = Config::default();
        config.users.insert("alice".into(), "old".into());
        config.users.insert("carol".into(), "c".into());
        config.server.passwd_file = Some(file.path().to_path_buf());

        let users = load_user_table(&config).unwrap();
        assert_eq!(users.len(), 3);
        assert!(users["alice"].verify("wonderland"));
        assert!(users["bob"].verify("builder"));
        assert!(users["carol"].verify("c"));
        assert!(!users.contains_key(DEFAULT_USER));
    }

    #[test]
    fn test_missing_passwd_file() {
        let mut config = Config::default();
        config.server.passwd_file = Some("/nonexistent/passwd".into());
        assert!(load_user_table(&config).is_err());
    }
}
