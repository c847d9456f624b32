use crate::core_auth::helper::verify_password;
use log::{debug, info, warn};
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

const AUTH_QUEUE_DEPTH: usize = 64;

#[derive(Debug, Clone)]
pub struct PasswdEntry {
    username: String,
    secret: String,
}

impl PasswdEntry {
    pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            secret: secret.into(),
        }
    }

    /// Parses a `user:secret` line.
    pub fn from_line(line: &str) -> Option<Self> {
        let (username, secret) = line.split_once(':')?;
        if username.is_empty() || secret.contains(':') {
            return None;
        }
        Some(PasswdEntry::new(username, secret))
    }

    pub fn get_username(&self) -> &str {
        &self.username
    }

    /// bcrypt hashes start with `$2`; anything else is a plaintext password.
    pub fn is_hashed(&self) -> bool {
        self.secret.starts_with("$2")
    }

    pub fn verify(&self, password: &str) -> bool {
        if self.is_hashed() {
            verify_password(password, &self.secret)
        } else {
            self.secret == password
        }
    }
}

/// One credential check sent from a session to the authentication worker.
#[derive(Debug)]
pub struct AuthRequest {
    pub user: String,
    pub password: String,
    pub reply: oneshot::Sender<bool>,
}

/// Sending side of the authentication worker's queue, held by every session.
#[derive(Debug, Clone)]
pub struct AuthHandle {
    tx: mpsc::Sender<AuthRequest>,
}

impl AuthHandle {
    /// Returns false when the credentials do not match or the worker is gone.
    pub async fn authenticate(&self, user: &str, password: &str) -> bool {
        let (reply, result) = oneshot::channel();
        let request = AuthRequest {
            user: user.to_string(),
            password: password.to_string(),
            reply,
        };
        if self.tx.send(request).await.is_err() {
            warn!("Authentication worker stopped, rejecting login for {}", user);
            return false;
        }
        result.await.unwrap_or(false)
    }
}

/// Spawns the task that owns the user table. It answers requests one at a
/// time and exits when `shutdown` flips to true or every handle is dropped.
pub fn spawn_auth_worker(
    users: HashMap<String, PasswdEntry>,
    shutdown: watch::Receiver<bool>,
) -> (AuthHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(AUTH_QUEUE_DEPTH);
    let worker = tokio::spawn(run_auth_worker(users, rx, shutdown));
    (AuthHandle { tx }, worker)
}

async fn run_auth_worker(
    users: HashMap<String, PasswdEntry>,
    mut requests: mpsc::Receiver<AuthRequest>,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Authentication worker started with {} user(s)", users.len());
    loop {
        if *shutdown.borrow() {
            break;
        }
        let request = tokio::select! {
            request = requests.recv() => match request {
                Some(request) => request,
                None => break,
            },
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
                continue;
            }
        };

        let accepted = match users.get(&request.user) {
            Some(entry) if entry.is_hashed() => {
                let entry = entry.clone();
                let password = request.password;
                tokio::task::spawn_blocking(move || entry.verify(&password))
                    .await
                    .unwrap_or(false)
            }
            Some(entry) => entry.verify(&request.password),
            None => false,
        };
        debug!("Login for {} accepted: {}", request.user, accepted);
        // The session may have gone away while waiting.
        let _ = request.reply.send(accepted);
    }
    requests.close();
    info!("Authentication worker stopped");
}
