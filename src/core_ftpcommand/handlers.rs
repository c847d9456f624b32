use crate::config::Config;
use crate::core_error::error::{FtpError, FtpResult};
use crate::core_ftpcommand::ftpcommand::{Command, FtpCommand};
use crate::core_ftpcommand::{cwd, dele, list, pass, pwd, quit, retr, stor, user};
use crate::helpers::{send_reply, send_response, ControlWriter};
use crate::session::Session;
use log::{info, warn};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Mutex;

// Specific crates for PORT and PASV commands
use crate::core_network::pasv;
use crate::core_network::port;

pub type HandlerFuture = Pin<Box<dyn Future<Output = FtpResult<()>> + Send>>;

pub type CommandHandler = Box<
    dyn Fn(
            ControlWriter,
            Arc<Config>,
            Arc<Mutex<Session>>,
            String, // Argument, empty when absent
        ) -> HandlerFuture
        + Send
        + Sync,
>;

pub type CommandHandlers = HashMap<FtpCommand, Arc<CommandHandler>>;

macro_rules! handler {
    ($path:path) => {{
        let handler: CommandHandler = Box::new(
            |writer: ControlWriter,
             config: Arc<Config>,
             session: Arc<Mutex<Session>>,
             arg: String|
             -> HandlerFuture { Box::pin($path(writer, config, session, arg)) },
        );
        Arc::new(handler)
    }};
}

/// Builds the command table. TYPE is known to the scanner but has no
/// handler, so it is answered as not implemented.
pub fn initialize_command_handlers() -> CommandHandlers {
    let mut handlers: CommandHandlers = HashMap::new();

    handlers.insert(FtpCommand::USER, handler!(user::handle_user_command));
    handlers.insert(FtpCommand::PASS, handler!(pass::handle_pass_command));
    handlers.insert(FtpCommand::PWD, handler!(pwd::handle_pwd_command));
    handlers.insert(FtpCommand::CWD, handler!(cwd::handle_cwd_command));
    handlers.insert(FtpCommand::LIST, handler!(list::handle_list_command));
    handlers.insert(FtpCommand::RETR, handler!(retr::handle_retr_command));
    handlers.insert(FtpCommand::STOR, handler!(stor::handle_stor_command));
    handlers.insert(FtpCommand::DELE, handler!(dele::handle_dele_command));
    handlers.insert(FtpCommand::PASV, handler!(pasv::handle_pasv_command));
    handlers.insert(FtpCommand::EPSV, handler!(pasv::handle_epsv_command));
    handlers.insert(FtpCommand::PORT, handler!(port::handle_port_command));
    handlers.insert(FtpCommand::QUIT, handler!(quit::handle_quit_command));

    handlers
}

/// Runs one command against the session.
///
/// Per-command failures are answered on the control connection and the
/// session goes on. Fatal errors, including `ExitRequested`, are returned.
pub async fn dispatch(
    handlers: &CommandHandlers,
    writer: &ControlWriter,
    config: &Arc<Config>,
    session: &Arc<Mutex<Session>>,
    command: Command,
) -> FtpResult<()> {
    let kind = command.kind;
    if kind == FtpCommand::PASS {
        info!("Processing cmd {}, arg: ****", kind);
    } else {
        info!("Processing cmd {}, arg: {}", kind, command.arg());
    }

    if !kind.allowed_before_login() && !session.lock().await.is_authenticated {
        send_reply(writer, 530, "Please login with USER and PASS.").await?;
        return Ok(());
    }

    let result = match handlers.get(&kind) {
        Some(handler) => {
            handler(
                Arc::clone(writer),
                Arc::clone(config),
                Arc::clone(session),
                command.argument.unwrap_or_default(),
            )
            .await
        }
        None => Err(FtpError::NotImplemented(kind)),
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            warn!("Error handling command {}: {}", kind, e);
            let response = format!("{}\r\n", e.to_ftp_response());
            send_response(writer, response.as_bytes()).await?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_auth::{spawn_auth_worker, PasswdEntry};
    use crate::core_ftpcommand::scanner::parse_line;
    use crate::helpers::control_writer;
    use tokio::io::{AsyncBufReadExt, BufReader, DuplexStream};
    use tokio::sync::watch;

    struct Harness {
        handlers: CommandHandlers,
        writer: ControlWriter,
        config: Arc<Config>,
        session: Arc<Mutex<Session>>,
        replies: BufReader<DuplexStream>,
        _root: tempfile::TempDir,
        _stop: watch::Sender<bool>,
    }

    impl Harness {
        fn new() -> Self {
            let root = tempfile::tempdir().unwrap();
            let base = root.path().canonicalize().unwrap();
            std::fs::create_dir(base.join("sub")).unwrap();
            std::fs::write(base.join("file.txt"), b"content").unwrap();

            let mut users = HashMap::new();
            users.insert("demo".to_string(), PasswdEntry::new("demo", "password"));
            let (stop, shutdown) = watch::channel(false);
            let (auth, _) = spawn_auth_worker(users, shutdown);

            let (ours, theirs) = tokio::io::duplex(4096);
            Harness {
                handlers: initialize_command_handlers(),
                writer: control_writer(ours),
                config: Arc::new(Config::default()),
                session: Arc::new(Mutex::new(Session::new(base, auth))),
                replies: BufReader::new(theirs),
                _root: root,
                _stop: stop,
            }
        }

        async fn send(&mut self, line: &str) -> FtpResult<String> {
            let command = parse_line(line).unwrap();
            dispatch(
                &self.handlers,
                &self.writer,
                &self.config,
                &self.session,
                command,
            )
            .await?;
            let mut reply = String::new();
            self.replies.read_line(&mut reply).await.unwrap();
            Ok(reply.trim_end().to_string())
        }

        async fn login(&mut self) {
            self.send("USER demo").await.unwrap();
            assert_eq!(self.send("PASS password").await.unwrap(), "230 User logged in.");
        }
    }

    #[tokio::test]
    async fn test_login_required() {
        let mut h = Harness::new();
        assert_eq!(
            h.send("PWD").await.unwrap(),
            "530 Please login with USER and PASS."
        );
        assert_eq!(
            h.send("CWD sub").await.unwrap(),
            "530 Please login with USER and PASS."
        );
        assert_eq!(h.session.lock().await.current_dir, "/");
    }

    #[tokio::test]
    async fn test_user_pass_sequence() {
        let mut h = Harness::new();
        assert_eq!(
            h.send("USER wrong_user").await.unwrap(),
            "331 Password required for wrong_user."
        );
        assert_eq!(
            h.send("USER demo").await.unwrap(),
            "331 Password required for demo."
        );
        assert_eq!(h.send("PASS nope").await.unwrap(), "530 Login failed.");
        assert!(!h.session.lock().await.is_authenticated);
        assert_eq!(h.send("PASS password").await.unwrap(), "230 User logged in.");
        assert!(h.session.lock().await.is_authenticated);
    }

    #[tokio::test]
    async fn test_cwd_and_pwd() {
        let mut h = Harness::new();
        h.login().await;
        let steps = [
            ("PWD", "257 \"/\" is current directory."),
            ("CWD sub", "250 CWD command successful."),
            ("PWD", "257 \"/sub\" is current directory."),
            ("CWD ..", "250 CWD command successful."),
            ("CWD ..", "550 Invalid path."),
            ("CWD /sub", "250 CWD command successful."),
            ("CWD .", "250 CWD command successful."),
            ("CWD /invalid_path", "550 Invalid path."),
            ("CWD /file.txt", "550 Invalid path."),
            ("PWD", "257 \"/sub\" is current directory."),
        ];
        for (line, expected) in steps {
            assert_eq!(h.send(line).await.unwrap(), expected, "{}", line);
        }
    }

    #[tokio::test]
    async fn test_data_command_without_mode() {
        let mut h = Harness::new();
        h.login().await;
        assert_eq!(
            h.send("LIST").await.unwrap(),
            "425 No connection mode specified, use PORT or PASV first."
        );
        assert_eq!(h.send("RETR missing").await.unwrap(), "550 File not found.");
    }

    #[tokio::test]
    async fn test_type_is_not_implemented() {
        let mut h = Harness::new();
        h.login().await;
        assert_eq!(
            h.send("TYPE I").await.unwrap(),
            "500 'TYPE': command not implemented."
        );
    }

    #[tokio::test]
    async fn test_port_rejects_garbage() {
        let mut h = Harness::new();
        h.login().await;
        assert_eq!(
            h.send("PORT 1,2,3").await.unwrap(),
            "501 Syntax error in parameters or arguments."
        );
        assert!(h.session.lock().await.data_connection.is_none());
        assert_eq!(
            h.send("PORT 127,0,0,1,39,17").await.unwrap(),
            "200 PORT command successful."
        );
    }

    #[tokio::test]
    async fn test_quit_is_fatal() {
        let mut h = Harness::new();
        let result = h.send("QUIT").await;
        assert!(matches!(result, Err(FtpError::ExitRequested)));
    }

    #[tokio::test]
    async fn test_dele() {
        let mut h = Harness::new();
        h.login().await;
        assert_eq!(
            h.send("DELE file.txt").await.unwrap(),
            "200 DELE command successful."
        );
        assert_eq!(h.send("DELE file.txt").await.unwrap(), "550 File not found.");
        assert_eq!(h.send("DELE sub").await.unwrap(), "550 File not found.");
    }
}
