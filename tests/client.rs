mod common;

use common::{start_server, FILE_CONTENT};
use rouilleftp::core_client::{spawn_printer, ClientOptions, FtpClient};
use rouilleftp::core_error::error::FtpError;
use std::path::Path;
use std::time::Duration;

/// Runs `script` through a logged-in client and returns everything it
/// printed.
async fn run_script(addr: std::net::SocketAddr, script: String, out_dir: &Path) -> String {
    let (output, printer) = spawn_printer(Vec::new());
    let options = ClientOptions {
        out_dir: out_dir.to_path_buf(),
        data_timeout: Duration::from_secs(5),
    };
    let mut client = FtpClient::connect(&addr.to_string(), script.as_bytes(), output, options)
        .await
        .unwrap();

    let welcome = client.read_welcome_message().await.unwrap();
    assert_eq!(welcome.code, 220);
    client.authenticate("demo", "password").await.unwrap();
    client.process_commands().await.unwrap();
    drop(client);

    String::from_utf8(printer.await.unwrap().unwrap()).unwrap()
}

#[tokio::test]
async fn test_client_passive_session() {
    let server = start_server().await;
    let out_dir = tempfile::tempdir().unwrap();

    // STOR reads a local path and stores the file by its base name.
    let local_dir = tempfile::tempdir().unwrap();
    let upload = local_dir.path().join("upload.txt");
    std::fs::write(&upload, b"from the client").unwrap();

    let script = format!(
        "PASV\nLIST\nPASV\nRETR file.txt\nEPSV\nSTOR {}\nRETR file.txt\nQUIT\n",
        upload.display()
    );
    let printed = run_script(server.addr, script, out_dir.path()).await;

    assert!(printed.starts_with("220 Service ready.\n"), "{}", printed);
    assert!(printed.contains("227 Entering Passive Mode (127,0,0,1,"), "{}", printed);
    assert!(printed.contains("file.txt"));
    assert!(printed.contains("226 Transfer complete."));
    assert!(printed.contains(&format!("\rDownloaded: {} bytes.", FILE_CONTENT.len())));
    assert!(printed.contains(&format!("File {} saved to server.", upload.display())));
    assert!(printed.contains("Error: No connection mode specified, use PORT or PASV first."));
    assert!(printed.trim_end().ends_with("221 Goodbye."));

    assert_eq!(
        std::fs::read(out_dir.path().join("file.txt")).unwrap(),
        FILE_CONTENT
    );
    assert_eq!(
        std::fs::read(server.root.join("upload.txt")).unwrap(),
        b"from the client"
    );
}

#[tokio::test]
async fn test_client_active_session() {
    let server = start_server().await;
    let out_dir = tempfile::tempdir().unwrap();

    let free = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let data_addr = free.local_addr().unwrap();
    drop(free);

    let script = format!("PORT {}\nRETR file.txt\nPASV\nRETR missing\nQUIT\n", data_addr);
    let printed = run_script(server.addr, script, out_dir.path()).await;

    assert!(printed.contains("200 PORT command successful."), "{}", printed);
    assert!(printed.contains("226 Transfer complete."));
    assert!(printed.contains("550 File not found."));
    assert_eq!(
        std::fs::read(out_dir.path().join("file.txt")).unwrap(),
        FILE_CONTENT
    );
}

#[tokio::test]
async fn test_client_rejects_bad_login() {
    let server = start_server().await;
    let (output, _printer) = spawn_printer(tokio::io::sink());
    let mut client = FtpClient::connect(
        &server.addr.to_string(),
        &b""[..],
        output,
        ClientOptions::default(),
    )
    .await
    .unwrap();
    client.read_welcome_message().await.unwrap();
    let err = client.authenticate("demo", "wrong").await.unwrap_err();
    assert!(matches!(
        err,
        FtpError::UnexpectedStatus {
            expected: 230,
            received: 530
        }
    ));
}
