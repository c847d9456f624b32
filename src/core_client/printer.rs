use log::debug;
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Queue feeding the printer task. Every piece of client output goes
/// through it so that progress lines from a transfer and status lines from
/// the control connection never interleave mid-write.
pub type OutputSender = mpsc::UnboundedSender<String>;

/// Starts the single printer task writing to `out`.
///
/// The task ends once every sender is dropped and hands `out` back, which
/// lets callers inspect an in-memory sink.
pub fn spawn_printer<W>(mut out: W) -> (OutputSender, JoinHandle<io::Result<W>>)
where
    W: AsyncWrite + Send + Unpin + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let handle = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            out.write_all(text.as_bytes()).await?;
            out.flush().await?;
        }
        debug!("Output queue closed, printer exiting");
        Ok(out)
    });
    (tx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_printer_keeps_order() {
        let (tx, handle) = spawn_printer(Vec::new());
        let producers: Vec<_> = (0..4)
            .map(|i| {
                let tx = tx.clone();
                tokio::spawn(async move {
                    tx.send(format!("line {}\n", i)).unwrap();
                })
            })
            .collect();
        for producer in producers {
            producer.await.unwrap();
        }
        tx.send("done\n".to_string()).unwrap();
        drop(tx);

        let out = String::from_utf8(handle.await.unwrap().unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[4], "done");
        for i in 0..4 {
            assert!(lines.contains(&format!("line {}", i).as_str()));
        }
    }
}
