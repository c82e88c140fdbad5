//! stdio transport: framed JSON-RPC on stdin/stdout.
//!
//! Each request runs in its own task so slow API calls do not block
//! `ping` or `tools/list`. All output goes through a single writer task,
//! replying in the framing the client used for that request.

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::framing::{Framing, MessageReader, write_message};
use crate::server::McpServer;

/// Capacity of the response channel feeding the writer task.
const RESPONSE_CHANNEL_CAPACITY: usize = 256;

/// Serve until `input` reaches EOF and every in-flight request is answered.
///
/// # Errors
///
/// Returns an error if reading a frame fails. Write failures end the writer
/// task and are logged.
pub async fn run<R, W>(server: McpServer, input: R, output: W) -> anyhow::Result<()>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<(String, Framing)>(RESPONSE_CHANNEL_CAPACITY);
    let writer = tokio::spawn(write_loop(rx, output));

    let mut reader = MessageReader::new(input);
    let mut tasks = JoinSet::new();
    let read_result = loop {
        let raw = match reader.next_message().await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::info!("stdin EOF, draining in-flight requests");
                break Ok(());
            }
            Err(e) => break Err(e),
        };
        let framing = reader.framing();
        let server = server.clone();
        let tx = tx.clone();
        tasks.spawn(async move {
            let Some(response) = server.handle_message(&raw).await else {
                return;
            };
            match serde_json::to_string(&response) {
                Ok(serialized) => {
                    if tx.send((serialized, framing)).await.is_err() {
                        tracing::warn!("writer closed; dropping response");
                    }
                }
                Err(e) => tracing::error!("failed to serialize response: {e}"),
            }
        });
        while let Some(done) = tasks.try_join_next() {
            log_join(done);
        }
    };

    while let Some(done) = tasks.join_next().await {
        log_join(done);
    }
    drop(tx);
    if let Err(e) = writer.await {
        tracing::error!("writer task failed: {e}");
    }
    read_result.map_err(Into::into)
}

async fn write_loop<W: AsyncWrite + Unpin>(
    mut rx: mpsc::Receiver<(String, Framing)>,
    mut output: W,
) {
    while let Some((msg, framing)) = rx.recv().await {
        if let Err(e) = write_message(&mut output, &msg, framing).await {
            tracing::error!("failed to write response: {e}");
            break;
        }
    }
}

fn log_join(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        tracing::error!("request task failed: {e}");
    }
}
