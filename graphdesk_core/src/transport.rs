use std::io;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader as AsyncBufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::mcp_server::JsonRpcHandler;

/// Stdio transport for the MCP server.
///
/// A reader loop feeds requests to per-request tasks so that one slow Graph
/// call never blocks other in-flight invocations; responses are funneled
/// through a single writer task to keep stdout lines whole.
pub struct StdioTransport {
    handler: JsonRpcHandler,
}

impl StdioTransport {
    pub fn new(handler: JsonRpcHandler) -> Self {
        Self { handler }
    }

    /// Run until EOF on stdin. In-flight requests drain before returning.
    pub async fn run(&self) -> io::Result<()> {
        info!("Starting stdio transport");

        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();

        let writer = tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            while let Some(line) = out_rx.recv().await {
                if stdout.write_all(line.as_bytes()).await.is_err()
                    || stdout.write_all(b"\n").await.is_err()
                    || stdout.flush().await.is_err()
                {
                    error!("Failed to write response to stdout");
                    break;
                }
                debug!("Sent response: {}", line);
            }
        });

        let stdin = tokio::io::stdin();
        let mut reader = AsyncBufReader::new(stdin);
        let mut line = String::new();

        loop {
            line.clear();
            match reader.read_line(&mut line).await {
                Ok(0) => {
                    debug!("EOF reached on stdin");
                    break;
                }
                Ok(_) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let handler = self.handler.clone();
                    let out = out_tx.clone();
                    let raw = line.trim().to_string();
                    tokio::spawn(async move {
                        if let Some(response) = process_line(&handler, &raw).await {
                            match serde_json::to_string(&response) {
                                Ok(serialized) => {
                                    let _ = out.send(serialized);
                                }
                                Err(e) => error!("Failed to serialize response: {}", e),
                            }
                        }
                    });
                }
                Err(e) => {
                    error!("Error reading from stdin: {}", e);
                    break;
                }
            }
        }

        // The writer exits once every per-request sender is gone.
        drop(out_tx);
        let _ = writer.await;

        Ok(())
    }
}

async fn process_line(handler: &JsonRpcHandler, line: &str) -> Option<Value> {
    debug!("Processing line: {}", line);

    match serde_json::from_str::<Value>(line) {
        Ok(request) => handler.handle_request(request).await,
        Err(e) => {
            error!("Failed to parse JSON-RPC request: {}", e);

            Some(serde_json::json!({
                "jsonrpc": "2.0",
                "error": {
                    "code": -32700,
                    "message": "Parse error",
                    "data": e.to_string()
                },
                "id": null
            }))
        }
    }
}
