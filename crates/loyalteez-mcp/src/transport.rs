//! Newline-delimited JSON-RPC transport
//!
//! One request per line in, one response per line out. Generic over the
//! reader and writer so tests can drive it through in-memory pipes; the
//! binary wires it to stdin and stdout.

use crate::server::McpServer;
use crate::types::{McpError, McpRequest, McpResponse, RequestId};
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

/// Transport failures. Malformed input is answered, not raised.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Answer one input line. `None` for blank lines and notifications.
pub async fn handle_line(server: &McpServer, line: &str) -> Option<McpResponse> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let message: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            warn!("Unparseable message: {}", e);
            return Some(McpResponse::error(RequestId::Null, McpError::parse_error(e)));
        }
    };

    match serde_json::from_value::<McpRequest>(message.clone()) {
        Ok(request) => server.handle_request(request).await,
        Err(e) => {
            let id = message
                .get("id")
                .cloned()
                .and_then(|id| serde_json::from_value::<RequestId>(id).ok());
            // Malformed notifications stay unanswered.
            let id = id?;
            warn!("Invalid request: {}", e);
            Some(McpResponse::error(id, McpError::invalid_request()))
        }
    }
}

/// Serve requests from `reader` until end of input.
pub async fn serve<R, W>(server: &McpServer, reader: R, mut writer: W) -> Result<(), TransportError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    info!("Serving MCP over newline-delimited JSON-RPC");

    while let Some(line) = lines.next_line().await? {
        let Some(response) = handle_line(server, &line).await else {
            continue;
        };
        let encoded = serde_json::to_string(&response)?;
        writer.write_all(encoded.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }

    debug!("Input closed");
    Ok(())
}

/// Serve on the process stdin and stdout.
pub async fn serve_stdio(server: &McpServer) -> Result<(), TransportError> {
    serve(server, tokio::io::stdin(), tokio::io::stdout()).await
}
