//! Stdio server loop.
//!
//! Requests are handled strictly in arrival order: one line in, at most one
//! line out. Logging goes to stderr so stdout carries only protocol frames.

use crate::handlers::{handle_message, JsonRpcResponse, INVALID_REQUEST};
use crate::transport::{read_frame, write_frame, Frame};
use dtmicroscope_core::MicroscopeApi;
use std::io;
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

/// Application state shared across handlers.
pub struct AppState {
    /// Core API (session registry and microscope operations)
    pub api: MicroscopeApi,
    /// Protocol version agreed during the MCP handshake
    protocol_version: RwLock<Option<String>>,
}

impl AppState {
    pub fn new(api: MicroscopeApi) -> Self {
        Self {
            api,
            protocol_version: RwLock::new(None),
        }
    }

    pub async fn set_protocol_version(&self, version: &str) {
        *self.protocol_version.write().await = Some(version.to_string());
    }

    pub async fn protocol_version(&self) -> Option<String> {
        self.protocol_version.read().await.clone()
    }
}

/// Serve JSON-RPC messages from `reader` until EOF.
pub async fn serve<R, W>(
    state: &AppState,
    mut reader: R,
    mut writer: W,
    max_line_bytes: usize,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    info!("Serving MCP over stdio");

    loop {
        let frame = match read_frame(&mut reader, max_line_bytes).await {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            // The offending line was consumed; answer it and keep serving.
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!("Failed to read message: {}", e);
                let response = JsonRpcResponse::error(
                    None,
                    INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                );
                send(&mut writer, &response).await?;
                continue;
            }
            Err(e) => {
                error!("Input stream failed: {}", e);
                return Err(e.into());
            }
        };

        let response = match frame {
            Frame::Message(line) => handle_message(state, &line).await,
            Frame::Oversized => {
                warn!("Dropped message larger than {} bytes", max_line_bytes);
                Some(JsonRpcResponse::error(
                    None,
                    INVALID_REQUEST,
                    format!("Message exceeds {} bytes", max_line_bytes),
                ))
            }
        };

        if let Some(response) = response {
            send(&mut writer, &response).await?;
        }
    }

    match state.protocol_version().await {
        Some(version) => debug!("Input closed (protocol {}), shutting down", version),
        None => debug!("Input closed before handshake, shutting down"),
    }
    Ok(())
}

async fn send<W>(writer: &mut W, response: &JsonRpcResponse) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let line = match serde_json::to_string(response) {
        Ok(line) => line,
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            let fallback = JsonRpcResponse::error(
                response.id.clone(),
                -32603,
                format!("Internal error: {}", e),
            );
            serde_json::to_string(&fallback)?
        }
    };
    write_frame(writer, &line).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tokio::io::BufReader;

    async fn run(input: &str, max_line_bytes: usize) -> Vec<Value> {
        let state = AppState::new(
            MicroscopeApi::builder()
                .default_data_source("synthetic:4x3")
                .build(),
        );
        let mut out = Vec::new();
        serve(&state, BufReader::new(input.as_bytes()), &mut out, max_line_bytes)
            .await
            .unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_handshake_and_tool_flow() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#, "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#, "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"initialize_microscope","arguments":{}}}"#, "\n",
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"perform_full_scan","arguments":{"channels":["Phase"]}}}"#, "\n",
        );
        let responses = run(input, 1 << 20).await;

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[0]["result"]["serverInfo"]["name"], "AFM_mcp");
        assert_eq!(responses[1]["result"]["isError"], false);
        assert_eq!(
            responses[2]["result"]["structuredContent"]["shape"],
            serde_json::json!([1, 3, 4])
        );
    }

    #[tokio::test]
    async fn test_bad_lines_do_not_stop_the_loop() {
        let input = format!(
            "{}\n{{oops\n{}\n",
            "y".repeat(64),
            r#"{"jsonrpc":"2.0","id":9,"method":"ping"}"#
        );
        let responses = run(&input, 48).await;

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["error"]["code"], INVALID_REQUEST);
        assert!(responses[0]["id"].is_null());
        assert_eq!(responses[1]["error"]["code"], -32700);
        assert_eq!(responses[2]["id"], 9);
        assert!(responses[2]["result"].is_object());
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_answered() {
        let state = AppState::new(MicroscopeApi::new());
        let mut input = vec![0xff, 0xfe, b'\n'];
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":4,"method":"ping"}"#);
        input.push(b'\n');

        let mut out = Vec::new();
        serve(&state, BufReader::new(&input[..]), &mut out, 1024)
            .await
            .unwrap();

        let responses: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["error"]["code"], INVALID_REQUEST);
        assert_eq!(responses[1]["id"], 4);
    }

    /// Reader whose every poll fails, like stdin on a dead descriptor.
    struct BrokenInput;

    impl tokio::io::AsyncRead for BrokenInput {
        fn poll_read(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
            _buf: &mut tokio::io::ReadBuf<'_>,
        ) -> std::task::Poll<io::Result<()>> {
            std::task::Poll::Ready(Err(io::Error::other("input/output error")))
        }
    }

    impl AsyncBufRead for BrokenInput {
        fn poll_fill_buf(
            self: std::pin::Pin<&mut Self>,
            _cx: &mut std::task::Context<'_>,
        ) -> std::task::Poll<io::Result<&[u8]>> {
            std::task::Poll::Ready(Err(io::Error::other("input/output error")))
        }

        fn consume(self: std::pin::Pin<&mut Self>, _amt: usize) {}
    }

    #[tokio::test]
    async fn test_stream_failure_ends_serve() {
        let state = AppState::new(MicroscopeApi::new());
        let mut out = Vec::new();

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            serve(&state, BrokenInput, &mut out, 1024),
        )
        .await
        .expect("serve kept looping on a failed stream");

        assert!(result.is_err());
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_protocol_version_state() {
        let state = AppState::new(MicroscopeApi::new());
        assert_eq!(state.protocol_version().await, None);
        state.set_protocol_version("2024-11-05").await;
        assert_eq!(state.protocol_version().await.as_deref(), Some("2024-11-05"));
    }
}
