//! MCP lifecycle and tool-call handlers.

use super::{dispatch_method, INVALID_PARAMS};
use crate::server::AppState;
use crate::tools;
use crate::wrapper::wrap_response;
use dtmicroscope_core::config::{AppConfig, ServerConfig};
use serde_json::{json, Value};
use tracing::{info, warn};

/// Answer the `initialize` handshake.
///
/// Echoes the client's protocol version when it sends one.
pub async fn initialize(state: &AppState, params: &Value) -> Value {
    let protocol_version = params
        .get("protocolVersion")
        .and_then(|v| v.as_str())
        .unwrap_or(ServerConfig::MCP_PROTOCOL_VERSION);

    if let Some(client) = params.get("clientInfo") {
        info!("MCP client connected: {}", client);
    }
    state.set_protocol_version(protocol_version).await;

    json!({
        "protocolVersion": protocol_version,
        "capabilities": { "tools": {} },
        "serverInfo": {
            "name": AppConfig::SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
        "instructions": "Call initialize_microscope before any other microscope tool.",
    })
}

/// Run a `tools/call` request.
///
/// Tool failures are reported inside the result with `isError: true`;
/// only a malformed call (unknown tool, missing name) is a protocol error.
pub async fn call_tool(state: &AppState, params: &Value) -> Result<Value, (i32, String)> {
    let name = params
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| (INVALID_PARAMS, "Missing required parameter: name".to_string()))?;

    if !tools::is_tool(name) {
        return Err((INVALID_PARAMS, format!("Unknown tool: {}", name)));
    }

    let arguments = match params.get("arguments") {
        None | Some(Value::Null) => json!({}),
        Some(args) if args.is_object() => args.clone(),
        Some(_) => {
            return Err((INVALID_PARAMS, "Tool arguments must be an object".to_string()));
        }
    };

    match dispatch_method(state, name, &arguments).await {
        Ok(value) => Ok(tool_result(wrap_response(name, value), false)),
        Err(e) => {
            warn!("Tool {} failed: {}", name, e);
            Ok(tool_result(json!({ "error": e.to_body() }), true))
        }
    }
}

/// Build a `CallToolResult`: text content always, structured content for objects.
fn tool_result(payload: Value, is_error: bool) -> Value {
    let text = match &payload {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    let mut result = json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    });
    if payload.is_object() {
        result["structuredContent"] = payload;
    }
    result
}
