//! JSON-RPC request handlers, split by domain.

mod mcp;
mod microscope;

use crate::server::AppState;
use crate::tools;
use crate::wrapper::wrap_response;
use dtmicroscope_core::MicroscopeError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, warn};

// ============================================================================
// JSON-RPC types
// ============================================================================

/// JSON-RPC 2.0 request structure.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Option<Value>,
}

/// JSON-RPC 2.0 error structure.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: String) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data: None,
            }),
            id,
        }
    }

    /// Error response carrying the `{kind, message}` body as `data`.
    pub fn from_microscope_error(id: Option<Value>, err: &MicroscopeError) -> Self {
        let mut response = Self::error(id, err.to_rpc_error_code(), err.to_string());
        if let Some(error) = response.error.as_mut() {
            error.data = serde_json::to_value(err.to_body()).ok();
        }
        response
    }
}

pub(crate) const PARSE_ERROR: i32 = -32700;
pub(crate) const INVALID_REQUEST: i32 = -32600;
pub(crate) const METHOD_NOT_FOUND: i32 = -32601;
pub(crate) const INVALID_PARAMS: i32 = -32602;

// ============================================================================
// Parameter extraction helpers
// ============================================================================

fn lookup<'a>(params: &'a Value, name: &str, alias: &str) -> Option<&'a Value> {
    params
        .get(name)
        .or_else(|| params.get(alias))
        .filter(|v| !v.is_null())
}

fn invalid_param(name: &str, expected: &str) -> MicroscopeError {
    MicroscopeError::InvalidParams {
        message: format!("Parameter '{}' must be {}", name, expected),
    }
}

/// Extract an optional string parameter; `null` counts as absent.
pub(crate) fn get_str_param<'a>(
    params: &'a Value,
    name: &str,
    alias: &str,
) -> dtmicroscope_core::Result<Option<&'a str>> {
    match lookup(params, name, alias) {
        None => Ok(None),
        Some(v) => v.as_str().map(Some).ok_or_else(|| invalid_param(name, "a string")),
    }
}

/// Extract a required numeric parameter or return an error.
pub(crate) fn require_f64_param(
    params: &Value,
    name: &str,
    alias: &str,
) -> dtmicroscope_core::Result<f64> {
    let value = lookup(params, name, alias).ok_or_else(|| MicroscopeError::InvalidParams {
        message: format!("Missing required parameter: {}", name),
    })?;
    value.as_f64().ok_or_else(|| invalid_param(name, "a number"))
}

/// Extract an optional list of strings.
pub(crate) fn get_str_list_param(
    params: &Value,
    name: &str,
    alias: &str,
) -> dtmicroscope_core::Result<Option<Vec<String>>> {
    let Some(value) = lookup(params, name, alias) else {
        return Ok(None);
    };
    let items = value
        .as_array()
        .ok_or_else(|| invalid_param(name, "a list of strings"))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(String::from)
                .ok_or_else(|| invalid_param(name, "a list of strings"))
        })
        .collect::<dtmicroscope_core::Result<Vec<_>>>()
        .map(Some)
}

// ============================================================================
// Message entry point
// ============================================================================

/// Handle one raw line from the transport.
///
/// Returns `None` for notifications, which get no response.
pub async fn handle_message(state: &AppState, line: &str) -> Option<JsonRpcResponse> {
    let value: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            warn!("Failed to parse request: {}", e);
            return Some(JsonRpcResponse::error(
                None,
                PARSE_ERROR,
                format!("Parse error: {}", e),
            ));
        }
    };

    // Only a missing id marks a notification; MCP forbids a null one.
    if matches!(value.get("id"), Some(Value::Null)) {
        return Some(JsonRpcResponse::error(
            None,
            INVALID_REQUEST,
            "Invalid request: id must not be null".to_string(),
        ));
    }

    let id = value.get("id").cloned();
    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(r) => r,
        Err(e) => {
            return Some(JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                format!("Invalid request: {}", e),
            ));
        }
    };

    if request.id.is_none() {
        debug!("Notification: {}", request.method);
        return None;
    }

    Some(handle_request(state, request).await)
}

/// Route a request to the protocol or tool handlers.
async fn handle_request(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let method = request.method.as_str();
    let params = request.params.unwrap_or(Value::Object(Default::default()));
    let id = request.id;

    debug!("RPC call: {}({:?})", method, params);

    match method {
        "initialize" => JsonRpcResponse::success(id, mcp::initialize(state, &params).await),
        "ping" => JsonRpcResponse::success(id, json!({})),
        "tools/list" => JsonRpcResponse::success(id, tools::list_tools()),
        "tools/call" => match mcp::call_tool(state, &params).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err((code, message)) => JsonRpcResponse::error(id, code, message),
        },
        _ if tools::is_tool(method) => match dispatch_method(state, method, &params).await {
            Ok(value) => JsonRpcResponse::success(id, wrap_response(method, value)),
            Err(e) => {
                error!("RPC error for {}: {}", method, e);
                JsonRpcResponse::from_microscope_error(id, &e)
            }
        },
        _ => JsonRpcResponse::error(
            id,
            METHOD_NOT_FOUND,
            format!("Method not found: {}", method),
        ),
    }
}

// ============================================================================
// Method dispatcher
// ============================================================================

/// Dispatch a tool call to the microscope handlers.
pub(crate) async fn dispatch_method(
    state: &AppState,
    method: &str,
    params: &Value,
) -> dtmicroscope_core::Result<Value> {
    match method {
        "initialize_microscope" => microscope::initialize_microscope(state, params).await,
        "get_scan_area" => microscope::get_scan_area(state, params).await,
        "perform_full_scan" => microscope::perform_full_scan(state, params).await,
        "scan_line" => microscope::scan_line(state, params).await,
        "move_tip" => microscope::move_tip(state, params).await,
        _ => Err(MicroscopeError::InvalidParams {
            message: format!("Unknown tool: {}", method),
        }),
    }
}
