//! Response wrapping for tool callers.
//!
//! The core API returns typed records; callers of the tool surface expect
//! the shapes below. Confirmation tools answer with plain text; data tools
//! return their serialized record as is.

use serde_json::Value;

/// Shape a core API result into the payload returned for `method`.
pub fn wrap_response(method: &str, result: Value) -> Value {
    match method {
        // Text confirmations
        "initialize_microscope" | "move_tip" => match result.get("message") {
            Some(message) => message.clone(),
            None => result,
        },

        // Records already serialize in their caller-facing shape
        _ => result,
    }
}
