//! Tool catalog advertised through `tools/list`.

use serde_json::{json, Value};

/// Names of every tool the server exposes.
pub const TOOL_NAMES: [&str; 5] = [
    "initialize_microscope",
    "get_scan_area",
    "perform_full_scan",
    "scan_line",
    "move_tip",
];

pub fn is_tool(name: &str) -> bool {
    TOOL_NAMES.contains(&name)
}

/// The `tools/list` result.
pub fn list_tools() -> Value {
    json!({
        "tools": [
            {
                "name": "initialize_microscope",
                "description": "Initializes the digital twin microscope. Supported types: 'AFM', 'STEM', 'dummy' (only AFM is currently available). Replaces any existing session.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "type": {
                            "type": "string",
                            "enum": ["AFM", "STEM", "dummy"],
                            "default": "AFM"
                        },
                        "data_path": {
                            "type": "string",
                            "description": "Dataset file (.json) or synthetic:NXxNY"
                        }
                    }
                }
            },
            {
                "name": "get_scan_area",
                "description": "Returns the physical boundaries (x_min, x_max, y_min, y_max) of the sample and the current tip position.",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "perform_full_scan",
                "description": "Performs a full scan of the sample. Returns the array data as a nested list, its shape, and dtype.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "channels": channels_schema(),
                        "direction": direction_schema()
                    }
                }
            },
            {
                "name": "scan_line",
                "description": "Scans a single line. coordinate is the fixed position on the axis perpendicular to the scan direction.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "direction": direction_schema(),
                        "coordinate": { "type": "number" },
                        "channels": channels_schema()
                    },
                    "required": ["direction", "coordinate"]
                }
            },
            {
                "name": "move_tip",
                "description": "Moves the microscope tip to a specific (x, y) location.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "x": { "type": "number" },
                        "y": { "type": "number" }
                    },
                    "required": ["x", "y"]
                }
            }
        ]
    })
}

fn channels_schema() -> Value {
    json!({
        "type": ["array", "null"],
        "items": { "type": "string" },
        "description": "Channel names; omit for all channels"
    })
}

fn direction_schema() -> Value {
    json!({
        "type": "string",
        "enum": ["horizontal", "vertical"],
        "default": "horizontal"
    })
}
