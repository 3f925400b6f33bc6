//! Microscope tool handlers.

use super::{get_str_list_param, get_str_param, require_f64_param};
use crate::server::AppState;
use dtmicroscope_core::{ChannelSelection, InstrumentKind, ScanDirection};
use serde_json::Value;

pub async fn initialize_microscope(
    state: &AppState,
    params: &Value,
) -> dtmicroscope_core::Result<Value> {
    let kind = match get_str_param(params, "type", "kind")? {
        Some(name) => InstrumentKind::parse(name)?,
        None => InstrumentKind::default(),
    };
    let data_path = get_str_param(params, "data_path", "dataPath")?;

    let response = state.api.initialize(kind, data_path).await?;
    Ok(serde_json::to_value(response)?)
}

pub async fn get_scan_area(state: &AppState, _params: &Value) -> dtmicroscope_core::Result<Value> {
    let response = state.api.get_scan_area().await?;
    Ok(serde_json::to_value(response)?)
}

pub async fn perform_full_scan(
    state: &AppState,
    params: &Value,
) -> dtmicroscope_core::Result<Value> {
    let channels = ChannelSelection::from_names(get_str_list_param(params, "channels", "channels")?)?;
    let direction = match get_str_param(params, "direction", "direction")? {
        Some(d) => ScanDirection::parse(d)?,
        None => ScanDirection::default(),
    };

    let response = state.api.perform_full_scan(channels, direction).await?;
    Ok(serde_json::to_value(response)?)
}

pub async fn scan_line(state: &AppState, params: &Value) -> dtmicroscope_core::Result<Value> {
    let direction = match get_str_param(params, "direction", "direction")? {
        Some(d) => ScanDirection::parse(d)?,
        None => {
            return Err(dtmicroscope_core::MicroscopeError::InvalidParams {
                message: "Missing required parameter: direction".to_string(),
            })
        }
    };
    let coordinate = require_f64_param(params, "coordinate", "coord")?;
    let channels = ChannelSelection::from_names(get_str_list_param(params, "channels", "channels")?)?;

    let response = state.api.scan_line(direction, coordinate, channels).await?;
    Ok(serde_json::to_value(response)?)
}

pub async fn move_tip(state: &AppState, params: &Value) -> dtmicroscope_core::Result<Value> {
    let x = require_f64_param(params, "x", "x")?;
    let y = require_f64_param(params, "y", "y")?;

    let response = state.api.move_tip(x, y).await?;
    Ok(serde_json::to_value(response)?)
}
