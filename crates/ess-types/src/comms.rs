//! Wire types for the controller protocol (spec §4.E, §6): line-delimited
//! JSON request/response multiplexed with streaming telemetry frames over
//! one TCP connection.

use serde::{Deserialize, Serialize};

use crate::data::{ResponseCode, SensorReading};

pub const CONTROLLER_PORT: u16 = 5000;
pub const DISCONNECTED_VALUE: &str = "9999.9990";
pub const PASCALS_PER_MILLIBAR: f64 = 100.0;

/// Client → server command names (§4.E).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Configure,
    Start,
    Stop,
    Disconnect,
    Exit,
}

/// Client → server request frame: `{ "command": ..., "parameters": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub parameters: serde_json::Value,
}

/// Server → client telemetry frame: `{ "telemetry": { ... } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryFrame {
    pub telemetry: SensorReading,
}

/// Server → client command-response frame: `{ "response": <int> }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseFrame {
    pub response: ResponseCode,
}

/// Either frame shape a client may see on the wire, discriminated by which
/// key is present rather than an explicit tag — matching the wire format in
/// §4.E, which has no envelope discriminator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerFrame {
    Telemetry(TelemetryFrame),
    Response(ResponseFrame),
}

impl ServerFrame {
    pub fn response(code: ResponseCode) -> Self {
        ServerFrame::Response(ResponseFrame { response: code })
    }

    pub fn telemetry(reading: SensorReading) -> Self {
        ServerFrame::Telemetry(TelemetryFrame { telemetry: reading })
    }
}
