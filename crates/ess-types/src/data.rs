use serde::{Deserialize, Serialize};

/// Status codes shared by every sensor reading, controller-protocol reply,
/// and command-precondition failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ResponseCode {
    Ok = 0,
    NotConfigured = 1,
    NotStarted = 2,
    AlreadyStarted = 3,
    InvalidConfiguration = 4,
    DeviceReadError = 10,
}

/// A single scalar value decoded from one sensor-protocol field.
///
/// Decoders never leak wire sentinels (`9999.9990`, `-1.00`, direction
/// `999`, …) past this boundary: they are converted to `Float(NaN)` here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Float(f64),
    Int(i64),
    Str(String),
}

impl Scalar {
    pub fn as_f64(&self) -> f64 {
        match self {
            Scalar::Float(v) => *v,
            Scalar::Int(v) => *v as f64,
            Scalar::Str(_) => f64::NAN,
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            Scalar::Int(v) => *v,
            Scalar::Float(v) => *v as i64,
            Scalar::Str(_) => 0,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Scalar::Str(s) => s.as_str(),
            _ => "",
        }
    }
}

/// The ephemeral record emitted by a device supervisor for every decoded
/// (or timed-out / errored) line — see spec §3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorReading {
    pub sensor_name: String,
    /// TAI unix seconds from a monotonic host clock.
    pub timestamp: f64,
    pub response_code: ResponseCode,
    pub sensor_telemetry: Vec<Scalar>,
}

impl SensorReading {
    pub fn ok(sensor_name: impl Into<String>, timestamp: f64, sensor_telemetry: Vec<Scalar>) -> Self {
        Self {
            sensor_name: sensor_name.into(),
            timestamp,
            response_code: ResponseCode::Ok,
            sensor_telemetry,
        }
    }

    pub fn error(sensor_name: impl Into<String>, timestamp: f64, response_code: ResponseCode) -> Self {
        Self {
            sensor_name: sensor_name.into(),
            timestamp,
            response_code,
            sensor_telemetry: Vec::new(),
        }
    }
}

// serde_repr is not part of the teacher's dependency stack; we hand-roll the
// int<->enum mapping instead of pulling in a new crate for one enum.
use std::fmt;

impl Serialize for ResponseCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(*self as i32)
    }
}

impl<'de> Deserialize<'de> for ResponseCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let code = i32::deserialize(deserializer)?;
        ResponseCode::try_from(code).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<i32> for ResponseCode {
    type Error = InvalidResponseCode;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ResponseCode::Ok),
            1 => Ok(ResponseCode::NotConfigured),
            2 => Ok(ResponseCode::NotStarted),
            3 => Ok(ResponseCode::AlreadyStarted),
            4 => Ok(ResponseCode::InvalidConfiguration),
            10 => Ok(ResponseCode::DeviceReadError),
            other => Err(InvalidResponseCode(other)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InvalidResponseCode(pub i32);

impl fmt::Display for InvalidResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized response code: {}", self.0)
    }
}

impl std::error::Error for InvalidResponseCode {}
