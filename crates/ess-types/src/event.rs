//! Topic payload types — the "explicit interface...with one method per
//! topic listed in §6" that spec §9 asks for in place of the original's
//! dynamically-shaped topics object. See `plugin::Topics` for the trait.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelTemperature {
    pub sensor_name: String,
    pub timestamp: f64,
    pub temperature_item: Vec<f64>,
    pub num_channels: u32,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelRelativeHumidity {
    pub sensor_name: String,
    pub timestamp: f64,
    pub relative_humidity_item: f64,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelDewPoint {
    pub sensor_name: String,
    pub timestamp: f64,
    pub dew_point_item: f64,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelPressure {
    pub sensor_name: String,
    pub timestamp: f64,
    pub pressure_item: Vec<f64>,
    pub num_channels: u32,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelAirFlow {
    pub sensor_name: String,
    pub timestamp: f64,
    pub location: String,
    pub direction: f64,
    pub direction_std_dev: f64,
    pub speed: f64,
    pub speed_std_dev: f64,
    pub max_speed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelAirTurbulence {
    pub sensor_name: String,
    pub timestamp: f64,
    pub location: String,
    pub speed: [f64; 3],
    pub speed_magnitude: f64,
    pub speed_max_magnitude: f64,
    pub speed_std_dev: [f64; 3],
    pub sonic_temperature: f64,
    pub sonic_temperature_std_dev: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelElectricFieldStrength {
    pub sensor_name: String,
    pub timestamp: f64,
    pub location: String,
    pub strength: f64,
    pub strength_std_dev: f64,
    pub strength_max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelLightningStrikeStatus {
    pub sensor_name: String,
    pub timestamp: f64,
    pub close_strike_rate: f64,
    pub total_strike_rate: f64,
    pub close_alarm_status: f64,
    pub severe_alarm_status: f64,
    pub heading: f64,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelSpectrumAnalyzer {
    pub sensor_name: String,
    pub location: String,
    pub start_frequency: f64,
    pub stop_frequency: f64,
    pub spectrum: Vec<f64>,
    pub timestamp: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelParticulateMatter {
    pub sensor_name: String,
    pub timestamp: f64,
    pub location: String,
    /// The 16 numeric fields of the 19-element SPS30 reading (name,
    /// timestamp, and location are carried separately above).
    pub values: [f64; 16],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvtSensorStatus {
    pub sensor_name: String,
    pub sensor_status: i64,
    pub server_status: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvtLightningStrike {
    pub sensor_name: String,
    pub corrected_distance: f64,
    pub uncorrected_distance: f64,
    pub bearing: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvtHighElectricField {
    pub sensor_name: String,
    pub strength: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvtPrecipitation {
    pub sensor_name: String,
    pub timestamp: f64,
    pub raining: bool,
}

/// One SNMP-walked field's value (§4.F.3 step 3): either a scalar leaf, or
/// — for an indexed MIB table whose topic field is array-typed — every
/// leaf under that field's OID prefix, in index order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SnmpFieldValue {
    Scalar(crate::data::Scalar),
    Array(Vec<crate::data::Scalar>),
}

/// The device-type-specific SNMP telemetry topics (§4.D, §4.F.3): `pdu`,
/// `xups`, and `schneiderPm5xxx` each publish a dictionary of MIB-derived
/// fields rather than a fixed set of named columns, since the three device
/// types' MIB subtrees don't share a schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelSnmpDevice {
    pub sensor_name: String,
    pub timestamp: f64,
    pub system_description: String,
    pub fields: std::collections::BTreeMap<String, SnmpFieldValue>,
}
