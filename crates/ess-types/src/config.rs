//! Configuration types for the sensor-telemetry aggregator.
//!
//! These are plain `serde` structs over a configuration tree the caller has
//! already validated and parsed off the wire (§6); this crate does not read
//! files or watch for changes.

use serde::{Deserialize, Serialize};

/// Closed tag identifying a wire protocol (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorType {
    Temperature,
    #[serde(rename = "HX85A")]
    Hx85A,
    #[serde(rename = "HX85BA")]
    Hx85Ba,
    #[serde(rename = "CSAT3B")]
    Csat3B,
    Windsonic,
    #[serde(rename = "EFM100C")]
    Efm100C,
    #[serde(rename = "LD250")]
    Ld250,
    Aurora,
    #[serde(rename = "SPS30")]
    Sps30,
    SpectrumAnalyzer,
    ThermalScanner,
    /// SNMP-managed power distribution unit.
    #[serde(rename = "pdu")]
    SnmpPdu,
    /// SNMP-managed uninterruptible power supply.
    #[serde(rename = "xups")]
    SnmpXups,
    /// SNMP-managed Schneider PM5xxx power meter.
    #[serde(rename = "schneiderPm5xxx")]
    SnmpSchneiderPm5xxx,
}

impl SensorType {
    /// True for the three SNMP device kinds, which share a data client and
    /// MIB-walk machinery instead of a line decoder.
    pub fn is_snmp(self) -> bool {
        matches!(
            self,
            SensorType::SnmpPdu | SensorType::SnmpXups | SensorType::SnmpSchneiderPm5xxx
        )
    }
}

fn default_baud_rate() -> u32 {
    19200
}

fn default_rate_limit() -> f64 {
    0.5
}

fn default_max_read_timeouts() -> u32 {
    5
}

fn default_connect_timeout() -> f64 {
    60.0
}

/// One physical sensor, as configured at load time (§3). Immutable for the
/// lifetime of the owning data client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    #[serde(alias = "device_name")]
    pub name: String,
    pub sensor_type: SensorType,
    /// Present for FTDI/Serial devices; absent for plain TCP, SNMP, and
    /// spectrum-analyzer devices, which instead populate `host`/`port`.
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportFields>,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// Comma-separated per-channel location labels.
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_samples: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safe_interval: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default = "default_max_read_timeouts")]
    pub max_read_timeouts: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_timeout: Option<f64>,
    #[serde(default = "default_rate_limit")]
    pub rate_limit: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snmp_community: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freq_start_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freq_start_unit: Option<FrequencyUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freq_stop_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freq_stop_unit: Option<FrequencyUnit>,
}

/// Frequency unit for the spectrum-analyzer client's start/stop commands
/// (§4.F.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrequencyUnit {
    #[serde(rename = "GHz")]
    Ghz,
    #[serde(rename = "MHz")]
    Mhz,
    #[serde(rename = "kHz")]
    Khz,
    Hz,
}

impl FrequencyUnit {
    /// Multiplier to convert a value in this unit to Hz.
    pub fn to_hz_factor(self) -> f64 {
        match self {
            FrequencyUnit::Ghz => 1e9,
            FrequencyUnit::Mhz => 1e6,
            FrequencyUnit::Khz => 1e3,
            FrequencyUnit::Hz => 1.0,
        }
    }
}

impl DeviceConfig {
    /// Validates the "exactly one transport populated" invariant from §3
    /// and the `rate_limit` floor from §4.F.1.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit < 0.05 {
            return Err(ConfigError::RateLimitTooLow(self.rate_limit));
        }
        if matches!(self.sensor_type, SensorType::Temperature) && self.channels.is_none() {
            return Err(ConfigError::MissingField("channels"));
        }
        let has_transport = self.transport.is_some();
        let has_tcp = self.host.is_some();
        if has_transport == has_tcp {
            return Err(ConfigError::AmbiguousTransport);
        }
        Ok(())
    }
}

/// Transport-variant fields, flattened into `DeviceConfig` so the wire shape
/// stays `{ device_type: "FTDI"|"Serial", ftdi_id|serial_port, ... }` (§6)
/// rather than a nested object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "device_type", rename_all = "PascalCase")]
pub enum TransportFields {
    Ftdi { ftdi_id: String },
    Serial { serial_port: String },
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("rate_limit {0} is below the 0.05s floor")]
    RateLimitTooLow(f64),
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("exactly one of {{ftdi_id|serial_port}} or {{host, port}} must be populated")]
    AmbiguousTransport,
}

/// Top-level wire/file shape: `{ "devices": [ DeviceConfig, ... ] }` (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevicesConfig {
    pub devices: Vec<DeviceConfig>,
}

impl DevicesConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for device in &self.devices {
            device.validate()?;
        }
        Ok(())
    }
}
