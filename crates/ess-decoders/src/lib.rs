//! Sensor decoder registry (spec §4.A): one decoder per wire format, each
//! turning a single line into an ordered sequence of typed scalars.
//!
//! Per §9, the registry is populated by explicit `register` calls made at
//! program start (see `ess-daemon`'s `main.rs`), not by constructor-time
//! side effects or trait-object introspection.
//!
//! Lines reach a decoder after the line-framing and character-set decoding
//! done by the device supervisor (§4.C): raw bytes are decoded as Latin-1
//! (ISO-8859-1 is a strict superset of the 7-bit ASCII every other decoder
//! here expects, and round-trips every byte value 0-255), so a decoder's
//! `&str` input has exactly one `char` per wire byte.

mod aurora;
mod csat3b;
mod efm100c;
mod hx85a;
mod hx85ba;
mod ld250;
mod sps30;
mod temperature;
mod windsonic;

pub use aurora::AuroraDecoder;
pub use csat3b::Csat3bDecoder;
pub use efm100c::Efm100cDecoder;
pub use hx85a::Hx85aDecoder;
pub use hx85ba::Hx85baDecoder;
pub use ld250::Ld250Decoder;
pub use sps30::Sps30Decoder;
pub use temperature::TemperatureDecoder;
pub use windsonic::WindsonicDecoder;

use std::collections::HashMap;

use ess_types::{Scalar, SensorType};

/// Errors a decoder raises for input it can prove is corrupt once it has
/// seen at least one complete frame (§4.A, §7 `UnparseableLine`).
///
/// Partial prefixes and checksum/signature mismatches are *not* errors:
/// those produce an all-NaN reading instead (§4.A, §7 `MalformedLine`,
/// `ChecksumFailure`).
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum DecodeError {
    #[error("line does not match the expected frame shape: {0}")]
    UnparseableLine(String),
    #[error("field {0} contained more than one '=' separator")]
    DuplicateEquals(usize),
}

/// A single decoder: one wire format in, one typed scalar sequence out.
pub trait Decoder: Send + Sync {
    /// Decode a single line (terminator already stripped by the caller).
    ///
    /// An empty line is the device supervisor's sentinel for "no data was
    /// read this cycle" (§4.C injected error state) — every decoder treats
    /// it the same as a maximally-truncated frame and returns an all-NaN
    /// record rather than erroring.
    fn decode(&self, line: &str) -> Result<Vec<Scalar>, DecodeError>;

    /// Declared output arity, used by the property tests in spec §8.1.
    ///
    /// Decoders whose frame shape is fixed for the lifetime of the decoder
    /// (everything but `Ld250Decoder`) always return a `Vec` of exactly
    /// this length.
    fn arity(&self) -> usize;

    /// Line terminator the device supervisor should frame on (§4.C:
    /// "terminator is decoder-specific; default CR LF"). Only the CSAT3B
    /// sonic anemometer deviates, terminating frames on a bare CR.
    fn terminator(&self) -> &'static [u8] {
        b"\r\n"
    }
}

type DecoderFactory = fn() -> Box<dyn Decoder>;

/// Process-wide `SensorType -> decoder factory` mapping (§4.A). Populated
/// once at start and read-only afterwards (§5, "process-wide registries").
#[derive(Default)]
pub struct DecoderRegistry {
    factories: HashMap<SensorType, DecoderFactory>,
}

impl DecoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, sensor_type: SensorType, factory: DecoderFactory) {
        self.factories.insert(sensor_type, factory);
    }

    pub fn make(&self, sensor_type: SensorType) -> Option<Box<dyn Decoder>> {
        self.factories.get(&sensor_type).map(|f| f())
    }

    /// Registers every built-in decoder this crate provides. Device-type
    /// SNMP and spectrum-analyzer "sensor types" have no line decoder (their
    /// data clients parse their own wire shapes directly) and are skipped.
    ///
    /// Temperature decoders are keyed by channel count at the call site
    /// (`ess-daemon`'s data-client setup), since `num_channels` is a
    /// per-device config field, not a process-wide constant; callers that
    /// need a non-default channel count construct `TemperatureDecoder`
    /// directly instead of going through this registry.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(SensorType::Temperature, || Box::new(TemperatureDecoder::new(1)));
        registry.register(SensorType::Hx85A, || Box::new(Hx85aDecoder));
        registry.register(SensorType::Hx85Ba, || Box::new(Hx85baDecoder));
        registry.register(SensorType::Csat3B, || Box::new(Csat3bDecoder));
        registry.register(SensorType::Windsonic, || Box::new(WindsonicDecoder));
        registry.register(SensorType::Efm100C, || Box::new(Efm100cDecoder));
        registry.register(SensorType::Ld250, || Box::new(Ld250Decoder));
        registry.register(SensorType::Aurora, || Box::new(AuroraDecoder));
        registry.register(SensorType::Sps30, || Box::new(Sps30Decoder));
        registry
    }
}

/// Shared helper: split a comma-delimited line into per-field `key=value`
/// pairs, tolerating fields with no `=` at all (the leftover tail of a
/// `key=value` pair truncated by a mid-stream connect — see §4.A's
/// temperature-decoder "truncated frame" example) but erroring on a field
/// with more than one `=` (§4.A's explicit duplicate-equals rule).
///
/// `None` entries are noise to be skipped by the caller, not data.
pub(crate) fn split_key_value_fields(line: &str) -> Result<Vec<Option<(&str, &str)>>, DecodeError> {
    line.split(',')
        .enumerate()
        .map(|(i, field)| match field.matches('=').count() {
            0 => Ok(None),
            1 => {
                let mut parts = field.splitn(2, '=');
                let key = parts.next().unwrap_or("");
                let value = parts.next().unwrap_or("");
                Ok(Some((key, value)))
            }
            _ => Err(DecodeError::DuplicateEquals(i)),
        })
        .collect()
}

/// Magnus-formula dew point (GLOSSARY, §4.A HX85BA). `rh` is relative
/// humidity in percent, `t` is temperature in degrees Celsius. NaN
/// propagates through: a missing RH or T yields a NaN dew point.
pub fn magnus_dew_point(rh: f64, t: f64) -> f64 {
    const BETA: f64 = 17.62;
    const LAMBDA: f64 = 243.12;
    let f = (rh / 100.0).ln() + BETA * t / (LAMBDA + t);
    LAMBDA * f / (BETA - f)
}

/// Parses a field value, collapsing the wire disconnected-channel sentinel
/// `9999.9990` to NaN (§4.A, shared by the temperature and humidity
/// decoders). A value that fails to parse at all is also NaN rather than
/// an error — the decoder contract only raises for structural violations.
pub(crate) fn parse_sentinel_f64(value: &str) -> f64 {
    if value == ess_types::DISCONNECTED_VALUE {
        f64::NAN
    } else {
        value.trim().parse().unwrap_or(f64::NAN)
    }
}
