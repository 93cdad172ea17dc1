//! HX85A / HX85BA humidity processors (§4.D), grounded on
//! `processor/base_hx85_processor.py`, `hx85_a_processor.py`,
//! `hx85_ba_processor.py`.
//!
//! Pressure and temperature are published through the same fixed-width
//! array shape the multi-channel `TemperatureProcessor` uses; these
//! instruments only ever populate element 0, with every other slot NaN.
//! `array_width` defaults to 1 (`DeviceConfig.channels` is not normally set
//! for these sensor types) but honors a configured channel count if one is
//! present, matching `base_hx85_processor.py`'s `len(topics.tel_temperature
//! .DataType().temperatureItem)` against a fixed SAL-schema width.

use ess_types::comms::PASCALS_PER_MILLIBAR;
use ess_types::{EvtSensorStatus, ResponseCode, Scalar, TelDewPoint, TelPressure, TelRelativeHumidity, TelTemperature, Topics};

fn fixed_width_scalar_first(value: f64, width: usize) -> Vec<f64> {
    let mut item = vec![f64::NAN; width.max(1)];
    item[0] = value;
    item
}

pub struct Hx85aProcessor {
    name: String,
    location: String,
    array_width: usize,
}

impl Hx85aProcessor {
    pub fn new(name: impl Into<String>, location: impl Into<String>, array_width: Option<u32>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            array_width: array_width.unwrap_or(1) as usize,
        }
    }
}

impl ess_types::Processor for Hx85aProcessor {
    fn process_telemetry(
        &mut self,
        now: f64,
        response_code: ResponseCode,
        sensor_telemetry: &[Scalar],
        topics: &dyn Topics,
    ) {
        let isok = response_code == ResponseCode::Ok;
        let (rh, t, dp) = if isok {
            (
                sensor_telemetry.first().map(Scalar::as_f64).unwrap_or(f64::NAN),
                sensor_telemetry.get(1).map(Scalar::as_f64).unwrap_or(f64::NAN),
                sensor_telemetry.get(2).map(Scalar::as_f64).unwrap_or(f64::NAN),
            )
        } else {
            (f64::NAN, f64::NAN, f64::NAN)
        };

        topics.tel_relative_humidity(TelRelativeHumidity {
            sensor_name: self.name.clone(),
            timestamp: now,
            relative_humidity_item: rh,
            location: self.location.clone(),
        });
        topics.tel_dew_point(TelDewPoint {
            sensor_name: self.name.clone(),
            timestamp: now,
            dew_point_item: dp,
            location: self.location.clone(),
        });
        topics.tel_temperature(TelTemperature {
            sensor_name: self.name.clone(),
            timestamp: now,
            temperature_item: if isok {
                fixed_width_scalar_first(t, self.array_width)
            } else {
                vec![f64::NAN; self.array_width.max(1)]
            },
            num_channels: 1,
            location: self.location.clone(),
        });
        topics.evt_sensor_status(EvtSensorStatus {
            sensor_name: self.name.clone(),
            sensor_status: 0,
            server_status: response_code as i32,
        });
    }
}

pub struct Hx85baProcessor {
    name: String,
    location: String,
    array_width: usize,
}

impl Hx85baProcessor {
    pub fn new(name: impl Into<String>, location: impl Into<String>, array_width: Option<u32>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            array_width: array_width.unwrap_or(1) as usize,
        }
    }
}

impl ess_types::Processor for Hx85baProcessor {
    fn process_telemetry(
        &mut self,
        now: f64,
        response_code: ResponseCode,
        sensor_telemetry: &[Scalar],
        topics: &dyn Topics,
    ) {
        let isok = response_code == ResponseCode::Ok;
        let (rh, t, p_pa, dp) = if isok {
            let p_mbar = sensor_telemetry.get(2).map(Scalar::as_f64).unwrap_or(f64::NAN);
            (
                sensor_telemetry.first().map(Scalar::as_f64).unwrap_or(f64::NAN),
                sensor_telemetry.get(1).map(Scalar::as_f64).unwrap_or(f64::NAN),
                p_mbar * PASCALS_PER_MILLIBAR,
                sensor_telemetry.get(3).map(Scalar::as_f64).unwrap_or(f64::NAN),
            )
        } else {
            (f64::NAN, f64::NAN, f64::NAN, f64::NAN)
        };

        topics.tel_relative_humidity(TelRelativeHumidity {
            sensor_name: self.name.clone(),
            timestamp: now,
            relative_humidity_item: rh,
            location: self.location.clone(),
        });
        topics.tel_dew_point(TelDewPoint {
            sensor_name: self.name.clone(),
            timestamp: now,
            dew_point_item: dp,
            location: self.location.clone(),
        });
        topics.tel_pressure(TelPressure {
            sensor_name: self.name.clone(),
            timestamp: now,
            pressure_item: if isok {
                fixed_width_scalar_first(p_pa, self.array_width)
            } else {
                vec![f64::NAN; self.array_width.max(1)]
            },
            num_channels: 1,
            location: self.location.clone(),
        });
        topics.tel_temperature(TelTemperature {
            sensor_name: self.name.clone(),
            timestamp: now,
            temperature_item: if isok {
                fixed_width_scalar_first(t, self.array_width)
            } else {
                vec![f64::NAN; self.array_width.max(1)]
            },
            num_channels: 1,
            location: self.location.clone(),
        });
        topics.evt_sensor_status(EvtSensorStatus {
            sensor_name: self.name.clone(),
            sensor_status: 0,
            server_status: response_code as i32,
        });
    }
}
