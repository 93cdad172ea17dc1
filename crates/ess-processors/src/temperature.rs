//! Multi-channel temperature processor (§4.D), grounded on
//! `processor/temperature_processor.py`.

use ess_types::{EvtSensorStatus, ResponseCode, Scalar, TelTemperature, Topics};

pub struct TemperatureProcessor {
    name: String,
    location: String,
    num_channels: u32,
}

impl TemperatureProcessor {
    pub fn new(name: impl Into<String>, location: impl Into<String>, num_channels: u32) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            num_channels,
        }
    }
}

impl ess_types::Processor for TemperatureProcessor {
    fn process_telemetry(
        &mut self,
        now: f64,
        response_code: ResponseCode,
        sensor_telemetry: &[Scalar],
        topics: &dyn Topics,
    ) {
        let mut temperature_item = vec![f64::NAN; self.num_channels as usize];
        if response_code == ResponseCode::Ok {
            for (slot, value) in temperature_item.iter_mut().zip(sensor_telemetry) {
                *slot = value.as_f64();
            }
        }
        // "unused" channels stay NaN regardless of what the wire sent.
        for (index, token) in self.location.split(',').enumerate() {
            if token.trim().eq_ignore_ascii_case("unused") {
                if let Some(slot) = temperature_item.get_mut(index) {
                    *slot = f64::NAN;
                }
            }
        }

        topics.tel_temperature(TelTemperature {
            sensor_name: self.name.clone(),
            timestamp: now,
            temperature_item,
            num_channels: self.num_channels,
            location: self.location.clone(),
        });
        topics.evt_sensor_status(EvtSensorStatus {
            sensor_name: self.name.clone(),
            sensor_status: 0,
            server_status: response_code as i32,
        });
    }
}
