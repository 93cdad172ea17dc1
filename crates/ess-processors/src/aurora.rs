//! Aurora cloud-sensor processor (§4.D), grounded on
//! `processor/aurora_processor.py`.
//!
//! Light and rain level are decoded but, per §9 Open Question (ii), not
//! published on any topic; they stay in `sensor_telemetry` for forward
//! compatibility only.

use ess_types::{EvtSensorStatus, ResponseCode, Scalar, TelTemperature, Topics};

pub struct AuroraProcessor {
    name: String,
    location: String,
}

impl AuroraProcessor {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }
}

impl ess_types::Processor for AuroraProcessor {
    fn process_telemetry(
        &mut self,
        now: f64,
        response_code: ResponseCode,
        sensor_telemetry: &[Scalar],
        topics: &dyn Topics,
    ) {
        let ambient = sensor_telemetry.get(1).map(Scalar::as_f64).unwrap_or(f64::NAN);
        let sky = sensor_telemetry.get(2).map(Scalar::as_f64).unwrap_or(f64::NAN);
        let clarity = sensor_telemetry.get(3).map(Scalar::as_f64).unwrap_or(f64::NAN);
        let alarm = sensor_telemetry.get(6).map(Scalar::as_i64).unwrap_or(0);

        topics.evt_sensor_status(EvtSensorStatus {
            sensor_name: self.name.clone(),
            sensor_status: alarm,
            server_status: response_code as i32,
        });
        topics.tel_temperature(TelTemperature {
            sensor_name: self.name.clone(),
            timestamp: now,
            temperature_item: vec![ambient, sky, clarity],
            num_channels: 3,
            location: self.location.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ess_types::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTopics {
        temperature: Mutex<Vec<TelTemperature>>,
        status: Mutex<Vec<EvtSensorStatus>>,
    }

    impl Topics for RecordingTopics {
        fn tel_temperature(&self, item: TelTemperature) {
            self.temperature.lock().unwrap().push(item);
        }
        fn tel_relative_humidity(&self, _item: TelRelativeHumidity) {}
        fn tel_dew_point(&self, _item: TelDewPoint) {}
        fn tel_pressure(&self, _item: TelPressure) {}
        fn tel_air_flow(&self, _item: TelAirFlow) {}
        fn tel_air_turbulence(&self, _item: TelAirTurbulence) {}
        fn tel_electric_field_strength(&self, _item: TelElectricFieldStrength) {}
        fn tel_lightning_strike_status(&self, _item: TelLightningStrikeStatus) {}
        fn tel_spectrum_analyzer(&self, _item: TelSpectrumAnalyzer) {}
        fn tel_particulate_matter(&self, _item: TelParticulateMatter) {}
        fn evt_sensor_status(&self, item: EvtSensorStatus) {
            self.status.lock().unwrap().push(item);
        }
        fn evt_lightning_strike(&self, _item: EvtLightningStrike) {}
        fn evt_high_electric_field(&self, _item: EvtHighElectricField) {}
        fn evt_precipitation(&self, _item: EvtPrecipitation) {}
        fn tel_pdu(&self, _item: TelSnmpDevice) {}
        fn tel_xups(&self, _item: TelSnmpDevice) {}
        fn tel_schneider_pm5xxx(&self, _item: TelSnmpDevice) {}
    }

    #[test]
    fn publishes_three_element_temperature_and_alarm_code() {
        let mut proc = AuroraProcessor::new("aurora1", "dome");
        let topics = RecordingTopics::default();
        let reading = vec![
            Scalar::Int(42),
            Scalar::Float(-5.12),
            Scalar::Float(-18.34),
            Scalar::Float(1.20),
            Scalar::Float(30.5),
            Scalar::Float(0.0),
            Scalar::Int(3),
        ];
        proc.process_telemetry(1.0, ResponseCode::Ok, &reading, &topics);
        let item = topics.temperature.lock().unwrap().pop().unwrap();
        assert_eq!(item.temperature_item, vec![-5.12, -18.34, 1.20]);
        assert_eq!(topics.status.lock().unwrap()[0].sensor_status, 3);
    }
}
