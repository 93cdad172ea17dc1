//! SPS30 particulate-matter processor (§4.D), grounded on
//! `processor/sps30_processor.py`.
//!
//! The decoder already drops the sensor-name field and replaces wire
//! sentinels with NaN (§4.A), so this processor's only job is slicing the
//! 19-element reading into the topic's 16-element numeric block.

use ess_types::{EvtSensorStatus, ResponseCode, Scalar, TelParticulateMatter, Topics};

pub struct Sps30Processor {
    name: String,
    location: String,
}

impl Sps30Processor {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }
}

impl ess_types::Processor for Sps30Processor {
    fn process_telemetry(
        &mut self,
        now: f64,
        response_code: ResponseCode,
        sensor_telemetry: &[Scalar],
        topics: &dyn Topics,
    ) {
        let isok = response_code == ResponseCode::Ok && sensor_telemetry.len() >= 19;
        let mut values = [f64::NAN; 16];
        if isok {
            for (slot, value) in values.iter_mut().zip(&sensor_telemetry[1..17]) {
                *slot = value.as_f64();
            }
        }

        topics.tel_particulate_matter(TelParticulateMatter {
            sensor_name: self.name.clone(),
            timestamp: now,
            location: self.location.clone(),
            values,
        });
        topics.evt_sensor_status(EvtSensorStatus {
            sensor_name: self.name.clone(),
            sensor_status: if isok { 0 } else { 1 },
            server_status: response_code as i32,
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
        particulate: Mutex<Vec<TelParticulateMatter>>,
        status: Mutex<Vec<EvtSensorStatus>>,
    }

    impl Topics for RecordingTopics {
        fn tel_temperature(&self, _item: TelTemperature) {}
        fn tel_relative_humidity(&self, _item: TelRelativeHumidity) {}
        fn tel_dew_point(&self, _item: TelDewPoint) {}
        fn tel_pressure(&self, _item: TelPressure) {}
        fn tel_air_flow(&self, _item: TelAirFlow) {}
        fn tel_air_turbulence(&self, _item: TelAirTurbulence) {}
        fn tel_electric_field_strength(&self, _item: TelElectricFieldStrength) {}
        fn tel_lightning_strike_status(&self, _item: TelLightningStrikeStatus) {}
        fn tel_spectrum_analyzer(&self, _item: TelSpectrumAnalyzer) {}
        fn tel_particulate_matter(&self, item: TelParticulateMatter) {
            self.particulate.lock().unwrap().push(item);
        }
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

    fn full_reading() -> Vec<Scalar> {
        let mut out = vec![Scalar::Float(1700000000.0)];
        out.extend((0..15).map(|i| Scalar::Float(i as f64)));
        out.push(Scalar::Float(0.6));
        out.push(Scalar::Str("dome".into()));
        out.push(Scalar::Str("OK".into()));
        out
    }

    #[test]
    fn slices_sixteen_numeric_fields() {
        let mut proc = Sps30Processor::new("sps1", "dome");
        let topics = RecordingTopics::default();
        proc.process_telemetry(1.0, ResponseCode::Ok, &full_reading(), &topics);
        let item = topics.particulate.lock().unwrap().pop().unwrap();
        assert_eq!(item.values[0], 0.0);
        assert_eq!(item.values[15], 0.6);
        assert_eq!(topics.status.lock().unwrap()[0].sensor_status, 0);
    }

    #[test]
    fn short_reading_is_bad_status() {
        let mut proc = Sps30Processor::new("sps1", "dome");
        let topics = RecordingTopics::default();
        proc.process_telemetry(1.0, ResponseCode::Ok, &[], &topics);
        assert!(topics.particulate.lock().unwrap()[0].values.iter().all(|v| v.is_nan()));
        assert_eq!(topics.status.lock().unwrap()[0].sensor_status, 1);
    }
}
