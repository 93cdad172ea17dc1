//! Windsonic 2-D anemometer processor (§4.D), grounded on
//! `processor/windsonic_processor.py`.

use ess_accumulators::AirFlowAccumulator;
use ess_types::{EvtSensorStatus, ResponseCode, Scalar, TelAirFlow, Topics};

pub struct WindsonicProcessor {
    name: String,
    location: String,
    accumulator: AirFlowAccumulator,
}

impl WindsonicProcessor {
    pub fn new(name: impl Into<String>, location: impl Into<String>, num_samples: u32) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            accumulator: AirFlowAccumulator::new(num_samples),
        }
    }
}

impl ess_types::Processor for WindsonicProcessor {
    fn process_telemetry(
        &mut self,
        now: f64,
        response_code: ResponseCode,
        sensor_telemetry: &[Scalar],
        topics: &dyn Topics,
    ) {
        let direction = sensor_telemetry.first().map(Scalar::as_f64).unwrap_or(f64::NAN);
        let speed = sensor_telemetry.get(1).map(Scalar::as_f64).unwrap_or(f64::NAN);
        let isok = response_code == ResponseCode::Ok;

        self.accumulator.add_sample(now, speed, direction, isok);
        let Some(report) = self.accumulator.get_topic_kwargs() else {
            return;
        };

        topics.tel_air_flow(TelAirFlow {
            sensor_name: self.name.clone(),
            timestamp: report.timestamp,
            location: self.location.clone(),
            direction: report.direction,
            direction_std_dev: report.direction_std_dev,
            speed: report.speed,
            speed_std_dev: report.speed_std_dev,
            max_speed: report.max_speed,
        });
        topics.evt_sensor_status(EvtSensorStatus {
            sensor_name: self.name.clone(),
            sensor_status: 0,
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
        air_flow: Mutex<Vec<TelAirFlow>>,
        status: Mutex<Vec<EvtSensorStatus>>,
    }

    impl Topics for RecordingTopics {
        fn tel_temperature(&self, _item: TelTemperature) {}
        fn tel_relative_humidity(&self, _item: TelRelativeHumidity) {}
        fn tel_dew_point(&self, _item: TelDewPoint) {}
        fn tel_pressure(&self, _item: TelPressure) {}
        fn tel_air_flow(&self, item: TelAirFlow) {
            self.air_flow.lock().unwrap().push(item);
        }
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
    fn reports_after_window_and_writes_status() {
        let mut proc = WindsonicProcessor::new("wind1", "roof", 2);
        let topics = RecordingTopics::default();
        proc.process_telemetry(1.0, ResponseCode::Ok, &[Scalar::Float(10.0), Scalar::Float(5.0)], &topics);
        assert!(topics.air_flow.lock().unwrap().is_empty());
        proc.process_telemetry(2.0, ResponseCode::Ok, &[Scalar::Float(20.0), Scalar::Float(7.0)], &topics);
        assert_eq!(topics.air_flow.lock().unwrap().len(), 1);
        assert_eq!(topics.status.lock().unwrap().len(), 1);
    }
}
