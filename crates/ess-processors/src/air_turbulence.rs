//! CSAT3B 3-D anemometer processor (§4.D), grounded on
//! `processor/air_turbulence_processor.py`.

use ess_accumulators::AirTurbulenceAccumulator;
use ess_types::{EvtSensorStatus, ResponseCode, Scalar, TelAirTurbulence, Topics};

pub struct AirTurbulenceProcessor {
    name: String,
    location: String,
    accumulator: AirTurbulenceAccumulator,
}

impl AirTurbulenceProcessor {
    pub fn new(name: impl Into<String>, location: impl Into<String>, num_samples: u32) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            accumulator: AirTurbulenceAccumulator::new(num_samples),
        }
    }
}

impl ess_types::Processor for AirTurbulenceProcessor {
    fn process_telemetry(
        &mut self,
        now: f64,
        response_code: ResponseCode,
        sensor_telemetry: &[Scalar],
        topics: &dyn Topics,
    ) {
        let ux = sensor_telemetry.first().map(Scalar::as_f64).unwrap_or(f64::NAN);
        let uy = sensor_telemetry.get(1).map(Scalar::as_f64).unwrap_or(f64::NAN);
        let uz = sensor_telemetry.get(2).map(Scalar::as_f64).unwrap_or(f64::NAN);
        let sonic_temperature = sensor_telemetry.get(3).map(Scalar::as_f64).unwrap_or(f64::NAN);
        let diagnostic = sensor_telemetry.get(4).map(Scalar::as_i64).unwrap_or(response_code as i64);
        let isok = diagnostic == 0 && response_code == ResponseCode::Ok;

        self.accumulator.add_sample(now, [ux, uy, uz], sonic_temperature, isok);
        let Some(report) = self.accumulator.get_topic_kwargs() else {
            return;
        };

        topics.tel_air_turbulence(TelAirTurbulence {
            sensor_name: self.name.clone(),
            timestamp: report.timestamp,
            location: self.location.clone(),
            speed: report.speed,
            speed_magnitude: report.speed_magnitude,
            speed_max_magnitude: report.speed_max_magnitude,
            speed_std_dev: report.speed_std_dev,
            sonic_temperature: report.sonic_temperature,
            sonic_temperature_std_dev: report.sonic_temperature_std_dev,
        });
        topics.evt_sensor_status(EvtSensorStatus {
            sensor_name: self.name.clone(),
            sensor_status: diagnostic,
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
        turbulence: Mutex<Vec<TelAirTurbulence>>,
        status: Mutex<Vec<EvtSensorStatus>>,
    }

    impl Topics for RecordingTopics {
        fn tel_temperature(&self, _item: TelTemperature) {}
        fn tel_relative_humidity(&self, _item: TelRelativeHumidity) {}
        fn tel_dew_point(&self, _item: TelDewPoint) {}
        fn tel_pressure(&self, _item: TelPressure) {}
        fn tel_air_flow(&self, _item: TelAirFlow) {}
        fn tel_air_turbulence(&self, item: TelAirTurbulence) {
            self.turbulence.lock().unwrap().push(item);
        }
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

    fn sample(ux: f64, uy: f64, uz: f64, t: f64, diag: i64) -> Vec<Scalar> {
        vec![
            Scalar::Float(ux),
            Scalar::Float(uy),
            Scalar::Float(uz),
            Scalar::Float(t),
            Scalar::Int(diag),
            Scalar::Int(0),
            Scalar::Int(0),
        ]
    }

    #[test]
    fn reports_only_every_num_samples_and_carries_diagnostic() {
        let mut proc = AirTurbulenceProcessor::new("sonic1", "roof", 2);
        let topics = RecordingTopics::default();
        proc.process_telemetry(1.0, ResponseCode::Ok, &sample(1.0, 0.0, 0.0, 20.0, 0), &topics);
        assert!(topics.turbulence.lock().unwrap().is_empty());
        proc.process_telemetry(2.0, ResponseCode::Ok, &sample(0.0, 1.0, 0.0, 22.0, 0), &topics);
        assert_eq!(topics.turbulence.lock().unwrap().len(), 1);
        assert_eq!(topics.status.lock().unwrap()[0].sensor_status, 0);
    }

    #[test]
    fn nonzero_diagnostic_counts_as_bad_sample() {
        let mut proc = AirTurbulenceProcessor::new("sonic1", "roof", 2);
        let topics = RecordingTopics::default();
        proc.process_telemetry(1.0, ResponseCode::Ok, &sample(0.0, 0.0, 0.0, 0.0, 1), &topics);
        proc.process_telemetry(2.0, ResponseCode::Ok, &sample(0.0, 0.0, 0.0, 0.0, 1), &topics);
        let report = &topics.turbulence.lock().unwrap()[0];
        assert!(report.speed.iter().all(|v| v.is_nan()));
    }
}
