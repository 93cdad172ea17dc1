//! EFM100C electric-field-mill processor (§4.D), grounded on
//! `processor/efm100c_processor.py`.

use ess_accumulators::ElectricFieldStrengthAccumulator;
use ess_types::{EvtHighElectricField, EvtSensorStatus, ResponseCode, Scalar, TelElectricFieldStrength, Topics};

use crate::timer::SingleShotTimer;

pub struct Efm100cProcessor {
    name: String,
    location: String,
    threshold: f64,
    safe_interval: f64,
    accumulator: ElectricFieldStrengthAccumulator,
    safe_timer: SingleShotTimer,
}

impl Efm100cProcessor {
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        num_samples: u32,
        threshold: f64,
        safe_interval: f64,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            threshold,
            safe_interval,
            accumulator: ElectricFieldStrengthAccumulator::new(num_samples),
            safe_timer: SingleShotTimer::new(),
        }
    }
}

impl ess_types::Processor for Efm100cProcessor {
    fn process_telemetry(
        &mut self,
        now: f64,
        response_code: ResponseCode,
        sensor_telemetry: &[Scalar],
        topics: &dyn Topics,
    ) {
        let strength = sensor_telemetry.first().map(Scalar::as_f64).unwrap_or(f64::NAN);
        let fault = sensor_telemetry.get(1).map(Scalar::as_i64).unwrap_or(0);
        let isok = fault == 0 && response_code == ResponseCode::Ok;

        self.accumulator.add_sample(now, strength, isok);
        let Some(report) = self.accumulator.get_topic_kwargs() else {
            return;
        };

        // Let a previously armed "safe" timer naturally elapse before we
        // decide whether it is currently running.
        self.safe_timer.poll(now);

        if report.strength_max.abs() > self.threshold {
            self.safe_timer.arm(now, self.safe_interval);
            topics.evt_high_electric_field(EvtHighElectricField {
                sensor_name: self.name.clone(),
                strength: self.threshold,
            });
        } else if self.safe_timer.is_idle() {
            topics.evt_high_electric_field(EvtHighElectricField {
                sensor_name: self.name.clone(),
                strength: f64::NAN,
            });
        }

        topics.tel_electric_field_strength(TelElectricFieldStrength {
            sensor_name: self.name.clone(),
            timestamp: report.timestamp,
            location: self.location.clone(),
            strength: report.strength,
            strength_std_dev: report.strength_std_dev,
            strength_max: report.strength_max,
        });
        topics.evt_sensor_status(EvtSensorStatus {
            sensor_name: self.name.clone(),
            sensor_status: fault,
            server_status: response_code as i32,
        });
    }
}
