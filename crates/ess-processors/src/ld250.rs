//! LD250 lightning-detector processor (§4.D), grounded on
//! `processor/ld250_processor.py`.
//!
//! Dispatch key is the decoder's prefix string (`WIMLI`/`WIMST`/`WIMLN`),
//! carried as `sensor_telemetry[0]`.

use ess_types::{EvtLightningStrike, EvtSensorStatus, ResponseCode, Scalar, TelLightningStrikeStatus, Topics};

use crate::timer::SingleShotTimer;

const STRIKE_PREFIX: &str = "WIMLI";
const STATUS_PREFIX: &str = "WIMST";
const NOISE_PREFIX: &str = "WIMLN";

pub struct Ld250Processor {
    name: String,
    location: String,
    safe_interval: f64,
    cleared_timer: SingleShotTimer,
}

impl Ld250Processor {
    pub fn new(name: impl Into<String>, location: impl Into<String>, safe_interval: f64) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            safe_interval,
            cleared_timer: SingleShotTimer::new(),
        }
    }

    fn process_strike(&mut self, now: f64, sensor_telemetry: &[Scalar], topics: &dyn Topics) {
        self.cleared_timer.arm(now, self.safe_interval);
        topics.evt_lightning_strike(EvtLightningStrike {
            sensor_name: self.name.clone(),
            corrected_distance: sensor_telemetry.get(1).map(Scalar::as_f64).unwrap_or(f64::NAN),
            uncorrected_distance: sensor_telemetry.get(2).map(Scalar::as_f64).unwrap_or(f64::NAN),
            bearing: sensor_telemetry.get(3).map(Scalar::as_f64).unwrap_or(f64::NAN),
        });
    }

    fn process_status_or_noise(
        &mut self,
        now: f64,
        response_code: ResponseCode,
        sensor_telemetry: &[Scalar],
        topics: &dyn Topics,
    ) {
        let is_noise = sensor_telemetry.first().map(Scalar::as_str) == Some(NOISE_PREFIX);
        let isok = response_code == ResponseCode::Ok && !is_noise;
        let sensor_status = if is_noise { 1 } else { 0 };

        let (close_strike_rate, total_strike_rate, close_alarm_status, severe_alarm_status, heading) = if isok {
            (
                sensor_telemetry.get(1).map(Scalar::as_f64).unwrap_or(f64::NAN),
                sensor_telemetry.get(2).map(Scalar::as_f64).unwrap_or(f64::NAN),
                if sensor_telemetry.get(3).map(Scalar::as_f64).unwrap_or(f64::NAN) == 0.0 { 1.0 } else { 0.0 },
                if sensor_telemetry.get(4).map(Scalar::as_f64).unwrap_or(f64::NAN) == 0.0 { 1.0 } else { 0.0 },
                sensor_telemetry.get(5).map(Scalar::as_f64).unwrap_or(f64::NAN),
            )
        } else {
            (f64::NAN, f64::NAN, 0.0, 0.0, f64::NAN)
        };

        topics.tel_lightning_strike_status(TelLightningStrikeStatus {
            sensor_name: self.name.clone(),
            timestamp: now,
            close_strike_rate,
            total_strike_rate,
            close_alarm_status,
            severe_alarm_status,
            heading,
            location: self.location.clone(),
        });
        topics.evt_sensor_status(EvtSensorStatus {
            sensor_name: self.name.clone(),
            sensor_status,
            server_status: response_code as i32,
        });
    }
}

impl ess_types::Processor for Ld250Processor {
    fn process_telemetry(
        &mut self,
        now: f64,
        response_code: ResponseCode,
        sensor_telemetry: &[Scalar],
        topics: &dyn Topics,
    ) {
        match sensor_telemetry.first().map(Scalar::as_str) {
            Some(STRIKE_PREFIX) => self.process_strike(now, sensor_telemetry, topics),
            Some(STATUS_PREFIX) | Some(NOISE_PREFIX) => {
                self.process_status_or_noise(now, response_code, sensor_telemetry, topics)
            }
            other => tracing::error!(name = %self.name, prefix = ?other, "unknown LD250 telemetry prefix"),
        }

        if self.cleared_timer.poll(now) {
            topics.evt_lightning_strike(EvtLightningStrike {
                sensor_name: self.name.clone(),
                corrected_distance: f64::INFINITY,
                uncorrected_distance: f64::INFINITY,
                bearing: 0.0,
            });
        }
    }
}
