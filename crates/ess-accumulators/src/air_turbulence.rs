//! 3-D anemometer (sonic) accumulator (§4.B `AirTurbulenceAccumulator`).
//!
//! Same windowing pattern as [`crate::AirFlowAccumulator`], but the
//! per-sample payload is a 3-vector plus a scalar sonic temperature. Unlike
//! wind speed (median + IQR robust std), §4.B asks for the wind-speed
//! *magnitude* mean and max, and for sonic temperature a plain mean and
//! standard deviation rather than the robust statistic used for the
//! component-wise speed.

use crate::stats::median_and_std_dev;

#[derive(Debug, Clone, PartialEq)]
pub struct AirTurbulenceReport {
    pub timestamp: f64,
    pub speed: [f64; 3],
    pub speed_std_dev: [f64; 3],
    pub speed_magnitude: f64,
    pub speed_max_magnitude: f64,
    pub sonic_temperature: f64,
    pub sonic_temperature_std_dev: f64,
}

fn mean_and_std_dev(data: &[f64]) -> (f64, f64) {
    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;
    let variance = data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

pub struct AirTurbulenceAccumulator {
    num_samples: usize,
    timestamp: Vec<f64>,
    speed: Vec<[f64; 3]>,
    sonic_temperature: Vec<f64>,
    num_bad_samples: usize,
}

impl AirTurbulenceAccumulator {
    /// # Panics
    /// If `num_samples < 2` (§3 invariant).
    pub fn new(num_samples: u32) -> Self {
        assert!(num_samples >= 2, "num_samples must be >= 2, got {num_samples}");
        Self {
            num_samples: num_samples as usize,
            timestamp: Vec::new(),
            speed: Vec::new(),
            sonic_temperature: Vec::new(),
            num_bad_samples: 0,
        }
    }

    pub fn do_report(&self) -> bool {
        self.speed.len().max(self.num_bad_samples) >= self.num_samples
    }

    pub fn add_sample(&mut self, timestamp: f64, speed: [f64; 3], sonic_temperature: f64, isok: bool) {
        if isok {
            self.timestamp.push(timestamp);
            self.speed.push(speed);
            self.sonic_temperature.push(sonic_temperature);
        } else {
            self.num_bad_samples += 1;
        }
    }

    fn clear(&mut self) {
        self.timestamp.clear();
        self.speed.clear();
        self.sonic_temperature.clear();
        self.num_bad_samples = 0;
    }

    pub fn get_topic_kwargs(&mut self) -> Option<AirTurbulenceReport> {
        if self.speed.len() >= self.num_samples {
            let timestamp = *self.timestamp.last().expect("speed non-empty implies timestamp non-empty");
            let mut speed = [0.0; 3];
            let mut speed_std_dev = [0.0; 3];
            for axis in 0..3 {
                let component: Vec<f64> = self.speed.iter().map(|v| v[axis]).collect();
                let (median, std_dev) = median_and_std_dev(&component);
                speed[axis] = median;
                speed_std_dev[axis] = std_dev;
            }
            let magnitudes: Vec<f64> = self
                .speed
                .iter()
                .map(|v| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt())
                .collect();
            let speed_magnitude = magnitudes.iter().sum::<f64>() / magnitudes.len() as f64;
            let speed_max_magnitude = magnitudes.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let (sonic_temperature, sonic_temperature_std_dev) = mean_and_std_dev(&self.sonic_temperature);
            self.clear();
            Some(AirTurbulenceReport {
                timestamp,
                speed,
                speed_std_dev,
                speed_magnitude,
                speed_max_magnitude,
                sonic_temperature,
                sonic_temperature_std_dev,
            })
        } else if self.num_bad_samples >= self.num_samples {
            let timestamp = self.timestamp.last().copied().unwrap_or(f64::NAN);
            self.clear();
            Some(AirTurbulenceReport {
                timestamp,
                speed: [f64::NAN; 3],
                speed_std_dev: [f64::NAN; 3],
                speed_magnitude: f64::NAN,
                speed_max_magnitude: f64::NAN,
                sonic_temperature: f64::NAN,
                sonic_temperature_std_dev: f64::NAN,
            })
        } else {
            None
        }
    }
}
