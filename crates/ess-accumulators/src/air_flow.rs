//! 2-D wind speed/direction accumulator (§4.B `AirFlowAccumulator`),
//! grounded on `accumulator/air_flow_accumulator.py`.

use crate::stats::{circular_mean_and_std_dev, median_and_std_dev};

/// Report produced by [`AirFlowAccumulator::get_topic_kwargs`] — the fields
/// of the `tel_airFlow` topic that only the accumulator can compute.
#[derive(Debug, Clone, PartialEq)]
pub struct AirFlowReport {
    pub timestamp: f64,
    pub direction: f64,
    pub direction_std_dev: f64,
    pub speed: f64,
    pub speed_std_dev: f64,
    pub max_speed: f64,
}

/// Windowed reducer for a 2-D anemometer (§3 `AccumulatorState`, §4.B).
///
/// Samples accumulate until either `num_samples` good samples or
/// `num_samples` bad samples have been seen; `get_topic_kwargs` is the only
/// operation that clears the window (§4.B invariants).
pub struct AirFlowAccumulator {
    num_samples: usize,
    timestamp: Vec<f64>,
    speed: Vec<f64>,
    direction: Vec<f64>,
    num_bad_samples: usize,
}

impl AirFlowAccumulator {
    /// # Panics
    /// If `num_samples < 2` (§3 invariant).
    pub fn new(num_samples: u32) -> Self {
        assert!(num_samples >= 2, "num_samples must be >= 2, got {num_samples}");
        Self {
            num_samples: num_samples as usize,
            timestamp: Vec::new(),
            speed: Vec::new(),
            direction: Vec::new(),
            num_bad_samples: 0,
        }
    }

    pub fn do_report(&self) -> bool {
        self.speed.len().max(self.num_bad_samples) >= self.num_samples
    }

    pub fn add_sample(&mut self, timestamp: f64, speed: f64, direction: f64, isok: bool) {
        if isok {
            self.timestamp.push(timestamp);
            self.speed.push(speed);
            self.direction.push(direction);
        } else {
            self.num_bad_samples += 1;
        }
    }

    fn clear(&mut self) {
        self.timestamp.clear();
        self.speed.clear();
        self.direction.clear();
        self.num_bad_samples = 0;
    }

    /// Returns `None` if `do_report()` is false (a no-op per §4.B). Clears
    /// the window as a side effect of returning `Some`.
    pub fn get_topic_kwargs(&mut self) -> Option<AirFlowReport> {
        if self.speed.len() >= self.num_samples {
            let timestamp = *self.timestamp.last().expect("speed non-empty implies timestamp non-empty");
            let (direction, direction_std_dev) = circular_mean_and_std_dev(&self.direction);
            let (speed, speed_std_dev) = median_and_std_dev(&self.speed);
            let max_speed = self.speed.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            self.clear();
            Some(AirFlowReport {
                timestamp,
                direction,
                direction_std_dev,
                speed,
                speed_std_dev,
                max_speed,
            })
        } else if self.num_bad_samples >= self.num_samples {
            let timestamp = self.timestamp.last().copied().unwrap_or(f64::NAN);
            self.clear();
            Some(AirFlowReport {
                timestamp,
                direction: -1.0,
                direction_std_dev: -1.0,
                speed: f64::NAN,
                speed_std_dev: f64::NAN,
                max_speed: f64::NAN,
            })
        } else {
            None
        }
    }
}
