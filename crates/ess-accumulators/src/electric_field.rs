//! Electric-field-mill accumulator (§4.B `ElectricFieldStrengthAccumulator`),
//! grounded on `processor/efm100c_processor.py`'s use of the (not retrieved)
//! Python counterpart — rebuilt from spec.md's explicit field list.

/// Report produced by [`ElectricFieldStrengthAccumulator::get_topic_kwargs`].
#[derive(Debug, Clone, PartialEq)]
pub struct ElectricFieldReport {
    pub timestamp: f64,
    pub strength: f64,
    pub strength_std_dev: f64,
    pub strength_max: f64,
}

/// Windowed reducer for a signed electric-field-strength sensor (§4.B).
pub struct ElectricFieldStrengthAccumulator {
    num_samples: usize,
    timestamp: Vec<f64>,
    strength: Vec<f64>,
    num_bad_samples: usize,
}

impl ElectricFieldStrengthAccumulator {
    /// # Panics
    /// If `num_samples < 2` (§3 invariant).
    pub fn new(num_samples: u32) -> Self {
        assert!(num_samples >= 2, "num_samples must be >= 2, got {num_samples}");
        Self {
            num_samples: num_samples as usize,
            timestamp: Vec::new(),
            strength: Vec::new(),
            num_bad_samples: 0,
        }
    }

    pub fn do_report(&self) -> bool {
        self.strength.len().max(self.num_bad_samples) >= self.num_samples
    }

    pub fn add_sample(&mut self, timestamp: f64, strength: f64, isok: bool) {
        if isok {
            self.timestamp.push(timestamp);
            self.strength.push(strength);
        } else {
            self.num_bad_samples += 1;
        }
    }

    fn clear(&mut self) {
        self.timestamp.clear();
        self.strength.clear();
        self.num_bad_samples = 0;
    }

    /// Returns `None` if `do_report()` is false (a no-op per §4.B). Clears
    /// the window as a side effect of returning `Some`.
    pub fn get_topic_kwargs(&mut self) -> Option<ElectricFieldReport> {
        if self.strength.len() >= self.num_samples {
            let timestamp = *self.timestamp.last().expect("strength non-empty implies timestamp non-empty");
            let n = self.strength.len() as f64;
            let mean = self.strength.iter().sum::<f64>() / n;
            let variance = self.strength.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let strength_max = *self
                .strength
                .iter()
                .max_by(|a, b| a.abs().partial_cmp(&b.abs()).unwrap_or(std::cmp::Ordering::Equal))
                .expect("strength non-empty");
            self.clear();
            Some(ElectricFieldReport {
                timestamp,
                strength: mean,
                strength_std_dev: variance.sqrt(),
                strength_max,
            })
        } else if self.num_bad_samples >= self.num_samples {
            let timestamp = self.timestamp.last().copied().unwrap_or(f64::NAN);
            self.clear();
            Some(ElectricFieldReport {
                timestamp,
                strength: f64::NAN,
                strength_std_dev: f64::NAN,
                strength_max: f64::NAN,
            })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_max_keeps_sign_of_largest_magnitude() {
        let mut acc = ElectricFieldStrengthAccumulator::new(3);
        acc.add_sample(1.0, -2.0, true);
        acc.add_sample(2.0, 1.0, true);
        acc.add_sample(3.0, -5.0, true);
        let report = acc.get_topic_kwargs().expect("should report");
        assert_eq!(report.strength_max, -5.0);
        assert!((report.strength - (-2.0)).abs() < 1e-9);
    }

    #[test]
    fn bad_path_is_all_nan() {
        let mut acc = ElectricFieldStrengthAccumulator::new(2);
        acc.add_sample(1.0, 0.0, false);
        acc.add_sample(2.0, 0.0, false);
        let report = acc.get_topic_kwargs().expect("should report");
        assert!(report.strength.is_nan());
        assert!(report.strength_max.is_nan());
    }

    #[test]
    fn noop_before_window_full() {
        let mut acc = ElectricFieldStrengthAccumulator::new(4);
        acc.add_sample(1.0, 1.0, true);
        assert!(acc.get_topic_kwargs().is_none());
    }
}
