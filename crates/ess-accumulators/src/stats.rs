//! Shared statistics helpers (GLOSSARY, §4.B): circular mean/std for
//! angular data and quantile-based robust mean/std for everything else.
//!
//! Both operate on a borrowed slice rather than consuming it — every
//! accumulator clears its own storage explicitly in `get_topic_kwargs`, so
//! these helpers have no reason to take ownership.

/// IQR-based robust standard deviation factor (GLOSSARY, §4.B): `σ̂ = 0.7413
/// · (Q75 − Q25)`. spec.md is authoritative over the original's `0.741`
/// constant (SPEC_FULL.md §11 item 6).
const ROBUST_STD_FACTOR: f64 = 0.7413;

/// Linear-interpolated quantile of `data` at `q ∈ [0, 1]`, matching numpy's
/// default (`linear`) interpolation — the original computes medians and
/// quartiles via `np.quantile`.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] + (sorted[hi] - sorted[lo]) * frac
    }
}

/// Median and IQR-based robust standard deviation of `data` (GLOSSARY).
pub fn median_and_std_dev(data: &[f64]) -> (f64, f64) {
    let mut sorted: Vec<f64> = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let q25 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q75 = quantile(&sorted, 0.75);
    (median, ROBUST_STD_FACTOR * (q75 - q25))
}

/// Circular mean and circular standard deviation of a sequence of angles in
/// degrees (GLOSSARY, directional statistics). Returns `(NaN, NaN)` for an
/// empty slice — accumulators never call this with one, since they gate on
/// `do_report()` first.
pub fn circular_mean_and_std_dev(angles_deg: &[f64]) -> (f64, f64) {
    if angles_deg.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let n = angles_deg.len() as f64;
    let (sum_re, sum_im) = angles_deg.iter().fold((0.0, 0.0), |(re, im), &a| {
        let rad = a.to_radians();
        (re + rad.cos(), im + rad.sin())
    });
    let (mean_re, mean_im) = (sum_re / n, sum_im / n);
    let magnitude = (mean_re * mean_re + mean_im * mean_im).sqrt();
    let mut mean_deg = mean_im.atan2(mean_re).to_degrees();
    if mean_deg < 0.0 {
        mean_deg += 360.0;
    }
    let std_dev = if magnitude == 0.0 {
        f64::INFINITY
    } else {
        (-2.0 * magnitude.ln()).sqrt().to_degrees()
    };
    (mean_deg, std_dev)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_odd_count() {
        let (median, _) = median_and_std_dev(&[1.0, 3.0, 2.0]);
        assert_eq!(median, 2.0);
    }

    #[test]
    fn circular_mean_wraps_across_zero() {
        let (mean, _) = circular_mean_and_std_dev(&[350.0, 10.0]);
        assert!((mean - 0.0).abs() < 1e-6, "mean was {mean}");
    }

    #[test]
    fn circular_std_is_infinite_for_opposed_angles() {
        let (_, std) = circular_mean_and_std_dev(&[0.0, 180.0]);
        assert!(std.is_infinite());
    }

    #[test]
    fn circular_mean_of_identical_angles_has_zero_std() {
        let (mean, std) = circular_mean_and_std_dev(&[45.0, 45.0, 45.0]);
        assert!((mean - 45.0).abs() < 1e-9);
        assert!((std - 0.0).abs() < 1e-9);
    }
}
