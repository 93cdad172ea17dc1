//! HX85BA humidity/temperature/pressure decoder (§4.A).
//!
//! Like [`crate::Hx85aDecoder`] but the third field is `Pmb=ddd.dd`
//! (pressure in millibar) instead of a sensor-reported dew point; we derive
//! dew point ourselves via the Magnus formula (GLOSSARY). Pressure stays in
//! millibar here — the millibar-to-Pascal conversion is a processor
//! concern (§4.D, `PASCALS_PER_MILLIBAR`).

use crate::{magnus_dew_point, parse_sentinel_f64, split_key_value_fields, DecodeError, Decoder};
use ess_types::Scalar;

pub struct Hx85baDecoder;

impl Decoder for Hx85baDecoder {
    fn decode(&self, line: &str) -> Result<Vec<Scalar>, DecodeError> {
        let mut rh = f64::NAN;
        let mut t = f64::NAN;
        let mut p = f64::NAN;
        for field in split_key_value_fields(line)? {
            let Some((key, value)) = field else { continue };
            match key {
                "%RH" => rh = parse_sentinel_f64(value),
                "AT°C" => t = parse_sentinel_f64(value),
                "Pmb" => p = parse_sentinel_f64(value),
                _ => {}
            }
        }
        let dp = magnus_dew_point(rh, t);
        Ok(vec![
            Scalar::Float(rh),
            Scalar::Float(t),
            Scalar::Float(p),
            Scalar::Float(dp),
        ])
    }

    fn arity(&self) -> usize {
        4
    }
}
