//! HX85A humidity/temperature/dew-point decoder (§4.A).
//!
//! Wire shape: three `key=value` fields, in order `%RH`, `AT°C`, `DP°C`,
//! over an ISO-8859-1 charset (for the degree sign) terminated by CR LF or
//! LF CR. By the time a line reaches here the device supervisor has already
//! decoded the raw bytes as Latin-1 and stripped the terminator, so this
//! decoder just needs to recognize the three key names.

use crate::{parse_sentinel_f64, split_key_value_fields, DecodeError, Decoder};
use ess_types::Scalar;

pub struct Hx85aDecoder;

impl Decoder for Hx85aDecoder {
    fn decode(&self, line: &str) -> Result<Vec<Scalar>, DecodeError> {
        let mut rh = f64::NAN;
        let mut t = f64::NAN;
        let mut dp = f64::NAN;
        for field in split_key_value_fields(line)? {
            let Some((key, value)) = field else { continue };
            match key {
                "%RH" => rh = parse_sentinel_f64(value),
                "AT°C" => t = parse_sentinel_f64(value),
                "DP°C" => dp = parse_sentinel_f64(value),
                _ => {}
            }
        }
        Ok(vec![Scalar::Float(rh), Scalar::Float(t), Scalar::Float(dp)])
    }

    fn arity(&self) -> usize {
        3
    }
}
