//! EFM100C electric-field-mill decoder (§4.A).
//!
//! Wire shape: `$±EE.EE,F*CS<CR><LF>`. Unlike the checksum-bearing decoders
//! above, a malformed EFM100C line is not an error at all — the spec's
//! fallback for this sensor is `[NaN, 1]` (a synthetic fault flag),
//! matching how the processor treats "DeviceReadError" style conditions.

use crate::{DecodeError, Decoder};
use ess_types::Scalar;

pub struct Efm100cDecoder;

impl Decoder for Efm100cDecoder {
    fn decode(&self, line: &str) -> Result<Vec<Scalar>, DecodeError> {
        let parsed = (|| -> Option<(f64, i64)> {
            let rest = line.strip_prefix('$')?;
            let star = rest.find('*')?;
            let body = &rest[..star];
            let mut parts = body.splitn(2, ',');
            let field = parts.next()?.parse::<f64>().ok()?;
            let fault = parts.next()?.trim().parse::<i64>().ok()?;
            Some((field, fault))
        })();

        match parsed {
            Some((field, fault)) => Ok(vec![Scalar::Float(field), Scalar::Int(fault)]),
            None => Ok(vec![Scalar::Float(f64::NAN), Scalar::Int(1)]),
        }
    }

    fn arity(&self) -> usize {
        2
    }
}
