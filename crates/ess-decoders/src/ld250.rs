//! LD250 lightning-detector decoder (§4.A).
//!
//! Three mutually exclusive frame kinds distinguished by prefix: `WIMST`
//! (status), `WIMLI` (strike), `WIMLN` (noise). The output always begins
//! with the prefix so the processor (`Ld250Processor`) can dispatch without
//! re-parsing the line. Each prefix carries a different number of trailing
//! fields, so unlike every other decoder here `arity()` is not a single
//! invariant across all well-formed input — §8.1's fixed-arity property is
//! checked per prefix in this crate's tests instead.

use crate::{DecodeError, Decoder};
use ess_types::Scalar;

pub struct Ld250Decoder;

fn next_float<'a>(it: &mut impl Iterator<Item = &'a str>) -> f64 {
    it.next().and_then(|s| s.trim().parse().ok()).unwrap_or(f64::NAN)
}

impl Decoder for Ld250Decoder {
    fn decode(&self, line: &str) -> Result<Vec<Scalar>, DecodeError> {
        let mut fields = line.split(',');
        let prefix = fields.next().unwrap_or("");
        match prefix {
            "WIMST" => Ok(vec![
                Scalar::Str(prefix.to_string()),
                Scalar::Float(next_float(&mut fields)), // close-rate
                Scalar::Float(next_float(&mut fields)), // total-rate
                Scalar::Float(next_float(&mut fields)), // close-alarm
                Scalar::Float(next_float(&mut fields)), // severe-alarm
                Scalar::Float(next_float(&mut fields)), // heading
            ]),
            "WIMLI" => Ok(vec![
                Scalar::Str(prefix.to_string()),
                Scalar::Float(next_float(&mut fields)), // corrected-distance
                Scalar::Float(next_float(&mut fields)), // uncorrected-distance
                Scalar::Float(next_float(&mut fields)), // bearing
            ]),
            "WIMLN" => Ok(vec![Scalar::Str(prefix.to_string())]),
            _ => Ok(vec![]),
        }
    }

    fn arity(&self) -> usize {
        6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_frame() {
        let out = Ld250Decoder.decode("WIMST,1.5,2.5,0,1,90").unwrap();
        assert_eq!(out[0], Scalar::Str("WIMST".into()));
        assert_eq!(out.len(), 6);
    }

    #[test]
    fn strike_frame() {
        let out = Ld250Decoder.decode("WIMLI,10,20,90").unwrap();
        assert_eq!(
            out,
            vec![
                Scalar::Str("WIMLI".into()),
                Scalar::Float(10.0),
                Scalar::Float(20.0),
                Scalar::Float(90.0),
            ]
        );
    }

    #[test]
    fn noise_frame() {
        let out = Ld250Decoder.decode("WIMLN").unwrap();
        assert_eq!(out, vec![Scalar::Str("WIMLN".into())]);
    }

    #[test]
    fn unmatched_line_is_empty() {
        let out = Ld250Decoder.decode("garbage,1,2,3").unwrap();
        assert!(out.is_empty());
    }
}
