//! CSAT3B 3-D anemometer decoder (§4.A).
//!
//! Wire shape: `ux,uy,uz,T,d,c,sig<CR>`. `sig` is a 16-bit signature the
//! instrument computes over the five measurement fields (`ux,uy,uz,T,d`) —
//! notably *not* over the record counter `c` that precedes it on the wire.
//! We recompute the same signature and compare; a mismatch (or a short
//! line) invalidates the whole record rather than raising an error, per
//! §4.A and testable property 3.

use crate::{DecodeError, Decoder};
use ess_types::Scalar;

pub struct Csat3bDecoder;

const ALL_NAN: [Scalar; 7] = [
    Scalar::Float(f64::NAN),
    Scalar::Float(f64::NAN),
    Scalar::Float(f64::NAN),
    Scalar::Float(f64::NAN),
    Scalar::Int(0),
    Scalar::Int(0),
    Scalar::Int(0),
];

/// The instrument's running-checksum algorithm, seeded with `0xAAAA` and
/// iterated byte-by-byte over `data` (§4.A).
///
/// Spec order matters here: `b = ((lsb<<1)+msb+ch) mod 256` is masked
/// *first*, and the carry is added *after*, without re-masking — so `b`
/// (and therefore the next iteration's `msb`) can briefly be a 9-bit value
/// up to 256. `hi`/`lo` are kept as `u32` so that carry-widened
/// intermediate and the final `(hi << 8) + lo` can't overflow a `u16`
/// before the closing `& 0xFFFF`.
fn csat3b_signature(data: &str) -> u16 {
    let mut hi: u32 = 0xAA;
    let mut lo: u32 = 0xAA;
    for byte in data.bytes() {
        let carry = if lo & 0x80 != 0 { 1 } else { 0 };
        let masked = ((lo << 1) + hi + byte as u32) & 0xFF;
        hi = lo;
        lo = masked + carry;
    }
    (((hi << 8) + lo) & 0xFFFF) as u16
}

impl Decoder for Csat3bDecoder {
    fn decode(&self, line: &str) -> Result<Vec<Scalar>, DecodeError> {
        if line.is_empty() {
            return Ok(ALL_NAN.to_vec());
        }
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 7 {
            return Ok(ALL_NAN.to_vec());
        }

        let signed_region = fields[0..5].join(",");
        let computed = csat3b_signature(&signed_region);
        let transmitted = match u16::from_str_radix(fields[6].trim(), 16) {
            Ok(v) => v,
            Err(_) => return Err(DecodeError::UnparseableLine(line.to_string())),
        };
        if computed != transmitted {
            return Ok(ALL_NAN.to_vec());
        }

        let parse_f = |s: &str| {
            s.trim()
                .parse::<f64>()
                .map_err(|_| DecodeError::UnparseableLine(line.to_string()))
        };
        let parse_i = |s: &str| {
            s.trim()
                .parse::<i64>()
                .map_err(|_| DecodeError::UnparseableLine(line.to_string()))
        };

        Ok(vec![
            Scalar::Float(parse_f(fields[0])?),
            Scalar::Float(parse_f(fields[1])?),
            Scalar::Float(parse_f(fields[2])?),
            Scalar::Float(parse_f(fields[3])?),
            Scalar::Int(parse_i(fields[4])?),
            Scalar::Int(parse_i(fields[5])?),
            Scalar::Int(transmitted as i64),
        ])
    }

    fn arity(&self) -> usize {
        7
    }

    fn terminator(&self) -> &'static [u8] {
        b"\r"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_matches_worked_example() {
        let out = Csat3bDecoder
            .decode("0.08945,0.06552,0.05726,19.69336,0,5,c3a6")
            .unwrap();
        assert_eq!(
            out,
            vec![
                Scalar::Float(0.08945),
                Scalar::Float(0.06552),
                Scalar::Float(0.05726),
                Scalar::Float(19.69336),
                Scalar::Int(0),
                Scalar::Int(5),
                Scalar::Int(0xc3a6),
            ]
        );
    }

    #[test]
    fn tampered_signature_invalidates_record() {
        let out = Csat3bDecoder
            .decode("0.08945,0.06552,0.05726,19.69336,0,5,c3a7")
            .unwrap();
        assert!(matches!(out[0], Scalar::Float(v) if v.is_nan()));
        assert_eq!(out[4], Scalar::Int(0));
        assert_eq!(out[6], Scalar::Int(0));
    }

    #[test]
    fn short_line_is_all_nan_not_an_error() {
        let out = Csat3bDecoder.decode("0.1,0.2,0.3").unwrap();
        assert!(matches!(out[0], Scalar::Float(v) if v.is_nan()));
    }
}
