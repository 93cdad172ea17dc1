//! Windsonic 2-D anemometer decoder (§4.A).
//!
//! Wire shape: `\x02Q,ddd,sss.ss,M,00,\x03CS<CR><LF>` — an STX/ETX-framed
//! line whose two-hex-character checksum is the XOR of every byte strictly
//! between STX and ETX. A checksum mismatch invalidates the record
//! (property 4); anything that isn't even STX-framed is a genuine
//! structural error.

use crate::{DecodeError, Decoder};
use ess_types::Scalar;

pub struct WindsonicDecoder;

const STX: u8 = 0x02;
const ETX: u8 = 0x03;

impl Decoder for WindsonicDecoder {
    fn decode(&self, line: &str) -> Result<Vec<Scalar>, DecodeError> {
        if line.is_empty() {
            return Ok(vec![Scalar::Float(f64::NAN), Scalar::Float(f64::NAN)]);
        }

        let bytes = line.as_bytes();
        if bytes.first() != Some(&STX) {
            return Err(DecodeError::UnparseableLine(line.to_string()));
        }
        let etx_pos = bytes
            .iter()
            .position(|&b| b == ETX)
            .ok_or_else(|| DecodeError::UnparseableLine(line.to_string()))?;
        if bytes.len() < etx_pos + 3 {
            return Err(DecodeError::UnparseableLine(line.to_string()));
        }

        let body = &line[1..etx_pos];
        let cs_str = &line[etx_pos + 1..etx_pos + 3];
        let transmitted = u8::from_str_radix(cs_str, 16)
            .map_err(|_| DecodeError::UnparseableLine(line.to_string()))?;
        let computed = body.bytes().fold(0u8, |acc, b| acc ^ b);
        if computed != transmitted {
            return Ok(vec![Scalar::Float(f64::NAN), Scalar::Float(f64::NAN)]);
        }

        let fields: Vec<&str> = body.split(',').collect();
        if fields.len() < 5 {
            return Err(DecodeError::UnparseableLine(line.to_string()));
        }
        if fields[4] != "00" {
            tracing::warn!(status = fields[4], "windsonic status field not OK");
        }

        let direction = match fields[1] {
            "" | "999" => f64::NAN,
            s => s.parse::<i64>().map(|v| v as f64).unwrap_or(f64::NAN),
        };
        let speed = fields[2].parse::<f64>().unwrap_or(f64::NAN);
        let speed = if (speed - 9999.999).abs() < 1e-6 { f64::NAN } else { speed };

        Ok(vec![Scalar::Float(direction), Scalar::Float(speed)])
    }

    fn arity(&self) -> usize {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(direction: &str, speed: &str) -> String {
        let body = format!("Q,{direction},{speed},M,00,");
        let cs = body.bytes().fold(0u8, |acc, b| acc ^ b);
        format!("\u{2}{body}\u{3}{cs:02X}")
    }

    #[test]
    fn happy_path() {
        let line = frame("123", "005.40");
        let out = WindsonicDecoder.decode(&line).unwrap();
        assert_eq!(out, vec![Scalar::Float(123.0), Scalar::Float(5.40)]);
    }

    #[test]
    fn empty_direction_is_nan() {
        let line = frame("", "001.20");
        let out = WindsonicDecoder.decode(&line).unwrap();
        assert!(matches!(out[0], Scalar::Float(v) if v.is_nan()));
    }

    #[test]
    fn tampered_checksum_is_all_nan() {
        // Flip the body's leading "Q" to "R": a one-character, UTF-8-safe
        // corruption that invalidates the transmitted XOR checksum.
        let mut line = frame("090", "010.00").into_bytes();
        line[1] = b'R';
        let line = String::from_utf8(line).unwrap();
        let out = WindsonicDecoder.decode(&line).unwrap();
        assert!(out.iter().all(|s| matches!(s, Scalar::Float(v) if v.is_nan())));
    }

    #[test]
    fn empty_line_is_all_nan() {
        let out = WindsonicDecoder.decode("").unwrap();
        assert!(out.iter().all(|s| matches!(s, Scalar::Float(v) if v.is_nan())));
    }
}
