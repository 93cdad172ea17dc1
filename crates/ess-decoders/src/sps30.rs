//! SPS30 particulate-sensor decoder (§4.A).
//!
//! Wire shape: `\x02name,timestamp,<5 particle-size>,<5 mass-conc>,<5
//! number-conc>,typical,location,status\x03CS`, where `CS` is a two-hex
//! modulo-256 sum over every byte from just after STX through the status
//! field, inclusive. The sensor name is configuration, not telemetry, and
//! is dropped from the 19-element output.

use crate::{DecodeError, Decoder};
use ess_types::Scalar;

pub struct Sps30Decoder;

const STX: u8 = 0x02;
const ETX: u8 = 0x03;

fn is_sentinel(value: &str) -> bool {
    matches!(value, "-1.00" | "-1.000")
}

impl Decoder for Sps30Decoder {
    fn decode(&self, line: &str) -> Result<Vec<Scalar>, DecodeError> {
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
        let computed = (body.bytes().fold(0u32, |acc, b| acc + b as u32) % 256) as u8;
        if computed != transmitted {
            return Err(DecodeError::UnparseableLine(format!(
                "SPS30 checksum mismatch: computed {computed:#04x}, wire {transmitted:#04x}"
            )));
        }

        let fields: Vec<&str> = body.split(',').collect();
        if fields.len() != 20 {
            return Err(DecodeError::UnparseableLine(line.to_string()));
        }

        let parse_f = |s: &str| -> f64 {
            if is_sentinel(s) {
                f64::NAN
            } else {
                s.trim().parse().unwrap_or(f64::NAN)
            }
        };

        let mut out = Vec::with_capacity(19);
        out.push(Scalar::Float(parse_f(fields[1]))); // timestamp
        for field in &fields[2..18] {
            // 5 particle-size + 5 mass-concentration + 5 number-concentration + typical size
            out.push(Scalar::Float(parse_f(field)));
        }
        out.push(Scalar::Str(fields[18].to_string())); // location
        out.push(Scalar::Str(fields[19].to_string())); // status
        Ok(out)
    }

    fn arity(&self) -> usize {
        19
    }
}
