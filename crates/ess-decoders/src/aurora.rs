//! Aurora cloud-sensor decoder (§4.A).
//!
//! Fixed seven-field ASCII frame: sequence number, sensor/sky/clarity
//! temperatures (hundredths of a degree C), light and rain level (tenths),
//! and an alarm code. Unlike the padding-tolerant key=value decoders, this
//! frame has no field names to recover a partial record from, so a field
//! count mismatch is a genuine structural error.

use crate::{DecodeError, Decoder};
use ess_types::Scalar;

pub struct AuroraDecoder;

impl Decoder for AuroraDecoder {
    fn decode(&self, line: &str) -> Result<Vec<Scalar>, DecodeError> {
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != 7 {
            return Err(DecodeError::UnparseableLine(line.to_string()));
        }
        let parse_i =
            |s: &str| s.trim().parse::<i64>().map_err(|_| DecodeError::UnparseableLine(line.to_string()));

        let seq = parse_i(fields[0])?;
        let t_amb = parse_i(fields[1])? as f64 * 0.01;
        let t_sky = parse_i(fields[2])? as f64 * 0.01;
        let clarity = parse_i(fields[3])? as f64 * 0.01;
        let light = parse_i(fields[4])? as f64 * 0.1;
        let rain = parse_i(fields[5])? as f64 * 0.1;
        let alarm = parse_i(fields[6])?;

        Ok(vec![
            Scalar::Int(seq),
            Scalar::Float(t_amb),
            Scalar::Float(t_sky),
            Scalar::Float(clarity),
            Scalar::Float(light),
            Scalar::Float(rain),
            Scalar::Int(alarm),
        ])
    }

    fn arity(&self) -> usize {
        7
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path() {
        let out = AuroraDecoder.decode("42,-512,-1834,120,305,0,0").unwrap();
        assert_eq!(out[0], Scalar::Int(42));
        assert_eq!(out[1], Scalar::Float(-5.12));
        assert_eq!(out[2], Scalar::Float(-18.34));
        assert_eq!(out[3], Scalar::Float(1.20));
        assert_eq!(out[4], Scalar::Float(30.5));
        assert_eq!(out[5], Scalar::Float(0.0));
        assert_eq!(out[6], Scalar::Int(0));
    }

    #[test]
    fn wrong_field_count_is_an_error() {
        assert!(AuroraDecoder.decode("42,-512,-1834").is_err());
    }
}
