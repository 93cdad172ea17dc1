//! Multi-channel temperature decoder (§4.A).
//!
//! Wire shape: `C00=±DDDD.DDDD,C01=…<CR><LF>`, comma-separated, channel
//! count fixed per device at configuration time. A channel key with no
//! matching `=` (the truncated remainder of a `key=value` pair split
//! across a mid-stream connect) is noise and is skipped; the channel it
//! would have filled stays NaN, which is exactly the "left-pad missing
//! leading channels with NaN" behavior the spec calls for.

use crate::{parse_sentinel_f64, split_key_value_fields, DecodeError, Decoder};
use ess_types::Scalar;

pub struct TemperatureDecoder {
    num_channels: usize,
}

impl TemperatureDecoder {
    pub fn new(num_channels: usize) -> Self {
        Self { num_channels }
    }
}

impl Decoder for TemperatureDecoder {
    fn decode(&self, line: &str) -> Result<Vec<Scalar>, DecodeError> {
        let mut channels = vec![f64::NAN; self.num_channels];
        if line.is_empty() {
            return Ok(channels.into_iter().map(Scalar::Float).collect());
        }
        for field in split_key_value_fields(line)? {
            let Some((key, value)) = field else { continue };
            let Some(index) = key.strip_prefix('C').and_then(|n| n.parse::<usize>().ok()) else {
                continue;
            };
            if let Some(slot) = channels.get_mut(index) {
                *slot = parse_sentinel_f64(value);
            }
        }
        Ok(channels.into_iter().map(Scalar::Float).collect())
    }

    fn arity(&self) -> usize {
        self.num_channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path() {
        let decoder = TemperatureDecoder::new(4);
        let out = decoder
            .decode("C00=0021.1234,C01=0021.1220,C02=0021.1249,C03=0020.9990")
            .unwrap();
        assert_eq!(
            out,
            vec![
                Scalar::Float(21.1234),
                Scalar::Float(21.1220),
                Scalar::Float(21.1249),
                Scalar::Float(20.9990),
            ]
        );
    }

    #[test]
    fn disconnected_channel_is_nan() {
        let decoder = TemperatureDecoder::new(4);
        let out = decoder
            .decode("C00=0021.1230,C01=0021.1220,C02=9999.9990,C03=0020.9999")
            .unwrap();
        assert!(matches!(out[2], Scalar::Float(v) if v.is_nan()));
        assert_eq!(out[0], Scalar::Float(21.1230));
        assert_eq!(out[3], Scalar::Float(20.9999));
    }

    #[test]
    fn truncated_leading_channels_are_nan() {
        let decoder = TemperatureDecoder::new(4);
        let out = decoder
            .decode("0021.1224,C02=0021.1243,C03=0020.9992")
            .unwrap();
        assert!(matches!(out[0], Scalar::Float(v) if v.is_nan()));
        assert!(matches!(out[1], Scalar::Float(v) if v.is_nan()));
        assert_eq!(out[2], Scalar::Float(21.1243));
        assert_eq!(out[3], Scalar::Float(20.9992));
    }

    #[test]
    fn duplicate_equals_is_an_error() {
        let decoder = TemperatureDecoder::new(2);
        assert!(decoder.decode("C00=0021=5,C01=0021.1220").is_err());
    }

    #[test]
    fn empty_line_is_all_nan() {
        let decoder = TemperatureDecoder::new(3);
        let out = decoder.decode("").unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|s| matches!(s, Scalar::Float(v) if v.is_nan())));
    }
}
