//! Thermal scanner data client (§4.F.5): reads newline-terminated
//! `timestamp:temp1,temp2,…,temp95` frames over TCP and republishes them
//! as a sequence of 16-channel `tel_temperature` frames, reusing the same
//! fixed-width-array topic the line-decoded temperature probes use (§6
//! defines no dedicated thermal-scanner topic).

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use ess_types::{TelTemperature, Topics};

use crate::error::DataClientError;
use crate::read_loop::DataSource;

const CHANNELS_PER_TOPIC: usize = 16;

pub struct ThermalScannerClient<T: Topics> {
    sensor_name: String,
    location: String,
    host: String,
    port: u16,
    topics: T,
    reader: Option<BufReader<OwnedReadHalf>>,
    _write_half: Option<OwnedWriteHalf>,
}

impl<T: Topics> ThermalScannerClient<T> {
    pub fn new(sensor_name: impl Into<String>, location: impl Into<String>, host: impl Into<String>, port: u16, topics: T) -> Self {
        Self {
            sensor_name: sensor_name.into(),
            location: location.into(),
            host: host.into(),
            port,
            topics,
            reader: None,
            _write_half: None,
        }
    }

    fn publish_groups(&self, timestamp: f64, temperatures: &[f64]) {
        for (group_index, chunk) in temperatures.chunks(CHANNELS_PER_TOPIC).enumerate() {
            self.topics.tel_temperature(TelTemperature {
                sensor_name: format!("{}-group{}", self.sensor_name, group_index),
                timestamp,
                temperature_item: chunk.to_vec(),
                num_channels: chunk.len() as u32,
                location: self.location.clone(),
            });
        }
    }
}

/// Parses one `timestamp:temp1,temp2,…` frame (§4.F.5). Malformed frames
/// are the caller's responsibility to log and skip.
fn parse_frame(line: &str) -> Option<(f64, Vec<f64>)> {
    let (timestamp_str, values_str) = line.split_once(':')?;
    let timestamp: f64 = timestamp_str.trim().parse().ok()?;
    let mut temperatures = Vec::new();
    for value in values_str.split(',') {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        temperatures.push(value.parse::<f64>().ok()?);
    }
    if temperatures.is_empty() {
        return None;
    }
    Some((timestamp, temperatures))
}

#[async_trait]
impl<T: Topics> DataSource for ThermalScannerClient<T> {
    async fn connect(&mut self) -> Result<(), DataClientError> {
        let stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        let (read_half, write_half) = stream.into_split();
        self.reader = Some(BufReader::new(read_half));
        self._write_half = Some(write_half);
        Ok(())
    }

    async fn read_data(&mut self) -> Result<(), DataClientError> {
        let Some(reader) = self.reader.as_mut() else {
            return Err(DataClientError::Protocol("read_data called before connect".into()));
        };
        let mut line = String::new();
        let bytes_read = reader.read_line(&mut line).await?;
        if bytes_read == 0 {
            return Err(DataClientError::Protocol("thermal scanner closed the connection".into()));
        }
        match parse_frame(line.trim_end()) {
            Some((timestamp, temperatures)) => {
                self.publish_groups(timestamp, &temperatures);
                Ok(())
            }
            None => {
                tracing::warn!(sensor_name = %self.sensor_name, line = %line.trim_end(), "discarding malformed thermal scanner frame");
                Ok(())
            }
        }
    }

    async fn disconnect(&mut self) {
        if let Some(mut write_half) = self._write_half.take() {
            let _ = write_half.shutdown().await;
        }
        self.reader = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ess_types::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default, Clone)]
    struct RecordingTopics {
        temperature: Arc<Mutex<Vec<TelTemperature>>>,
    }

    impl Topics for RecordingTopics {
        fn tel_temperature(&self, item: TelTemperature) {
            self.temperature.lock().unwrap().push(item);
        }
        fn tel_relative_humidity(&self, _item: TelRelativeHumidity) {}
        fn tel_dew_point(&self, _item: TelDewPoint) {}
        fn tel_pressure(&self, _item: TelPressure) {}
        fn tel_air_flow(&self, _item: TelAirFlow) {}
        fn tel_air_turbulence(&self, _item: TelAirTurbulence) {}
        fn tel_electric_field_strength(&self, _item: TelElectricFieldStrength) {}
        fn tel_lightning_strike_status(&self, _item: TelLightningStrikeStatus) {}
        fn tel_spectrum_analyzer(&self, _item: TelSpectrumAnalyzer) {}
        fn tel_particulate_matter(&self, _item: TelParticulateMatter) {}
        fn evt_sensor_status(&self, _item: EvtSensorStatus) {}
        fn evt_lightning_strike(&self, _item: EvtLightningStrike) {}
        fn evt_high_electric_field(&self, _item: EvtHighElectricField) {}
        fn evt_precipitation(&self, _item: EvtPrecipitation) {}
        fn tel_pdu(&self, _item: TelSnmpDevice) {}
        fn tel_xups(&self, _item: TelSnmpDevice) {}
        fn tel_schneider_pm5xxx(&self, _item: TelSnmpDevice) {}
    }

    #[test]
    fn splits_95_values_into_six_groups_with_a_short_final_group() {
        let values: Vec<f64> = (0..95).map(|i| i as f64).collect();
        let line = format!("123.0:{}", values.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(","));
        let (timestamp, parsed) = parse_frame(&line).unwrap();
        assert_eq!(timestamp, 123.0);
        assert_eq!(parsed.len(), 95);

        let topics = RecordingTopics::default();
        let client = ThermalScannerClient::new("scanner1", "dome", "127.0.0.1", 9000, topics.clone());
        client.publish_groups(timestamp, &parsed);
        let published = topics.temperature.lock().unwrap();
        assert_eq!(published.len(), 6);
        assert_eq!(published[0].num_channels, 16);
        assert_eq!(published[5].num_channels, 15);
        assert_eq!(published[5].sensor_name, "scanner1-group5");
    }

    #[test]
    fn malformed_frame_is_rejected() {
        assert!(parse_frame("not-a-valid-frame").is_none());
        assert!(parse_frame("123.0:").is_none());
    }
}
