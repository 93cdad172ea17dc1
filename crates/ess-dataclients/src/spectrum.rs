//! Spectrum analyzer data client (§4.F.4): a Siglent-style instrument
//! reached over TCP with a line-oriented SCPI-like command set.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use ess_types::config::FrequencyUnit;
use ess_types::{TelSpectrumAnalyzer, Topics};

use crate::error::DataClientError;
use crate::read_loop::DataSource;

fn now_tai_unix_seconds() -> f64 {
    std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH).unwrap_or_default().as_secs_f64()
}

pub struct SpectrumAnalyzerClient<T: Topics> {
    sensor_name: String,
    location: String,
    host: String,
    port: u16,
    freq_start_value: f64,
    freq_start_unit: FrequencyUnit,
    freq_stop_value: f64,
    freq_stop_unit: FrequencyUnit,
    topics: T,
    read_half: Option<BufReader<OwnedReadHalf>>,
    write_half: Option<OwnedWriteHalf>,
    start_frequency_hz: f64,
    stop_frequency_hz: f64,
    discarded_first_reply: bool,
}

impl<T: Topics> SpectrumAnalyzerClient<T> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sensor_name: impl Into<String>,
        location: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        freq_start_value: f64,
        freq_start_unit: FrequencyUnit,
        freq_stop_value: f64,
        freq_stop_unit: FrequencyUnit,
        topics: T,
    ) -> Self {
        Self {
            sensor_name: sensor_name.into(),
            location: location.into(),
            host: host.into(),
            port,
            freq_start_value,
            freq_start_unit,
            freq_stop_value,
            freq_stop_unit,
            topics,
            read_half: None,
            write_half: None,
            start_frequency_hz: 0.0,
            stop_frequency_hz: 0.0,
            discarded_first_reply: false,
        }
    }

    async fn write_command(&mut self, command: &str) -> Result<(), DataClientError> {
        let Some(write_half) = self.write_half.as_mut() else {
            return Err(DataClientError::Protocol("write_command called before connect".into()));
        };
        write_half.write_all(command.as_bytes()).await?;
        write_half.write_all(b"\n").await?;
        Ok(())
    }

    async fn read_reply(&mut self) -> Result<String, DataClientError> {
        let Some(read_half) = self.read_half.as_mut() else {
            return Err(DataClientError::Protocol("read_reply called before connect".into()));
        };
        let mut line = String::new();
        let bytes_read = read_half.read_line(&mut line).await?;
        if bytes_read == 0 {
            return Err(DataClientError::Protocol("spectrum analyzer closed the connection".into()));
        }
        Ok(line.trim_end().to_string())
    }
}

/// Unit-aware SCPI frequency literal (§4.F.4: "unit-aware formatting").
fn format_frequency(value: f64, unit: FrequencyUnit) -> String {
    let suffix = match unit {
        FrequencyUnit::Ghz => "GHz",
        FrequencyUnit::Mhz => "MHz",
        FrequencyUnit::Khz => "kHz",
        FrequencyUnit::Hz => "Hz",
    };
    format!("{value}{suffix}")
}

#[async_trait]
impl<T: Topics> DataSource for SpectrumAnalyzerClient<T> {
    async fn connect(&mut self) -> Result<(), DataClientError> {
        let stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        let (read_half, write_half) = stream.into_split();
        self.read_half = Some(BufReader::new(read_half));
        self.write_half = Some(write_half);
        self.discarded_first_reply = false;
        Ok(())
    }

    async fn setup_reading(&mut self) -> Result<(), DataClientError> {
        let start_command = format!(":FREQ:START {}", format_frequency(self.freq_start_value, self.freq_start_unit));
        let stop_command = format!(":FREQ:STOP {}", format_frequency(self.freq_stop_value, self.freq_stop_unit));
        self.write_command(&start_command).await?;
        self.write_command(&stop_command).await?;

        self.write_command(":FREQ:START?").await?;
        let start_reply = self.read_reply().await?;
        self.start_frequency_hz = start_reply
            .parse()
            .map_err(|_| DataClientError::Protocol(format!("unparseable start frequency reply: {start_reply}")))?;

        self.write_command(":FREQ:STOP?").await?;
        let stop_reply = self.read_reply().await?;
        self.stop_frequency_hz = stop_reply
            .parse()
            .map_err(|_| DataClientError::Protocol(format!("unparseable stop frequency reply: {stop_reply}")))?;

        Ok(())
    }

    async fn read_data(&mut self) -> Result<(), DataClientError> {
        self.write_command(":TRACE:DATA?").await?;
        let reply = self.read_reply().await?;

        if !self.discarded_first_reply {
            self.discarded_first_reply = true;
            return Ok(());
        }

        let spectrum: Result<Vec<f64>, _> = reply.split(',').map(|v| v.trim().parse::<f64>()).collect();
        let spectrum = spectrum.map_err(|_| DataClientError::Protocol(format!("unexpected trace reply: {reply}")))?;

        self.topics.tel_spectrum_analyzer(TelSpectrumAnalyzer {
            sensor_name: self.sensor_name.clone(),
            location: self.location.clone(),
            start_frequency: self.start_frequency_hz,
            stop_frequency: self.stop_frequency_hz,
            spectrum,
            timestamp: now_tai_unix_seconds(),
        });
        Ok(())
    }

    async fn disconnect(&mut self) {
        if let Some(mut write_half) = self.write_half.take() {
            let _ = write_half.shutdown().await;
        }
        self.read_half = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_frequency_with_unit_suffix() {
        assert_eq!(format_frequency(2.4, FrequencyUnit::Ghz), "2.4GHz");
        assert_eq!(format_frequency(100.0, FrequencyUnit::Khz), "100kHz");
    }

    #[tokio::test]
    async fn setup_queries_start_stop_then_first_trace_reply_is_discarded() {
        use ess_types::*;
        use std::sync::{Arc, Mutex};
        use tokio::net::TcpListener;

        #[derive(Default, Clone)]
        struct RecordingTopics {
            spectrum: Arc<Mutex<Vec<TelSpectrumAnalyzer>>>,
        }
        impl Topics for RecordingTopics {
            fn tel_temperature(&self, _item: TelTemperature) {}
            fn tel_relative_humidity(&self, _item: TelRelativeHumidity) {}
            fn tel_dew_point(&self, _item: TelDewPoint) {}
            fn tel_pressure(&self, _item: TelPressure) {}
            fn tel_air_flow(&self, _item: TelAirFlow) {}
            fn tel_air_turbulence(&self, _item: TelAirTurbulence) {}
            fn tel_electric_field_strength(&self, _item: TelElectricFieldStrength) {}
            fn tel_lightning_strike_status(&self, _item: TelLightningStrikeStatus) {}
            fn tel_spectrum_analyzer(&self, item: TelSpectrumAnalyzer) {
                self.spectrum.lock().unwrap().push(item);
            }
            fn tel_particulate_matter(&self, _item: TelParticulateMatter) {}
            fn evt_sensor_status(&self, _item: EvtSensorStatus) {}
            fn evt_lightning_strike(&self, _item: EvtLightningStrike) {}
            fn evt_high_electric_field(&self, _item: EvtHighElectricField) {}
            fn evt_precipitation(&self, _item: EvtPrecipitation) {}
            fn tel_pdu(&self, _item: TelSnmpDevice) {}
            fn tel_xups(&self, _item: TelSnmpDevice) {}
            fn tel_schneider_pm5xxx(&self, _item: TelSnmpDevice) {}
        }

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
            let (stream, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = stream.into_split();
            let mut reader = BufReader::new(read_half);
            let mut line = String::new();

            // :FREQ:START <val>, :FREQ:STOP <val>, :FREQ:START?, :FREQ:STOP?
            for _ in 0..2 {
                line.clear();
                reader.read_line(&mut line).await.unwrap();
            }
            line.clear();
            reader.read_line(&mut line).await.unwrap();
            write_half.write_all(b"1000000\n").await.unwrap();
            line.clear();
            reader.read_line(&mut line).await.unwrap();
            write_half.write_all(b"2000000\n").await.unwrap();

            // First trace query: truncated reply, discarded by the client.
            line.clear();
            reader.read_line(&mut line).await.unwrap();
            write_half.write_all(b"\n").await.unwrap();

            // Second trace query: real data.
            line.clear();
            reader.read_line(&mut line).await.unwrap();
            write_half.write_all(b"1.0,2.0,3.0\n").await.unwrap();
        });

        let topics = RecordingTopics::default();
        let mut client = SpectrumAnalyzerClient::new(
            "spec1",
            "roof",
            "127.0.0.1",
            addr.port(),
            2.0,
            FrequencyUnit::Ghz,
            4.0,
            FrequencyUnit::Ghz,
            topics.clone(),
        );
        client.connect().await.unwrap();
        client.setup_reading().await.unwrap();
        assert_eq!(client.start_frequency_hz, 1_000_000.0);
        assert_eq!(client.stop_frequency_hz, 2_000_000.0);

        client.read_data().await.unwrap();
        assert!(topics.spectrum.lock().unwrap().is_empty(), "first trace reply must be discarded");

        client.read_data().await.unwrap();
        let published = topics.spectrum.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].spectrum, vec![1.0, 2.0, 3.0]);
    }
}
