//! Controller data client (§4.F.2): uses the §4.E wire protocol as a
//! client, forwarding telemetry from a remote controller server to
//! per-sensor processors constructed lazily on first frame.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use ess_controller::ControllerClient;
use ess_types::{Command, DeviceConfig, Processor, ResponseCode, SensorReading, Topics};
use tokio::sync::mpsc;

use crate::error::DataClientError;
use crate::processor_factory::build_processor;
use crate::read_loop::DataSource;

pub struct ControllerDataClient<T: Topics> {
    host: String,
    port: u16,
    devices: Vec<DeviceConfig>,
    topics: T,
    read_timeout: Duration,
    client: Option<ControllerClient>,
    readings: Option<mpsc::UnboundedReceiver<SensorReading>>,
    processors: HashMap<String, Box<dyn Processor>>,
}

impl<T: Topics> ControllerDataClient<T> {
    pub fn new(host: impl Into<String>, port: u16, devices: Vec<DeviceConfig>, topics: T, read_timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            devices,
            topics,
            read_timeout,
            client: None,
            readings: None,
            processors: HashMap::new(),
        }
    }

    fn processor_for(&mut self, sensor_name: &str) -> Option<&mut Box<dyn Processor>> {
        if !self.processors.contains_key(sensor_name) {
            let device = self.devices.iter().find(|d| d.name == sensor_name)?;
            match build_processor(device) {
                Ok(processor) => {
                    self.processors.insert(sensor_name.to_string(), processor);
                }
                Err(e) => {
                    tracing::warn!(sensor_name, error = %e, "could not build a processor for this sensor");
                    return None;
                }
            }
        }
        self.processors.get_mut(sensor_name)
    }
}

#[async_trait]
impl<T: Topics> DataSource for ControllerDataClient<T> {
    async fn connect(&mut self) -> Result<(), DataClientError> {
        let (client, readings) = ControllerClient::connect((self.host.as_str(), self.port)).await?;
        let parameters = serde_json::json!({ "devices": self.devices });
        let response = client.send_command(Command::Configure, parameters).await?;
        if response != ResponseCode::Ok {
            return Err(DataClientError::Protocol(format!("configure was rejected: {response:?}")));
        }
        self.client = Some(client);
        self.readings = Some(readings);
        Ok(())
    }

    async fn read_data(&mut self) -> Result<(), DataClientError> {
        let Some(readings) = self.readings.as_mut() else {
            return Err(DataClientError::Protocol("read_data called before connect".into()));
        };
        let reading = match tokio::time::timeout(self.read_timeout, readings.recv()).await {
            Ok(Some(reading)) => reading,
            Ok(None) => return Err(DataClientError::Protocol("controller connection closed".into())),
            Err(_) => return Err(DataClientError::Timeout),
        };

        if reading.response_code == ResponseCode::DeviceReadError {
            return Err(DataClientError::DeviceReadError);
        }

        let topics = &self.topics;
        if let Some(processor) = self.processor_for(&reading.sensor_name) {
            processor.process_telemetry(reading.timestamp, reading.response_code, &reading.sensor_telemetry, topics);
        }
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.readings = None;
        if let Some(client) = self.client.take() {
            let _ = client.send_unacknowledged(Command::Disconnect).await;
            client.close().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ess_types::config::SensorType;
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

    fn device(name: &str) -> DeviceConfig {
        serde_json::from_value(serde_json::json!({
            "name": name,
            "sensor_type": "Temperature",
            "host": "127.0.0.1",
            "port": 9000,
            "location": "roof",
            "channels": 2,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn configure_then_dispatch_telemetry_to_lazily_built_processor() {
        use ess_controller::{write_frame, FrameReader};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = stream.into_split();
            let mut reader = FrameReader::new(read_half);
            let _configure: Request = reader.read_frame().await.unwrap().unwrap();
            write_frame(&mut write_half, &ServerFrame::response(ResponseCode::Ok)).await.unwrap();
            write_frame(
                &mut write_half,
                &ServerFrame::telemetry(SensorReading::ok("temp1", 1.0, vec![Scalar::Float(1.0), Scalar::Float(2.0)])),
            )
            .await
            .unwrap();
            tokio::time::sleep(Duration::from_millis(500)).await;
        });

        let topics = RecordingTopics::default();
        let mut client = ControllerDataClient::new(
            "127.0.0.1",
            addr.port(),
            vec![device("temp1")],
            topics.clone(),
            Duration::from_millis(500),
        );
        client.connect().await.unwrap();
        client.read_data().await.unwrap();
        assert_eq!(topics.temperature.lock().unwrap().len(), 1);

        client.disconnect().await;
        let _ = server.await;
    }
}
