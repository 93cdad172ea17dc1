//! Direct device data client (§4.F.1): the concrete `DataSource` for sensors
//! reached over serial/TCP/FTDI through an `ess-supervisor` device
//! supervisor — every sensor type except the controller-protocol relay
//! (§4.F.2) and SNMP equipment (§4.F.3).
//!
//! Component boundary (§4.C vs §4.F.1): the supervisor never stops on its
//! own because of read timeouts; it logs and keeps looping. This client
//! counts "no `SensorReading` arrived on the channel within `read_timeout`"
//! as the failure the base `ReadLoopDriver` tracks against
//! `max_read_timeouts`, exactly as spec §4.C assigns that responsibility to
//! the data-client layer.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use ess_decoders::Decoder;
use ess_supervisor::{DeviceSupervisor, SupervisorHandle};
use ess_types::{DeviceConfig, Processor, SensorReading, Topics};

use crate::error::DataClientError;
use crate::read_loop::DataSource;

/// Builds a fresh decoder for each (re)connect; supervisors consume their
/// decoder, so `DirectDeviceClient` cannot hold on to a single instance
/// across reconnects.
pub trait DecoderFactory: Send {
    fn make(&self) -> Box<dyn Decoder>;
}

impl<F> DecoderFactory for F
where
    F: Fn() -> Box<dyn Decoder> + Send,
{
    fn make(&self) -> Box<dyn Decoder> {
        (self)()
    }
}

pub struct DirectDeviceClient<P: Processor, T: Topics> {
    config: DeviceConfig,
    decoder_factory: Box<dyn DecoderFactory>,
    processor: P,
    topics: T,
    telemetry_loop_finish_timeout: Duration,
    error_sleep: Duration,
    read_timeout: Duration,
    supervisor: Option<SupervisorHandle>,
    readings: Option<mpsc::UnboundedReceiver<SensorReading>>,
}

impl<P: Processor, T: Topics> DirectDeviceClient<P, T> {
    pub fn new(
        config: DeviceConfig,
        decoder_factory: Box<dyn DecoderFactory>,
        processor: P,
        topics: T,
        telemetry_loop_finish_timeout: Duration,
        error_sleep: Duration,
    ) -> Self {
        let read_timeout = Duration::from_secs_f64(config.read_timeout.unwrap_or(5.0).max(0.1));
        Self {
            config,
            decoder_factory,
            processor,
            topics,
            telemetry_loop_finish_timeout,
            error_sleep,
            read_timeout,
            supervisor: None,
            readings: None,
        }
    }
}

#[async_trait]
impl<P: Processor, T: Topics> DataSource for DirectDeviceClient<P, T> {
    async fn connect(&mut self) -> Result<(), DataClientError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let decoder = self.decoder_factory.make();
        let supervisor = DeviceSupervisor::new(
            self.config.clone(),
            decoder,
            tx,
            self.read_timeout,
            self.telemetry_loop_finish_timeout,
            self.error_sleep,
        );
        self.supervisor = Some(SupervisorHandle::spawn(supervisor, self.telemetry_loop_finish_timeout));
        self.readings = Some(rx);
        Ok(())
    }

    async fn read_data(&mut self) -> Result<(), DataClientError> {
        let Some(readings) = self.readings.as_mut() else {
            return Err(DataClientError::Protocol("read_data called before connect".into()));
        };
        match tokio::time::timeout(self.read_timeout, readings.recv()).await {
            Ok(Some(reading)) => {
                self.processor.process_telemetry(
                    reading.timestamp,
                    reading.response_code,
                    &reading.sensor_telemetry,
                    &self.topics,
                );
                Ok(())
            }
            Ok(None) => Err(DataClientError::Protocol("supervisor task ended".into())),
            Err(_) => Err(DataClientError::Timeout),
        }
    }

    async fn disconnect(&mut self) {
        self.readings = None;
        if let Some(supervisor) = self.supervisor.take() {
            if let Err(e) = supervisor.shutdown().await {
                tracing::warn!(name = %self.config.name, error = %e, "supervisor reported an error on shutdown");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ess_decoders::TemperatureDecoder;
    use ess_types::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
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

    struct CountingProcessor {
        count: Arc<AtomicUsize>,
    }

    impl Processor for CountingProcessor {
        fn process_telemetry(&mut self, _now: f64, _response_code: ResponseCode, _sensor_telemetry: &[Scalar], _topics: &dyn Topics) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn temperature_config(port: u16) -> DeviceConfig {
        serde_json::from_value(serde_json::json!({
            "name": "temp1",
            "sensor_type": "Temperature",
            "host": "127.0.0.1",
            "port": port,
            "location": "roof",
            "channels": 4,
            "read_timeout": 1.0,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn forwards_decoded_readings_to_the_processor() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            let (mut stream, _) = listener.accept().await.unwrap();
            stream.write_all(b"1.0,2.0,3.0,4.0\r\n").await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let processed = Arc::new(AtomicUsize::new(0));
        let config = temperature_config(addr.port());
        let client = DirectDeviceClient::new(
            config,
            Box::new(|| Box::new(TemperatureDecoder::new(4)) as Box<dyn Decoder>),
            CountingProcessor { count: processed.clone() },
            RecordingTopics::default(),
            Duration::from_millis(200),
            Duration::from_millis(50),
        );

        let driver = crate::read_loop::ReadLoopDriver::new(
            client,
            crate::read_loop::ReadLoopConfig {
                max_read_timeouts: 5,
                connect_timeout: Duration::from_millis(200),
                read_timeout: Duration::from_millis(500),
                rate_limit: Duration::from_millis(10),
            },
        );
        let handle = driver.spawn();
        tokio::time::sleep(Duration::from_millis(150)).await;
        handle.stop(Duration::from_millis(300)).await;

        assert!(processed.load(Ordering::SeqCst) >= 1);
    }
}
