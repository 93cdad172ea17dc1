//! Controller-protocol server (§4.E): the "remote aggregator" side. Accepts
//! one client connection at a time, handles `configure`/`start`/`stop`/
//! `disconnect`/`exit` commands, and streams every decoded `SensorReading`
//! from its configured devices back as telemetry frames.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use ess_decoders::{DecoderRegistry, TemperatureDecoder};
use ess_supervisor::{DeviceSupervisor, SupervisorHandle};
use ess_types::{Command, DeviceConfig, Request, ResponseCode, SensorReading, ServerFrame, SensorType};

use crate::error::ControllerError;
use crate::framing::{write_frame, FrameReader};

const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_FINISH_TIMEOUT: Duration = Duration::from_secs(2);
const DEFAULT_ERROR_SLEEP: Duration = Duration::from_secs(1);

/// Sensor types the controller-wire `configure` schema accepts — the raw
/// line-decodable sensors; SNMP, spectrum-analyzer, and thermal-scanner
/// devices are polled directly by their own `ess-dataclients` clients and
/// never sit behind this protocol (§4.E, §6).
fn decoder_for(sensor_type: SensorType, channels: Option<u32>) -> Option<Box<dyn ess_decoders::Decoder>> {
    if sensor_type == SensorType::Temperature {
        return Some(Box::new(TemperatureDecoder::new(channels.unwrap_or(1) as usize)));
    }
    DecoderRegistry::with_builtins().make(sensor_type)
}

pub struct ControllerServer {
    listener: TcpListener,
    shutdown: CancellationToken,
}

impl ControllerServer {
    pub async fn bind<A: ToSocketAddrs>(addr: A) -> Result<Self, ControllerError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, shutdown: CancellationToken::new() })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// A token the caller can cancel to stop `serve` from outside, in
    /// addition to the `exit` command stopping it from the wire.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Accepts connections one at a time (§5: "the controller-protocol
    /// server holds one client connection at a time") until cancelled
    /// externally or a client sends `exit`.
    pub async fn serve(self) -> Result<(), ControllerError> {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => return Ok(()),
                accepted = self.listener.accept() => {
                    let (stream, peer) = accepted?;
                    tracing::info!(%peer, "controller client connected");
                    let session = ConnectionSession::new(self.shutdown.clone());
                    if let Err(e) = session.run(stream).await {
                        tracing::warn!(%peer, error = %e, "controller session ended with an error");
                    }
                    if self.shutdown.is_cancelled() {
                        return Ok(());
                    }
                }
            }
        }
    }
}

/// Per-connection command-handler state (§4.E command table,
/// §9 Open Question (i): standardized on the configure-then-auto-start
/// style, with `start`/`stop` accepted as idempotent no-ops).
struct ServerState {
    devices: Option<Vec<DeviceConfig>>,
    started: bool,
    supervisors: Vec<SupervisorHandle>,
}

impl ServerState {
    fn new() -> Self {
        Self { devices: None, started: false, supervisors: Vec::new() }
    }

    async fn configure(
        &mut self,
        parameters: serde_json::Value,
        telemetry_tx: &mpsc::UnboundedSender<SensorReading>,
    ) -> ResponseCode {
        if self.started {
            return ResponseCode::AlreadyStarted;
        }
        let devices = match parameters.get("devices").cloned() {
            Some(value) => match serde_json::from_value::<Vec<DeviceConfig>>(value) {
                Ok(devices) if !devices.is_empty() => devices,
                _ => return ResponseCode::InvalidConfiguration,
            },
            None => return ResponseCode::InvalidConfiguration,
        };
        for device in &devices {
            if device.validate().is_err() || decoder_for(device.sensor_type, device.channels).is_none() {
                return ResponseCode::InvalidConfiguration;
            }
        }

        self.open_devices(&devices, telemetry_tx);
        self.devices = Some(devices);
        self.started = true;
        ResponseCode::Ok
    }

    fn open_devices(&mut self, devices: &[DeviceConfig], telemetry_tx: &mpsc::UnboundedSender<SensorReading>) {
        for device in devices {
            let Some(decoder) = decoder_for(device.sensor_type, device.channels) else { continue };
            let read_timeout = device.read_timeout.map(Duration::from_secs_f64).unwrap_or(DEFAULT_READ_TIMEOUT);
            let supervisor = DeviceSupervisor::new(
                device.clone(),
                decoder,
                telemetry_tx.clone(),
                read_timeout,
                DEFAULT_FINISH_TIMEOUT,
                DEFAULT_ERROR_SLEEP,
            );
            self.supervisors.push(SupervisorHandle::spawn(supervisor, DEFAULT_FINISH_TIMEOUT));
        }
    }

    async fn start(&mut self, telemetry_tx: &mpsc::UnboundedSender<SensorReading>) -> ResponseCode {
        let Some(devices) = self.devices.clone() else {
            return ResponseCode::NotConfigured;
        };
        if self.started {
            return ResponseCode::AlreadyStarted;
        }
        self.open_devices(&devices, telemetry_tx);
        self.started = true;
        ResponseCode::Ok
    }

    async fn stop(&mut self) -> ResponseCode {
        if !self.started {
            return ResponseCode::NotStarted;
        }
        self.shutdown_devices().await;
        self.started = false;
        ResponseCode::Ok
    }

    async fn shutdown_devices(&mut self) {
        for handle in self.supervisors.drain(..) {
            if let Err(e) = handle.shutdown().await {
                tracing::warn!(error = %e, "error shutting down a device supervisor");
            }
        }
    }
}

struct ConnectionSession {
    shutdown: CancellationToken,
}

impl ConnectionSession {
    fn new(shutdown: CancellationToken) -> Self {
        Self { shutdown }
    }

    /// Runs one client connection end to end. A per-connection write lock
    /// (§5: "a write-lock on that connection serializes command replies
    /// with telemetry frames") is shared between the command loop below and
    /// the telemetry-forwarding task it spawns.
    async fn run(&self, stream: TcpStream) -> Result<(), ControllerError> {
        let (read_half, write_half) = stream.into_split();
        let write_half = Arc::new(Mutex::new(write_half));
        let mut reader = FrameReader::new(read_half);
        let mut state = ServerState::new();
        let (telemetry_tx, mut telemetry_rx) = mpsc::unbounded_channel::<SensorReading>();

        let forward_write = write_half.clone();
        let forwarder = tokio::spawn(async move {
            while let Some(reading) = telemetry_rx.recv().await {
                let mut writer = forward_write.lock().await;
                if write_frame(&mut *writer, &ServerFrame::telemetry(reading)).await.is_err() {
                    break;
                }
            }
        });

        let mut exit_requested = false;
        loop {
            match reader.read_frame::<Request>().await {
                Ok(Some(request)) => match request.command {
                    Command::Disconnect => break,
                    Command::Exit => {
                        exit_requested = true;
                        break;
                    }
                    other => {
                        let response = match other {
                            Command::Configure => state.configure(request.parameters, &telemetry_tx).await,
                            Command::Start => state.start(&telemetry_tx).await,
                            Command::Stop => state.stop().await,
                            Command::Disconnect | Command::Exit => unreachable!(),
                        };
                        let mut writer = write_half.lock().await;
                        if write_frame(&mut *writer, &ServerFrame::response(response)).await.is_err() {
                            break;
                        }
                    }
                },
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "controller server frame read error");
                    break;
                }
            }
        }

        drop(telemetry_tx);
        let _ = forwarder.await;
        state.shutdown_devices().await;

        if exit_requested {
            self.shutdown.cancel();
        }
        Ok(())
    }
}
