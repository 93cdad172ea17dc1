//! Device supervisor (§4.C): drives a single transport end-to-end, decoding
//! lines and handing every resulting `SensorReading` to a callback channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use ess_decoders::Decoder;
use ess_types::{DeviceConfig, ResponseCode, SensorReading};

use crate::error::SupervisorError;
use crate::framing::LineFramer;
use crate::latin1;
use crate::transport::{Transport, READ_CHUNK_SIZE};

/// Where a supervisor sits in its open/close lifecycle (§4.C).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceLifecycle {
    Created,
    Opening,
    Open,
    Closing,
    Closed,
}

fn now_tai_unix_seconds() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

pub struct DeviceSupervisor {
    name: String,
    config: DeviceConfig,
    decoder: Box<dyn Decoder>,
    telemetry_tx: UnboundedSender<SensorReading>,
    read_timeout: Duration,
    telemetry_loop_finish_timeout: Duration,
    error_sleep: Duration,
    cancellation: CancellationToken,
    injected_error: Arc<AtomicBool>,
    lifecycle: DeviceLifecycle,
}

/// A running supervisor's remote control: cancel it and/or toggle the
/// simulator-only injected error state without touching the task itself.
#[derive(Clone)]
pub struct SupervisorControl {
    cancellation: CancellationToken,
    injected_error: Arc<AtomicBool>,
}

impl SupervisorControl {
    pub fn request_shutdown(&self) {
        self.cancellation.cancel();
    }

    /// Only meaningful against simulator transports; real hardware has no
    /// way to observe this flag (§4.C).
    pub fn set_injected_error(&self, active: bool) {
        self.injected_error.store(active, Ordering::Relaxed);
    }
}

impl DeviceSupervisor {
    pub fn new(
        config: DeviceConfig,
        decoder: Box<dyn Decoder>,
        telemetry_tx: UnboundedSender<SensorReading>,
        read_timeout: Duration,
        telemetry_loop_finish_timeout: Duration,
        error_sleep: Duration,
    ) -> Self {
        Self {
            name: config.name.clone(),
            config,
            decoder,
            telemetry_tx,
            read_timeout,
            telemetry_loop_finish_timeout,
            error_sleep,
            cancellation: CancellationToken::new(),
            injected_error: Arc::new(AtomicBool::new(false)),
            lifecycle: DeviceLifecycle::Created,
        }
    }

    pub fn control(&self) -> SupervisorControl {
        SupervisorControl {
            cancellation: self.cancellation.clone(),
            injected_error: self.injected_error.clone(),
        }
    }

    pub fn lifecycle(&self) -> DeviceLifecycle {
        self.lifecycle
    }

    /// Runs the full open/read-loop/close lifecycle to completion. Intended
    /// to be spawned as its own task; cancellation is requested through the
    /// `SupervisorControl` returned by `control()` before this task is
    /// joined, per §4.C's cooperative-cancellation scheduling model.
    pub async fn run(mut self) -> Result<(), SupervisorError> {
        self.lifecycle = DeviceLifecycle::Opening;
        let mut transport = Transport::open(&self.config).await?;
        self.lifecycle = DeviceLifecycle::Open;

        let result = self.read_loop(&mut transport).await;

        self.lifecycle = DeviceLifecycle::Closing;
        match tokio::time::timeout(self.telemetry_loop_finish_timeout, transport.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(name = %self.name, error = %e, "error releasing transport"),
            Err(_) => tracing::warn!(
                name = %self.name,
                "transport close exceeded the telemetry-loop-finish-timeout"
            ),
        }
        self.lifecycle = DeviceLifecycle::Closed;

        result
    }

    async fn read_loop(&mut self, transport: &mut Transport) -> Result<(), SupervisorError> {
        let mut framer = LineFramer::new();
        let terminator = self.decoder.terminator();
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            if self.injected_error.load(Ordering::Relaxed) {
                tokio::select! {
                    _ = self.cancellation.cancelled() => return Ok(()),
                    _ = tokio::time::sleep(self.error_sleep) => {}
                }
                self.emit_injected_error();
                continue;
            }

            tokio::select! {
                _ = self.cancellation.cancelled() => return Ok(()),
                outcome = read_one_line(transport, &mut framer, terminator, &mut chunk, self.read_timeout) => {
                    match outcome {
                        Ok(Some(raw_line)) => self.handle_line(&raw_line),
                        Ok(None) => {
                            tracing::debug!(name = %self.name, "read timed out waiting for a line");
                        }
                        Err(e) => {
                            tracing::warn!(name = %self.name, error = %e, "transport read error");
                        }
                    }
                }
            }
        }
    }

    /// §4.C: "emit a reading with response_code = DEVICE_READ_ERROR and the
    /// decoder's line-terminator string as the line (which decoders must
    /// interpret as 'empty')". Feeding an empty string through the decoder
    /// gives exactly the all-NaN record a truncated/terminator-only frame
    /// would produce.
    fn emit_injected_error(&self) {
        let telemetry = self.decoder.decode("").unwrap_or_default();
        self.send(SensorReading {
            sensor_name: self.name.clone(),
            timestamp: now_tai_unix_seconds(),
            response_code: ResponseCode::DeviceReadError,
            sensor_telemetry: telemetry,
        });
    }

    /// A decoder error past this point is always `DecodeError::UnparseableLine`
    /// or `DuplicateEquals` (§7 `UnparseableLine`): a post-sync structural
    /// violation, not a partial frame or checksum failure (those already
    /// return `Ok` with an all-NaN record). Log and drop the line; no
    /// reading is emitted for it.
    fn handle_line(&self, raw_line: &[u8]) {
        let line = latin1::decode(raw_line);
        match self.decoder.decode(&line) {
            Ok(telemetry) => self.send(SensorReading::ok(self.name.clone(), now_tai_unix_seconds(), telemetry)),
            Err(e) => {
                tracing::warn!(name = %self.name, error = %e, line = %line, "discarding unparseable line");
            }
        }
    }

    fn send(&self, reading: SensorReading) {
        if self.telemetry_tx.send(reading).is_err() {
            tracing::debug!(name = %self.name, "telemetry receiver dropped; discarding reading");
        }
    }
}

/// Reads transport chunks into `framer` until either a complete line is
/// buffered or `read_timeout` elapses with none available.
async fn read_one_line(
    transport: &mut Transport,
    framer: &mut LineFramer,
    terminator: &[u8],
    chunk: &mut [u8],
    read_timeout: Duration,
) -> Result<Option<Vec<u8>>, std::io::Error> {
    if let Some(line) = framer.pop_line(terminator) {
        return Ok(Some(line));
    }

    let deadline = tokio::time::Instant::now() + read_timeout;
    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        if remaining.is_zero() {
            return Ok(None);
        }
        let read = match tokio::time::timeout(remaining, transport.read_chunk(chunk)).await {
            Ok(read) => read,
            Err(_) => return Ok(None),
        };
        let n = read?;
        if n == 0 {
            return Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "transport closed"));
        }
        framer.push(&chunk[..n]);
        if let Some(line) = framer.pop_line(terminator) {
            return Ok(Some(line));
        }
    }
}
