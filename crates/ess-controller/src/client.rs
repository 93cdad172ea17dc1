//! Controller-protocol client (§4.E): sends commands one at a time and
//! demultiplexes the server's response frames from its streaming telemetry
//! frames over a single connection, per the response-correlation rule.

use std::sync::Arc;

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;

use ess_types::{Command, Request, ResponseCode, SensorReading, ServerFrame};

use crate::error::ControllerError;
use crate::framing::{write_frame, FrameReader};

/// A connected controller-protocol client. Telemetry frames are delivered
/// on the `mpsc::UnboundedReceiver` returned by `connect`; this handle only
/// issues commands.
pub struct ControllerClient {
    write_half: Arc<Mutex<OwnedWriteHalf>>,
    pending: Arc<Mutex<Option<oneshot::Sender<ResponseCode>>>>,
    reader_task: JoinHandle<()>,
}

impl ControllerClient {
    pub async fn connect<A: ToSocketAddrs>(
        addr: A,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SensorReading>), ControllerError> {
        let stream = TcpStream::connect(addr).await?;
        Self::from_stream(stream)
    }

    pub fn from_stream(
        stream: TcpStream,
    ) -> Result<(Self, mpsc::UnboundedReceiver<SensorReading>), ControllerError> {
        let (read_half, write_half) = stream.into_split();
        let write_half = Arc::new(Mutex::new(write_half));
        let pending: Arc<Mutex<Option<oneshot::Sender<ResponseCode>>>> = Arc::new(Mutex::new(None));
        let (telemetry_tx, telemetry_rx) = mpsc::unbounded_channel();

        let reader_task = tokio::spawn(Self::reader_loop(read_half, pending.clone(), telemetry_tx));

        Ok((Self { write_half, pending, reader_task }, telemetry_rx))
    }

    /// The demultiplexing loop (§4.E response-correlation rule): a
    /// `response` frame completes whatever command is outstanding (logged
    /// and dropped if none is), a `telemetry` frame always goes to the
    /// telemetry channel regardless of whether a command is outstanding.
    async fn reader_loop(
        read_half: OwnedReadHalf,
        pending: Arc<Mutex<Option<oneshot::Sender<ResponseCode>>>>,
        telemetry_tx: mpsc::UnboundedSender<SensorReading>,
    ) {
        let mut reader = FrameReader::new(read_half);
        loop {
            match reader.read_frame::<ServerFrame>().await {
                Ok(Some(ServerFrame::Response(r))) => match pending.lock().await.take() {
                    Some(tx) => {
                        let _ = tx.send(r.response);
                    }
                    None => tracing::warn!("received a command response with no command outstanding; ignoring"),
                },
                Ok(Some(ServerFrame::Telemetry(t))) => {
                    if telemetry_tx.send(t.telemetry).is_err() {
                        tracing::debug!("telemetry receiver dropped; discarding frame");
                    }
                }
                Ok(None) => {
                    tracing::debug!("controller connection closed by peer");
                    break;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "controller client frame read error");
                    break;
                }
            }
        }
    }

    /// Sends one command and awaits its correlated response (§4.E:
    /// "commands are sent one at a time"). Returns
    /// `ControllerError::CommandAlreadyOutstanding` if called again before
    /// the previous command's reply arrives.
    pub async fn send_command(
        &self,
        command: Command,
        parameters: serde_json::Value,
    ) -> Result<ResponseCode, ControllerError> {
        let (tx, rx) = oneshot::channel();
        {
            let mut guard = self.pending.lock().await;
            if guard.is_some() {
                return Err(ControllerError::CommandAlreadyOutstanding);
            }
            *guard = Some(tx);
        }

        let write_result = {
            let mut write_half = self.write_half.lock().await;
            write_frame(&mut *write_half, &Request { command, parameters }).await
        };
        if let Err(e) = write_result {
            self.pending.lock().await.take();
            return Err(e);
        }

        rx.await.map_err(|_| ControllerError::ConnectionClosed)
    }

    /// Sends `disconnect` or `exit`, which the server never acknowledges
    /// (§4.E: "(connection terminated)"), then tears down the reader task.
    pub async fn send_unacknowledged(&self, command: Command) -> Result<(), ControllerError> {
        let mut write_half = self.write_half.lock().await;
        write_frame(&mut *write_half, &Request { command, parameters: serde_json::Value::Null }).await
    }

    pub async fn close(self) {
        self.reader_task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn response_and_telemetry_are_demultiplexed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let (read_half, mut write_half) = stream.into_split();
            let mut reader = FrameReader::new(read_half);
            let _request: Request = reader.read_frame().await.unwrap().unwrap();
            // A telemetry frame arrives *before* the response it's racing against.
            write_frame(
                &mut write_half,
                &ServerFrame::telemetry(SensorReading::ok("temp1", 1.0, vec![])),
            )
            .await
            .unwrap();
            write_frame(&mut write_half, &ServerFrame::response(ResponseCode::Ok)).await.unwrap();
        });

        let (client, mut telemetry_rx) = ControllerClient::connect(("127.0.0.1", port)).await.unwrap();
        let response = client.send_command(Command::Configure, serde_json::json!({})).await.unwrap();
        assert_eq!(response, ResponseCode::Ok);

        let telemetry = telemetry_rx.recv().await.unwrap();
        assert_eq!(telemetry.sensor_name, "temp1");

        server.await.unwrap();
    }
}
