//! Transport acquisition and I/O for a device supervisor (§4.C: "serial/FTDI
//! with address and baud rate" or plain TCP).
//!
//! Serial and TCP transports are natively async (`tokio-serial`,
//! `tokio::net`) and read/write directly on the supervisor's task. FTDI
//! hardware is only reachable through `libftd2xx`'s blocking `Read`/`Write`
//! impl, so every call against it is dispatched to the blocking worker pool
//! (§5: "blocking third-party calls ... dispatched to a bounded worker pool
//! and awaited") and the handle is held behind a `std::sync::Mutex` shared
//! with that pool.

use std::io;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_serial::SerialStream;

use ess_types::{DeviceConfig, TransportFields};

use crate::error::SupervisorError;

/// One open device connection, however it is physically reached.
pub enum Transport {
    Serial(SerialStream),
    Tcp(TcpStream),
    #[cfg(feature = "ftdi")]
    Ftdi(FtdiTransport),
}

impl Transport {
    /// Opens the transport named by `config` (§4.C step 1): serial port or
    /// FTDI device by id, or a TCP connection to `host:port`.
    pub async fn open(config: &DeviceConfig) -> Result<Self, SupervisorError> {
        match &config.transport {
            Some(TransportFields::Serial { serial_port }) => {
                let stream = tokio_serial::new(serial_port, config.baud_rate)
                    .open_native_async()
                    .map_err(|e| SupervisorError::TransportOpen {
                        name: config.name.clone(),
                        source: io::Error::new(io::ErrorKind::Other, e.to_string()),
                    })?;
                Ok(Transport::Serial(stream))
            }
            #[cfg(feature = "ftdi")]
            Some(TransportFields::Ftdi { ftdi_id }) => {
                let handle = FtdiTransport::open(ftdi_id, config.baud_rate)
                    .map_err(|e| SupervisorError::TransportOpen {
                        name: config.name.clone(),
                        source: io::Error::new(io::ErrorKind::Other, e.to_string()),
                    })?;
                Ok(Transport::Ftdi(handle))
            }
            #[cfg(not(feature = "ftdi"))]
            Some(TransportFields::Ftdi { .. }) => {
                Err(SupervisorError::UnsupportedTransport("FTDI (build without the `ftdi` feature)"))
            }
            None => {
                let host = config.host.as_deref().ok_or(SupervisorError::NoTransportConfigured)?;
                let port = config.port.unwrap_or(ess_types::CONTROLLER_PORT);
                let stream = TcpStream::connect((host, port))
                    .await
                    .map_err(|e| SupervisorError::TransportOpen { name: config.name.clone(), source: e })?;
                Ok(Transport::Tcp(stream))
            }
        }
    }

    /// Reads whatever bytes are currently available into `buf`, returning
    /// the number read. `0` signals the peer closed the connection.
    pub async fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Transport::Serial(stream) => stream.read(buf).await,
            Transport::Tcp(stream) => stream.read(buf).await,
            #[cfg(feature = "ftdi")]
            Transport::Ftdi(handle) => handle.read_chunk(buf.len()).await.map(|data| {
                let n = data.len();
                buf[..n].copy_from_slice(&data);
                n
            }),
        }
    }

    pub async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        match self {
            Transport::Serial(stream) => stream.write_all(data).await,
            Transport::Tcp(stream) => stream.write_all(data).await,
            #[cfg(feature = "ftdi")]
            Transport::Ftdi(handle) => handle.write_all(data.to_vec()).await,
        }
    }

    /// Releases the transport (§4.C step 3). Serial and TCP streams close
    /// on drop; FTDI needs an explicit blocking close call.
    pub async fn close(self) -> io::Result<()> {
        match self {
            Transport::Serial(_) | Transport::Tcp(_) => Ok(()),
            #[cfg(feature = "ftdi")]
            Transport::Ftdi(handle) => handle.close().await,
        }
    }
}

#[cfg(feature = "ftdi")]
pub struct FtdiTransport {
    handle: std::sync::Arc<std::sync::Mutex<libftd2xx::Ftdi>>,
}

#[cfg(feature = "ftdi")]
impl FtdiTransport {
    pub fn open(ftdi_id: &str, baud_rate: u32) -> Result<Self, io::Error> {
        use libftd2xx::{Ftdi, FtdiCommon};
        let mut device = Ftdi::with_serial_number(ftdi_id)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        device
            .set_baud_rate(baud_rate)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        Ok(Self {
            handle: std::sync::Arc::new(std::sync::Mutex::new(device)),
        })
    }

    async fn read_chunk(&mut self, max_len: usize) -> io::Result<Vec<u8>> {
        use std::io::Read;
        let handle = self.handle.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = handle.lock().expect("FTDI handle mutex poisoned");
            let mut buf = vec![0u8; max_len];
            let n = guard.read(&mut buf)?;
            buf.truncate(n);
            Ok(buf)
        })
        .await
        .unwrap_or_else(|e| Err(io::Error::new(io::ErrorKind::Other, e.to_string())))
    }

    async fn write_all(&mut self, data: Vec<u8>) -> io::Result<()> {
        use std::io::Write;
        let handle = self.handle.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = handle.lock().expect("FTDI handle mutex poisoned");
            guard.write_all(&data)
        })
        .await
        .unwrap_or_else(|e| Err(io::Error::new(io::ErrorKind::Other, e.to_string())))
    }

    async fn close(self) -> io::Result<()> {
        use libftd2xx::FtdiCommon;
        tokio::task::spawn_blocking(move || {
            let mut guard = self.handle.lock().expect("FTDI handle mutex poisoned");
            guard.close().map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))
        })
        .await
        .unwrap_or_else(|e| Err(io::Error::new(io::ErrorKind::Other, e.to_string())))
    }
}

/// Default per-read-cycle buffer size; large enough for any sensor's line
/// length in one syscall without over-allocating.
pub const READ_CHUNK_SIZE: usize = 256;
