//! Error types for the device supervisor (spec §4.C, §7).

use thiserror::Error;

/// Fatal supervisor-level failures. Transient read timeouts and decode
/// failures are *not* represented here — per §7 they are logged and the
/// loop continues, counted by the data-client layer instead.
#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("failed to open transport for '{name}': {source}")]
    TransportOpen {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("transport I/O error: {0}")]
    TransportIo(#[from] std::io::Error),

    #[error("device config names a transport this build was not compiled with: {0}")]
    UnsupportedTransport(&'static str),

    #[error("device config has neither a serial/FTDI transport nor a host/port")]
    NoTransportConfigured,
}
