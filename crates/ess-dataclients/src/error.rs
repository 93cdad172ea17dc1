//! Errors for the data-client layer (spec §4.F, §7).

use thiserror::Error;

/// A single `read_data()` attempt's failure (§4.F.1 pseudocode). The
/// `ReadLoopDriver` counts consecutive occurrences of this against
/// `max_read_timeouts`; it never inspects *which* variant fired, matching
/// the original's blanket `except Exception`.
#[derive(Error, Debug)]
pub enum DataClientError {
    #[error("timed out waiting for data")]
    Timeout,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("controller protocol error: {0}")]
    Controller(#[from] ess_controller::ControllerError),

    #[error("device reported DEVICE_READ_ERROR; hardware fault")]
    DeviceReadError,

    #[error("malformed or unexpected frame: {0}")]
    Protocol(String),
}
