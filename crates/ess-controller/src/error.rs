//! Errors for the controller protocol (spec §4.E).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("controller I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed controller-protocol frame: {0}")]
    Frame(#[from] serde_json::Error),

    /// §4.E: "commands are sent one at a time" — a second `send_command`
    /// call while one is outstanding is a caller bug, not a wire condition.
    #[error("a command is already outstanding on this connection")]
    CommandAlreadyOutstanding,

    #[error("the controller connection closed while a command reply was outstanding")]
    ConnectionClosed,
}
