//! Controller protocol (spec §4.E): a framed JSON request/response server
//! that lets an upstream data client configure a remote aggregator, command
//! it to start/stop, and receive streaming decoded readings, plus the
//! matching client.

mod client;
mod error;
mod framing;
mod server;

pub use client::ControllerClient;
pub use error::ControllerError;
pub use framing::{write_frame, FrameReader};
pub use server::ControllerServer;
