//! Device supervisor (spec §4.C): owns one transport end-to-end, turning
//! raw bytes into framed, decoded `SensorReading`s delivered to a callback
//! channel, with cooperative cancellation and a bounded shutdown grace
//! period.

mod error;
mod framing;
mod handle;
mod latin1;
mod supervisor;
mod transport;

pub use error::SupervisorError;
pub use handle::SupervisorHandle;
pub use supervisor::{DeviceLifecycle, DeviceSupervisor, SupervisorControl};
pub use transport::Transport;
