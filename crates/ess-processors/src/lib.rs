//! Telemetry processors (spec §4.D): one struct per sensor type,
//! implementing `ess_types::Processor`. Each owns whatever accumulator and
//! debounce-timer state its sensor type needs and references (never owns)
//! a `&dyn Topics` handed to it per call.

mod air_flow;
mod air_turbulence;
mod aurora;
mod efm100c;
mod hx85;
mod ld250;
mod sps30;
mod temperature;
mod timer;

pub use air_flow::WindsonicProcessor;
pub use air_turbulence::AirTurbulenceProcessor;
pub use aurora::AuroraProcessor;
pub use efm100c::Efm100cProcessor;
pub use hx85::{Hx85aProcessor, Hx85baProcessor};
pub use ld250::Ld250Processor;
pub use sps30::Sps30Processor;
pub use temperature::TemperatureProcessor;
pub use timer::SingleShotTimer;
