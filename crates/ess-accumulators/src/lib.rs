//! Telemetry accumulators (spec §4.B): windowed reducers that turn a stream
//! of per-sample readings into a single publishable report once a fixed
//! window of good or bad samples has been seen.
//!
//! Every accumulator here shares the same contract (§4.B invariants):
//! samples accumulate in parallel sequences that never outgrow
//! `num_samples`, `get_topic_kwargs` is the only operation that clears the
//! window, and calling it before `do_report()` is true is a no-op.

mod air_flow;
mod air_turbulence;
mod electric_field;
mod stats;

pub use air_flow::{AirFlowAccumulator, AirFlowReport};
pub use air_turbulence::{AirTurbulenceAccumulator, AirTurbulenceReport};
pub use electric_field::{ElectricFieldReport, ElectricFieldStrengthAccumulator};
pub use stats::{circular_mean_and_std_dev, median_and_std_dev};
