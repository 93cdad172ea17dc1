//! The "topics" object (spec §6, §9) and the telemetry-processor trait
//! (§4.D) that writes to it.
//!
//! The original implementation passes around a dynamically-shaped object
//! whose attributes are discovered by name at call time. Per §9 we
//! reimplement this as an explicit trait with one method per topic: a mock
//! implementation for tests simply records every call it receives.

use crate::data::{ResponseCode, Scalar};
use crate::event::*;

/// One method per topic listed in §6. A processor holds a `&dyn Topics` (or
/// a generic `T: Topics`) and never owns it — the owning data client does.
pub trait Topics: Send + Sync {
    fn tel_temperature(&self, item: TelTemperature);
    fn tel_relative_humidity(&self, item: TelRelativeHumidity);
    fn tel_dew_point(&self, item: TelDewPoint);
    fn tel_pressure(&self, item: TelPressure);
    fn tel_air_flow(&self, item: TelAirFlow);
    fn tel_air_turbulence(&self, item: TelAirTurbulence);
    fn tel_electric_field_strength(&self, item: TelElectricFieldStrength);
    fn tel_lightning_strike_status(&self, item: TelLightningStrikeStatus);
    fn tel_spectrum_analyzer(&self, item: TelSpectrumAnalyzer);
    fn tel_particulate_matter(&self, item: TelParticulateMatter);
    fn evt_sensor_status(&self, item: EvtSensorStatus);
    fn evt_lightning_strike(&self, item: EvtLightningStrike);
    fn evt_high_electric_field(&self, item: EvtHighElectricField);
    fn evt_precipitation(&self, item: EvtPrecipitation);
    fn tel_pdu(&self, item: TelSnmpDevice);
    fn tel_xups(&self, item: TelSnmpDevice);
    fn tel_schneider_pm5xxx(&self, item: TelSnmpDevice);
}

/// One per sensor type (§4.D). Owns its accumulators and debounce timers;
/// references (never owns) the data client's `Topics` implementation.
///
/// `process_telemetry` is synchronous: processors do no I/O of their own,
/// only arithmetic and topic writes, so there is nothing to `.await`. Timer
/// state is advanced by comparing against a caller-supplied `now`, keeping
/// the trait testable without a real clock.
pub trait Processor: Send {
    fn process_telemetry(
        &mut self,
        now: f64,
        response_code: ResponseCode,
        sensor_telemetry: &[Scalar],
        topics: &dyn Topics,
    );
}
