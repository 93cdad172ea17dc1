//! The topic sink this binary hands to every processor and data client.
//!
//! spec §1 excludes the upstream control-system message bus as an external
//! collaborator: we only implement the topic-set interface (`ess_types::
//! Topics`) the rest of the workspace writes to. Here that interface is
//! realized as structured `tracing` events, one per topic write, carrying
//! the same fields a real SAL/DDS publish would carry — the daemon's
//! stand-in for "hand this frame to the message bus," in the same spirit as
//! the teacher's `websocket_broker` relaying board samples to whatever is
//! listening.
use ess_types::*;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTopics;

impl Topics for TracingTopics {
    fn tel_temperature(&self, item: TelTemperature) {
        tracing::info!(
            sensor_name = %item.sensor_name,
            timestamp = item.timestamp,
            num_channels = item.num_channels,
            temperature_item = ?item.temperature_item,
            location = %item.location,
            "tel_temperature"
        );
    }

    fn tel_relative_humidity(&self, item: TelRelativeHumidity) {
        tracing::info!(
            sensor_name = %item.sensor_name,
            timestamp = item.timestamp,
            relative_humidity_item = item.relative_humidity_item,
            location = %item.location,
            "tel_relativeHumidity"
        );
    }

    fn tel_dew_point(&self, item: TelDewPoint) {
        tracing::info!(
            sensor_name = %item.sensor_name,
            timestamp = item.timestamp,
            dew_point_item = item.dew_point_item,
            location = %item.location,
            "tel_dewPoint"
        );
    }

    fn tel_pressure(&self, item: TelPressure) {
        tracing::info!(
            sensor_name = %item.sensor_name,
            timestamp = item.timestamp,
            num_channels = item.num_channels,
            pressure_item = ?item.pressure_item,
            location = %item.location,
            "tel_pressure"
        );
    }

    fn tel_air_flow(&self, item: TelAirFlow) {
        tracing::info!(
            sensor_name = %item.sensor_name,
            timestamp = item.timestamp,
            location = %item.location,
            direction = item.direction,
            direction_std_dev = item.direction_std_dev,
            speed = item.speed,
            speed_std_dev = item.speed_std_dev,
            max_speed = item.max_speed,
            "tel_airFlow"
        );
    }

    fn tel_air_turbulence(&self, item: TelAirTurbulence) {
        tracing::info!(
            sensor_name = %item.sensor_name,
            timestamp = item.timestamp,
            location = %item.location,
            speed = item.speed,
            speed_magnitude = item.speed_magnitude,
            speed_max_magnitude = item.speed_max_magnitude,
            speed_std_dev = item.speed_std_dev,
            sonic_temperature = item.sonic_temperature,
            sonic_temperature_std_dev = item.sonic_temperature_std_dev,
            "tel_airTurbulence"
        );
    }

    fn tel_electric_field_strength(&self, item: TelElectricFieldStrength) {
        tracing::info!(
            sensor_name = %item.sensor_name,
            timestamp = item.timestamp,
            location = %item.location,
            strength = item.strength,
            strength_std_dev = item.strength_std_dev,
            strength_max = item.strength_max,
            "tel_electricFieldStrength"
        );
    }

    fn tel_lightning_strike_status(&self, item: TelLightningStrikeStatus) {
        tracing::info!(
            sensor_name = %item.sensor_name,
            timestamp = item.timestamp,
            close_strike_rate = item.close_strike_rate,
            total_strike_rate = item.total_strike_rate,
            close_alarm_status = item.close_alarm_status,
            severe_alarm_status = item.severe_alarm_status,
            heading = item.heading,
            location = %item.location,
            "tel_lightningStrikeStatus"
        );
    }

    fn tel_spectrum_analyzer(&self, item: TelSpectrumAnalyzer) {
        tracing::info!(
            sensor_name = %item.sensor_name,
            location = %item.location,
            start_frequency = item.start_frequency,
            stop_frequency = item.stop_frequency,
            spectrum_len = item.spectrum.len(),
            timestamp = item.timestamp,
            "tel_spectrumAnalyzer"
        );
    }

    fn tel_particulate_matter(&self, item: TelParticulateMatter) {
        tracing::info!(sensor_name = %item.sensor_name, timestamp = item.timestamp, location = %item.location, "tel_particulateMatter");
    }

    fn evt_sensor_status(&self, item: EvtSensorStatus) {
        tracing::info!(
            sensor_name = %item.sensor_name,
            sensor_status = item.sensor_status,
            server_status = item.server_status,
            "evt_sensorStatus"
        );
    }

    fn evt_lightning_strike(&self, item: EvtLightningStrike) {
        tracing::info!(
            sensor_name = %item.sensor_name,
            corrected_distance = item.corrected_distance,
            uncorrected_distance = item.uncorrected_distance,
            bearing = item.bearing,
            "evt_lightningStrike"
        );
    }

    fn evt_high_electric_field(&self, item: EvtHighElectricField) {
        tracing::info!(sensor_name = %item.sensor_name, strength = item.strength, "evt_highElectricField");
    }

    fn evt_precipitation(&self, item: EvtPrecipitation) {
        tracing::info!(sensor_name = %item.sensor_name, "evt_precipitation: {:?}", item);
    }

    fn tel_pdu(&self, item: TelSnmpDevice) {
        tracing::info!(sensor_name = %item.sensor_name, timestamp = item.timestamp, "tel_pdu");
    }

    fn tel_xups(&self, item: TelSnmpDevice) {
        tracing::info!(sensor_name = %item.sensor_name, timestamp = item.timestamp, "tel_xups");
    }

    fn tel_schneider_pm5xxx(&self, item: TelSnmpDevice) {
        tracing::info!(sensor_name = %item.sensor_name, timestamp = item.timestamp, "tel_schneiderPm5xxx");
    }
}
