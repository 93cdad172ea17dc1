//! Builds the right `ess-processors` type for a configured device (§4.D,
//! §4.F.1). The spectrum analyzer and thermal scanner (§4.F.4, §4.F.5)
//! publish their topics directly from their own data clients and have no
//! entry here; neither do the SNMP device kinds (§4.F.3), which publish
//! `TelSnmpDevice` straight from the MIB walk.

use ess_processors::{
    AirTurbulenceProcessor, AuroraProcessor, Efm100cProcessor, Hx85aProcessor, Hx85baProcessor, Ld250Processor,
    Sps30Processor, TemperatureProcessor, WindsonicProcessor,
};
use ess_types::config::SensorType;
use ess_types::{DeviceConfig, Processor};

#[derive(Debug, thiserror::Error)]
pub enum ProcessorFactoryError {
    #[error("sensor_type {0:?} has no line-decoder processor (handled by a dedicated data client)")]
    NotALineProcessor(SensorType),
    #[error("{field} is required to build a processor for {sensor_type:?}")]
    MissingField { sensor_type: SensorType, field: &'static str },
}

/// Mirrors `DecoderRegistry`: one explicit match, not a registry, since
/// unlike decoders these constructors take config-derived parameters rather
/// than being default-constructible.
pub fn build_processor(config: &DeviceConfig) -> Result<Box<dyn Processor>, ProcessorFactoryError> {
    let require_u32 = |value: Option<u32>, field: &'static str| {
        value.ok_or(ProcessorFactoryError::MissingField { sensor_type: config.sensor_type, field })
    };
    let require_f64 = |value: Option<f64>, field: &'static str| {
        value.ok_or(ProcessorFactoryError::MissingField { sensor_type: config.sensor_type, field })
    };

    Ok(match config.sensor_type {
        SensorType::Temperature => {
            let channels = require_u32(config.channels, "channels")?;
            Box::new(TemperatureProcessor::new(config.name.clone(), config.location.clone(), channels))
        }
        SensorType::Hx85A => Box::new(Hx85aProcessor::new(config.name.clone(), config.location.clone(), config.channels)),
        SensorType::Hx85Ba => Box::new(Hx85baProcessor::new(config.name.clone(), config.location.clone(), config.channels)),
        SensorType::Csat3B => {
            let num_samples = require_u32(config.num_samples, "num_samples")?;
            Box::new(AirTurbulenceProcessor::new(config.name.clone(), config.location.clone(), num_samples))
        }
        SensorType::Windsonic => {
            let num_samples = require_u32(config.num_samples, "num_samples")?;
            Box::new(WindsonicProcessor::new(config.name.clone(), config.location.clone(), num_samples))
        }
        SensorType::Efm100C => {
            let num_samples = require_u32(config.num_samples, "num_samples")?;
            let threshold = require_f64(config.threshold, "threshold")?;
            let safe_interval = require_f64(config.safe_interval, "safe_interval")?;
            Box::new(Efm100cProcessor::new(config.name.clone(), config.location.clone(), num_samples, threshold, safe_interval))
        }
        SensorType::Ld250 => {
            let safe_interval = require_f64(config.safe_interval, "safe_interval")?;
            Box::new(Ld250Processor::new(config.name.clone(), config.location.clone(), safe_interval))
        }
        SensorType::Aurora => Box::new(AuroraProcessor::new(config.name.clone(), config.location.clone())),
        SensorType::Sps30 => Box::new(Sps30Processor::new(config.name.clone(), config.location.clone())),
        SensorType::SpectrumAnalyzer
        | SensorType::ThermalScanner
        | SensorType::SnmpPdu
        | SensorType::SnmpXups
        | SensorType::SnmpSchneiderPm5xxx => return Err(ProcessorFactoryError::NotALineProcessor(config.sensor_type)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(sensor_type: SensorType) -> DeviceConfig {
        DeviceConfig {
            name: "dev1".into(),
            sensor_type,
            transport: None,
            baud_rate: 19200,
            location: "roof".into(),
            channels: None,
            num_samples: None,
            safe_interval: None,
            threshold: None,
            poll_interval: None,
            host: Some("127.0.0.1".into()),
            port: Some(9000),
            max_read_timeouts: 5,
            connect_timeout: 60.0,
            read_timeout: None,
            rate_limit: 0.5,
            snmp_community: None,
            freq_start_value: None,
            freq_start_unit: None,
            freq_stop_value: None,
            freq_stop_unit: None,
        }
    }

    #[test]
    fn temperature_requires_channels() {
        let config = base(SensorType::Temperature);
        assert!(matches!(build_processor(&config), Err(ProcessorFactoryError::MissingField { field: "channels", .. })));
    }

    #[test]
    fn temperature_builds_with_channels() {
        let mut config = base(SensorType::Temperature);
        config.channels = Some(4);
        assert!(build_processor(&config).is_ok());
    }

    #[test]
    fn spectrum_analyzer_has_no_processor() {
        let config = base(SensorType::SpectrumAnalyzer);
        assert!(matches!(build_processor(&config), Err(ProcessorFactoryError::NotALineProcessor(_))));
    }
}
