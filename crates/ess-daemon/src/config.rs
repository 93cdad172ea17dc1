//! Configuration loading for the sensor-telemetry aggregator binary.
//!
//! spec §1 excludes persistent configuration loading from the core's
//! scope ("we consume a validated configuration tree"); this module is the
//! thin edge that turns a JSON file on disk into that validated tree
//! (`ess_types::DevicesConfig`) before handing it to the rest of the
//! workspace.

use std::path::Path;

use ess_types::DevicesConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("could not read configuration file at '{path}': {source}")]
    Read { path: String, #[source] source: std::io::Error },
    #[error("could not parse configuration file at '{path}': {source}")]
    Parse { path: String, #[source] source: serde_json::Error },
    #[error("configuration file at '{path}' is invalid: {source}")]
    Invalid { path: String, #[source] source: ess_types::config::ConfigError },
}

/// Loads and validates the `{ "devices": [...] }` configuration tree (§6)
/// from a JSON file on disk.
pub fn load_config(path: impl AsRef<Path>) -> Result<DevicesConfig, ConfigLoadError> {
    let path_str = path.as_ref().display().to_string();
    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigLoadError::Read { path: path_str.clone(), source })?;
    let config: DevicesConfig =
        serde_json::from_str(&contents).map_err(|source| ConfigLoadError::Parse { path: path_str.clone(), source })?;
    config.validate().map_err(|source| ConfigLoadError::Invalid { path: path_str, source })?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn rejects_a_device_with_two_transports() {
        let mut file = tempfile_like();
        writeln!(
            file.1,
            r#"{{ "devices": [ {{ "name": "t1", "sensor_type": "Temperature", "device_type": "Serial", "serial_port": "/dev/ttyUSB0", "host": "1.2.3.4", "location": "roof", "channels": 4 }} ] }}"#
        )
        .unwrap();
        let err = load_config(&file.0).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Parse { .. } | ConfigLoadError::Invalid { .. }));
    }

    #[test]
    fn loads_a_well_formed_config() {
        let mut file = tempfile_like();
        writeln!(
            file.1,
            r#"{{ "devices": [ {{ "name": "t1", "sensor_type": "Temperature", "device_type": "Serial", "serial_port": "/dev/ttyUSB0", "location": "roof", "channels": 4 }} ] }}"#
        )
        .unwrap();
        let config = load_config(&file.0).unwrap();
        assert_eq!(config.devices.len(), 1);
        assert_eq!(config.devices[0].name, "t1");
    }

    fn tempfile_like() -> (std::path::PathBuf, std::fs::File) {
        let path = std::env::temp_dir().join(format!("ess-daemon-config-test-{:?}.json", std::thread::current().id()));
        let file = std::fs::File::create(&path).unwrap();
        (path, file)
    }
}
