//! Sensor/unit configuration as read from the driver's JSON file
//!
//! Loading comes in two flavours: [`load`] reports every failure, while
//! [`load_or_empty`] logs it and yields an empty configuration so that a driver
//! can still start with zero sensors.
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

mod model;

pub use model::{
    ChannelRef, ExternalReferenceConfig, FeedTypeConfig, KeyMatch, MeasurementMap, PositionConfig,
    ScopeKind, SensorConfig, SensorEntry, SensorMetadata, ServerEntry, UnitEntry,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),
}

pub fn from_str(config_raw: &str) -> Result<SensorConfig, ConfigError> {
    serde_json::from_str::<SensorConfig>(config_raw).map_err(Into::into)
}

pub fn load(path: impl AsRef<Path>) -> Result<SensorConfig, ConfigError> {
    let path = path.as_ref();
    let config_raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    from_str(&config_raw)
}

pub fn load_or_empty(path: impl AsRef<Path>) -> SensorConfig {
    match load(path.as_ref()) {
        Ok(config) => {
            log::info!(
                "Loaded {} sensor(s) and {} unit(s) from {}",
                config.sensors.len(),
                config.units.len(),
                path.as_ref().display()
            );
            config
        }
        Err(e) => {
            log::warn!("Continuing without sensors: {e}");
            SensorConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const BRIDGE_CONFIG: &str = r#"
    {
        "sensors": [
            {
                "sensor_type": "OxygenSaturationSensorType",
                "depth": 5,
                "mapping": {"OxygenSaturation": {"ns": 2, "i": 1012}, "Depth": "ns=2;i=1013"},
                "serial_number": "OX-1"
            }
        ],
        "units": [
            {"unit_id": "cage_1", "server": {"endpoint": "mqtt://10.0.0.4", "username": "op", "password": "secret"}}
        ],
        "key_match": "exact"
    }
    "#;

    #[test]
    fn test_parse_bridge_config() {
        let config = from_str(BRIDGE_CONFIG).unwrap();
        let sensor = &config.sensors[0];
        assert_eq!(sensor.unit_id, None);
        assert_eq!(sensor.scope, ScopeKind::Unit);
        assert_eq!(sensor.depth, Some(5.0));
        assert_eq!(
            sensor.mapping.get("OxygenSaturation"),
            Some(&ChannelRef::Node { ns: 2, i: 1012 })
        );
        assert_eq!(sensor.mapping.get("Depth").unwrap().to_string(), "ns=2;i=1013");
        assert_eq!(sensor.metadata.serial_number, "OX-1");
        assert_eq!(sensor.metadata.manufacturer, "");

        let server = config.units[0].server.as_ref().unwrap();
        assert_eq!(server.endpoint, "mqtt://10.0.0.4");
        assert_eq!(config.key_match, KeyMatch::Exact);
    }

    #[test]
    fn test_parse_site_sensor() {
        let config = from_str(
            r#"{"sensors": [{"unit_id": "", "type": "site", "sensor_type": "LightSensorType", "mapping": {}}]}"#,
        )
        .unwrap();
        assert_eq!(config.sensors[0].scope, ScopeKind::Site);
        assert!(config.units.is_empty());
        assert_eq!(config.key_match, KeyMatch::Substring);
    }

    #[test]
    fn test_mapping_keeps_declared_order() {
        let config = from_str(
            r#"{"sensors": [{"unit_id": "u1", "sensor_type": "SeaCurrentSensorType",
                "mapping": {"Speed": "c", "Direction": "c", "Depth": "d"}}]}"#,
        )
        .unwrap();
        let names: Vec<_> = config.sensors[0].mapping.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["Speed", "Direction", "Depth"]);
    }

    #[test]
    fn test_repeated_measurement_keeps_first_position() {
        let config = from_str(
            r#"{"sensors": [{"unit_id": "u1", "sensor_type": "PHSensorType",
                "mapping": {"PH": "a", "Depth": "d", "PH": "b"}}]}"#,
        )
        .unwrap();
        let mapping = &config.sensors[0].mapping;
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.get("PH"), Some(&ChannelRef::Key("b".into())));
        assert_eq!(mapping.iter().next().map(|(name, _)| name), Some("PH"));
    }

    #[test]
    fn test_password_not_in_debug_output() {
        let config = from_str(BRIDGE_CONFIG).unwrap();
        let debug = format!("{:?}", config.units[0].server);
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_parse_bad_config() {
        assert!(matches!(from_str("blah"), Err(ConfigError::ParseJson(_))));
        assert!(from_str(r#"{"units": []}"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(BRIDGE_CONFIG.as_bytes()).unwrap();
        assert_eq!(load(file.path()).unwrap().sensors.len(), 1);
    }

    #[test]
    fn test_missing_file_yields_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert!(matches!(load(&path), Err(ConfigError::Read { .. })));
        assert_eq!(load_or_empty(&path), SensorConfig::default());
    }
}
