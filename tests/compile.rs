use aquabridge::config;
use aquabridge::mapping::{compile, Scope, SourceKey, LOCAL_TIMESTAMP, LOCAL_TIMESTAMP_CHANNEL};

mod stubs;

#[test]
fn test_single_sensor_compiles_to_two_keys() {
    let compiled = compile(&config::from_str(stubs::config::SINGLE_TEMPERATURE).unwrap());
    let unit = Scope::Unit("u1".into());

    let keys: Vec<_> = compiled.mapping.keys().map(|k| k.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "u1:ns1;i=10:Temperature_dynamic_depth",
            "u1:local_timestamp:Temperature_dynamic_depth",
        ]
    );

    let measurement = &compiled
        .mapping
        .get(&SourceKey::new(&unit, "ns1;i=10", "Temperature_dynamic_depth"))
        .unwrap()[0];
    assert_eq!(measurement.measurement_name, "Temperature");
    assert_eq!(measurement.unit_id, "u1");

    let timestamp = &compiled
        .mapping
        .get(&SourceKey::new(&unit, LOCAL_TIMESTAMP_CHANNEL, "Temperature_dynamic_depth"))
        .unwrap()[0];
    assert_eq!(timestamp.measurement_name, LOCAL_TIMESTAMP);
    assert_eq!(timestamp.sensor_name, "Temperature_dynamic_depth");
}

#[test]
fn test_compile_is_idempotent() {
    for payload in [
        stubs::config::SINGLE_TEMPERATURE,
        stubs::config::ENVIRONMENT,
        stubs::config::BRIDGE,
    ] {
        let config = config::from_str(payload).unwrap();
        assert_eq!(compile(&config), compile(&config));
    }
}

#[test]
fn test_one_local_timestamp_per_sensor() {
    let compiled = compile(&config::from_str(stubs::config::ENVIRONMENT).unwrap());
    for sensor in compiled.sensors() {
        let prefix = format!("{}:{LOCAL_TIMESTAMP_CHANNEL}:", sensor.unit_id);
        let synthesized: usize = compiled
            .mapping
            .iter()
            .filter(|(key, _)| key.contains(&prefix))
            .flat_map(|(_, entries)| entries.iter())
            .filter(|e| e.sensor_name == sensor.display_name)
            .count();
        assert_eq!(synthesized, 1, "{}", sensor.display_name);
    }
    let declared: usize = compiled.sensors().map(|s| s.source_mapping.len()).sum();
    assert_eq!(
        compiled.mapping.entry_count(),
        declared + compiled.sensor_count()
    );
}

#[test]
fn test_display_names() {
    let compiled = compile(&config::from_str(stubs::config::ENVIRONMENT).unwrap());
    let names: Vec<_> = compiled
        .sensors()
        .map(|s| s.display_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "Light_0m",
            "OxygenConcentration_5m",
            "Temperature_5m",
            "Temperature_10m",
            "SeaCurrent_dynamic_depth",
        ]
    );
}

#[test]
fn test_bridge_binds_unitless_sensors_to_every_unit() {
    let compiled = compile(&config::from_str(stubs::config::BRIDGE).unwrap());
    assert_eq!(compiled.servers.len(), 2);
    assert_eq!(compiled.servers[1].endpoint, "mqtt://10.0.0.12");

    let cage_1 = compiled.unit("cage-1").unwrap();
    assert_eq!(cage_1.name, "Cage 1");
    assert_eq!(cage_1.sensors.len(), 2);
    let cage_2 = compiled.unit("cage-2").unwrap();
    assert_eq!(cage_2.sensors.len(), 3);

    let hits = compiled.mapping.resolve_exact("cage-2:ns=2;i=1");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].0.as_str(), "cage-2:ns=2;i=1:OxygenSaturation_5m");
}

#[test]
fn test_bad_config_rejected_strictly() {
    assert!(config::from_str(stubs::config::BAD_PAYLOAD).is_err());
}

#[test]
fn test_missing_config_compiles_empty() {
    let tempdir = tempfile::tempdir().unwrap();
    let config = config::load_or_empty(tempdir.path().join("absent.json"));
    let compiled = compile(&config);
    assert!(compiled.units.is_empty());
    assert!(compiled.mapping.is_empty());
}
