#![allow(dead_code)]
// Each integration test binary pulls in only some of these payloads

pub const SINGLE_TEMPERATURE: &str = r#"
{
    "sensors": [
        {
            "unit_id": "u1",
            "sensor_type": "TemperatureSensorType",
            "mapping": {"Temperature": "ns1;i=10"}
        }
    ]
}
"#;

pub const ENVIRONMENT: &str = r#"
{
    "sensors": [
        {
            "type": "site",
            "sensor_type": "LightSensorType",
            "depth": 0,
            "mapping": {"Lux": "site_001_lux"}
        },
        {
            "unit_id": "m1",
            "sensor_type": "OxygenConcentrationSensorType",
            "depth": 5,
            "serial_number": "OC-2231",
            "manufacturer": "Aanderaa",
            "position": {"latitude": 63.44, "longitude": 10.39, "effective_range": 2.5},
            "mapping": {
                "OxygenConcentration": "m1_o2",
                "Salinity": "m1_sal"
            }
        },
        {
            "unit_id": "m1",
            "sensor_type": "TemperatureSensorType",
            "depth": 5,
            "mapping": {"Temperature": "m1_temp_5"}
        },
        {
            "unit_id": "m1",
            "sensor_type": "TemperatureSensorType",
            "depth": 10,
            "mapping": {"Temperature": "m1_temp_10"}
        },
        {
            "unit_id": "m1",
            "sensor_type": "SeaCurrentSensorType",
            "mapping": {"Direction": "m1_cur", "Speed": "m1_cur", "Depth": "m1_cur_depth"}
        }
    ]
}
"#;

pub const BRIDGE: &str = r#"
{
    "units": [
        {
            "unit_id": "cage-1",
            "name": "Cage 1",
            "server": {"endpoint": "mqtt://10.0.0.11:1883", "username": "bridge", "password": "hunter2"}
        },
        {
            "unit_id": "cage-2",
            "server": {"endpoint": "mqtt://10.0.0.12"}
        }
    ],
    "sensors": [
        {
            "sensor_type": "OxygenSaturationSensorType",
            "depth": 5,
            "mapping": {"OxygenSaturation": {"ns": 2, "i": 1}}
        },
        {
            "sensor_type": "TemperatureSensorType",
            "depth": 5,
            "mapping": {"Temperature": {"ns": 2, "i": 2}}
        },
        {
            "unit_id": "cage-2",
            "sensor_type": "FeedingIntensitySensorType",
            "mapping": {"FeedingIntensity": "ns=2;i=3"}
        }
    ]
}
"#;

pub const SHARED_CHANNEL: &str = r#"
{
    "sensors": [
        {"unit_id": "u1", "sensor_type": "TemperatureSensorType", "depth": 5, "mapping": {"Temperature": "t"}},
        {"unit_id": "u1", "sensor_type": "TemperatureSensorType", "depth": 10, "mapping": {"Temperature": "t"}}
    ]
}
"#;

pub const BAD_PAYLOAD: &str = r#"{"sensors": [{"unit_id": "u1"}]}"#;
