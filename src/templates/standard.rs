use crate::address_space::EuInformation;

use super::{AnalogItemSpec, EnvironmentTemplate, FeedingTemplate};

pub mod sensor_types {
    pub const OXYGEN_SATURATION: &str = "OxygenSaturationSensorType";
    pub const OXYGEN_CONCENTRATION: &str = "OxygenConcentrationSensorType";
    pub const TEMPERATURE: &str = "TemperatureSensorType";
    pub const SALINITY: &str = "SalinitySensorType";
    pub const SEA_CURRENT: &str = "SeaCurrentSensorType";
    pub const NTU: &str = "NTUSensorType";
    pub const FTU: &str = "FTUSensorType";
    pub const PH: &str = "PHSensorType";
    pub const LIGHT: &str = "LightSensorType";
    pub const CO2: &str = "CO2SensorType";
    pub const FEEDING_INTENSITY: &str = "FeedingIntensitySensorType";
    pub const FEED_SILO: &str = "FeedSiloSensorType";
    pub const CALCULATED_ACCUMULATED_FEEDING: &str = "CalculatedAccumulatedFeedingSensorType";
}

fn salinity() -> AnalogItemSpec {
    AnalogItemSpec::new(
        "Salinity",
        EuInformation::unitless("ppt", "Parts per thousand"),
    )
    .with_eu_range(0.0, 45.0)
}

fn kilograms(name: &'static str) -> AnalogItemSpec {
    AnalogItemSpec::new(name, EuInformation::cefact("KGM", "kg", "Kilogram"))
}

pub(super) fn environment_templates() -> Vec<EnvironmentTemplate> {
    use self::sensor_types::*;

    vec![
        EnvironmentTemplate::new(
            OXYGEN_SATURATION,
            vec![AnalogItemSpec::new(
                "OxygenSaturation",
                EuInformation::cefact("P1", "%", "Percentage"),
            )
            .with_eu_range(0.0, 200.0)],
        ),
        EnvironmentTemplate::new(
            OXYGEN_CONCENTRATION,
            vec![
                AnalogItemSpec::new(
                    "OxygenConcentration",
                    EuInformation::cefact("M1", "mg/l", "Milligram per liter"),
                ),
                salinity(),
            ],
        ),
        EnvironmentTemplate::new(
            TEMPERATURE,
            vec![AnalogItemSpec::new(
                "Temperature",
                EuInformation::cefact("CEL", "C°", "Celsius"),
            )
            .with_eu_range(-5.0, 40.0)
            .with_instrument_range(-5.0, 50.0)],
        ),
        EnvironmentTemplate::new(SALINITY, vec![salinity()]),
        EnvironmentTemplate::new(
            SEA_CURRENT,
            vec![
                AnalogItemSpec::new(
                    "Direction",
                    EuInformation::cefact("DD", "Absolute North", "Absolute direction in degrees"),
                )
                .with_eu_range(0.0, 360.0),
                AnalogItemSpec::new(
                    "Speed",
                    EuInformation::cefact("2M", "cm/s", "Centimeter per second"),
                ),
            ],
        ),
        EnvironmentTemplate::new(
            NTU,
            vec![AnalogItemSpec::new(
                "NTU",
                EuInformation::unitless("NTU", "Nephelometric Turbidity Units"),
            )],
        ),
        EnvironmentTemplate::new(
            FTU,
            vec![AnalogItemSpec::new(
                "FTU",
                EuInformation::unitless("FTU", "Formazin Turbidity Units"),
            )],
        ),
        EnvironmentTemplate::new(
            PH,
            vec![AnalogItemSpec::new("pH", EuInformation::unitless("pH", "pH"))
                .with_eu_range(0.0, 14.0)
                .with_instrument_range(0.0, 14.0)],
        ),
        EnvironmentTemplate::new(
            LIGHT,
            vec![AnalogItemSpec::new(
                "Lux",
                EuInformation::cefact("LUX", "lux", "Lumen per square meter"),
            )],
        ),
        EnvironmentTemplate::new(
            CO2,
            vec![AnalogItemSpec::new(
                "CO2",
                EuInformation::cefact("59", "ppm", "Parts per million"),
            )],
        ),
    ]
}

pub(super) fn feeding_templates() -> Vec<FeedingTemplate> {
    use self::sensor_types::*;

    vec![
        FeedingTemplate::new(
            FEEDING_INTENSITY,
            vec![AnalogItemSpec::new(
                "FeedingIntensity",
                EuInformation::unitless("g/s", "Gram per second"),
            )],
        ),
        FeedingTemplate::new(
            FEED_SILO,
            vec![
                kilograms("Feed"),
                kilograms("SiloCapacity"),
                AnalogItemSpec::new(
                    "FillPercentage",
                    EuInformation::cefact("P1", "%", "Percentage"),
                )
                .with_eu_range(0.0, 100.0),
            ],
        ),
        FeedingTemplate::new(
            CALCULATED_ACCUMULATED_FEEDING,
            vec![AnalogItemSpec::new(
                "FedAmount",
                EuInformation::unitless("", ""),
            )],
        ),
    ]
}
