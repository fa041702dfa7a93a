use std::collections::HashMap;

use crate::config::{KeyMatch, ScopeKind, SensorConfig, SensorEntry, UnitEntry};
use crate::templates;

use super::{
    Credentials, MappingEntry, MappingTable, Scope, SensorDescriptor, ServerDescriptor,
    UnitDescriptor, LOCAL_TIMESTAMP, LOCAL_TIMESTAMP_CHANNEL,
};

/// Output of [`compile`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CompiledConfig {
    /// Configured units first, then units and the site in order of appearance
    pub units: Vec<UnitDescriptor>,
    pub mapping: MappingTable,
    pub servers: Vec<ServerDescriptor>,
    pub key_match: KeyMatch,
}

impl CompiledConfig {
    pub fn unit(&self, id: &str) -> Option<&UnitDescriptor> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn sensors(&self) -> impl Iterator<Item = &SensorDescriptor> {
        self.units.iter().flat_map(|u| u.sensors.iter())
    }

    pub fn sensor_count(&self) -> usize {
        self.units.iter().map(|u| u.sensors.len()).sum()
    }
}

#[derive(Default)]
struct UnitIndex {
    units: Vec<UnitDescriptor>,
    positions: HashMap<Scope, usize, ahash::RandomState>,
}

impl UnitIndex {
    fn get_or_insert(&mut self, scope: &Scope) -> &mut UnitDescriptor {
        let existing = self.positions.get(scope).copied();
        let index = match existing {
            Some(index) => index,
            None => {
                self.units.push(UnitDescriptor::new(scope.clone()));
                self.positions.insert(scope.clone(), self.units.len() - 1);
                self.units.len() - 1
            }
        };
        &mut self.units[index]
    }

    fn declare(&mut self, entry: &UnitEntry) {
        let unit = self.get_or_insert(&Scope::Unit(entry.unit_id.clone()));
        if let Some(name) = &entry.name {
            unit.name = name.clone();
        }
        unit.position = entry.position.clone();
        unit.external_references = entry.external_references.clone();
    }
}

/// Builds unit descriptors, the mapping table and the server list
///
/// Pure and deterministic: identical input yields identical output.
pub fn compile(config: &SensorConfig) -> CompiledConfig {
    let mut units = UnitIndex::default();
    let mut servers = Vec::new();
    let mut mapping = MappingTable::new();

    for entry in &config.units {
        units.declare(entry);
        if let Some(server) = &entry.server {
            servers.push(ServerDescriptor {
                unit_id: entry.unit_id.clone(),
                endpoint: server.endpoint.clone(),
                credentials: Credentials {
                    username: server.username.clone(),
                    password: server.password.clone(),
                },
            });
        }
    }

    for sensor in &config.sensors {
        for scope in sensor_scopes(sensor, &config.units) {
            let descriptor = describe(sensor, &scope);
            register(&mut mapping, &descriptor);
            units.get_or_insert(&scope).sensors.push(descriptor);
        }
    }

    log::debug!(
        "Compiled {} unit(s), {} source key(s), {} server(s)",
        units.units.len(),
        mapping.len(),
        servers.len()
    );

    CompiledConfig {
        units: units.units,
        mapping,
        servers,
        key_match: config.key_match,
    }
}

/// Site sensors stay on the site; unit-less sensors go to every configured
/// unit, or to the site when there are none
fn sensor_scopes(sensor: &SensorEntry, units: &[UnitEntry]) -> Vec<Scope> {
    if sensor.scope == ScopeKind::Site {
        return vec![Scope::Site];
    }
    match sensor.unit_id.as_deref().filter(|id| !id.is_empty()) {
        Some(unit_id) => vec![Scope::Unit(unit_id.to_string())],
        None if units.is_empty() => vec![Scope::Site],
        None => units
            .iter()
            .map(|u| Scope::Unit(u.unit_id.clone()))
            .collect(),
    }
}

fn describe(sensor: &SensorEntry, scope: &Scope) -> SensorDescriptor {
    let display_name = sensor
        .name
        .clone()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| templates::display_name(&sensor.sensor_type, sensor.depth));
    SensorDescriptor {
        scope: scope.clone(),
        unit_id: scope.key_token().to_string(),
        sensor_type: sensor.sensor_type.clone(),
        depth: sensor.depth,
        display_name,
        source_mapping: sensor
            .mapping
            .iter()
            .map(|(measurement, channel)| (measurement.to_string(), channel.to_string()))
            .collect(),
        metadata: sensor.metadata.clone(),
    }
}

fn register(mapping: &mut MappingTable, sensor: &SensorDescriptor) {
    let entry = |measurement: &str| MappingEntry {
        scope: sensor.scope.clone(),
        unit_id: sensor.unit_id.clone(),
        sensor_name: sensor.display_name.clone(),
        measurement_name: measurement.to_string(),
    };
    for (measurement, channel) in &sensor.source_mapping {
        mapping.insert(channel, entry(measurement));
    }
    mapping.insert(LOCAL_TIMESTAMP_CHANNEL, entry(LOCAL_TIMESTAMP));
}
