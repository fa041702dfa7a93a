use std::fmt;

use crate::config::{ExternalReferenceConfig, PositionConfig, SensorMetadata};

use super::Scope;

/// Compiled, immutable view of one configured sensor within one scope
#[derive(Clone, Debug, PartialEq)]
pub struct SensorDescriptor {
    pub scope: Scope,
    pub unit_id: String,
    pub sensor_type: String,
    pub depth: Option<f64>,
    pub display_name: String,
    /// Measurement name to upstream channel, in declared order
    pub source_mapping: Vec<(String, String)>,
    pub metadata: SensorMetadata,
}

impl SensorDescriptor {
    pub fn node_id(&self) -> String {
        self.scope.sensor_node_id(&self.display_name)
    }

    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.source_mapping.iter().map(|(_, channel)| channel.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnitDescriptor {
    pub id: String,
    pub name: String,
    pub scope: Scope,
    pub position: PositionConfig,
    pub external_references: Vec<ExternalReferenceConfig>,
    pub sensors: Vec<SensorDescriptor>,
}

impl UnitDescriptor {
    pub fn new(scope: Scope) -> Self {
        let id = scope.key_token().to_string();
        UnitDescriptor {
            name: id.clone(),
            id,
            scope,
            position: PositionConfig::default(),
            external_references: Vec::new(),
            sensors: Vec::new(),
        }
    }
}

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Upstream source a worker connects to
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerDescriptor {
    pub unit_id: String,
    pub endpoint: String,
    pub credentials: Credentials,
}
