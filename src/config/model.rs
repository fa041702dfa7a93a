use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

/// Top-level sensor configuration file, shared by every driver variant
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct SensorConfig {
    pub sensors: Vec<SensorEntry>,
    #[serde(default)]
    pub units: Vec<UnitEntry>,
    #[serde(default)]
    pub key_match: KeyMatch,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SensorEntry {
    #[serde(default)]
    pub unit_id: Option<String>,
    #[serde(rename = "type", default)]
    pub scope: ScopeKind,
    pub sensor_type: String,
    #[serde(default)]
    pub depth: Option<f64>,
    /// Overrides the derived display name
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub mapping: MeasurementMap,
    #[serde(flatten)]
    pub metadata: SensorMetadata,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    #[default]
    Unit,
    Site,
}

/// Measurement name to upstream channel, in the order the config declares them
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeasurementMap(Vec<(String, ChannelRef)>);

impl MeasurementMap {
    pub fn get(&self, measurement: &str) -> Option<&ChannelRef> {
        self.0
            .iter()
            .find(|(name, _)| name == measurement)
            .map(|(_, channel)| channel)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChannelRef)> {
        self.0.iter().map(|(name, channel)| (name.as_str(), channel))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, ChannelRef)> for MeasurementMap {
    fn from_iter<T: IntoIterator<Item = (String, ChannelRef)>>(iter: T) -> Self {
        MeasurementMap(iter.into_iter().collect())
    }
}

struct MeasurementMapVisitor;

impl<'de> Visitor<'de> for MeasurementMapVisitor {
    type Value = MeasurementMap;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of measurement names to channels")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut entries: Vec<(String, ChannelRef)> =
            Vec::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((measurement, channel)) = access.next_entry::<String, ChannelRef>()? {
            // A repeated name replaces the earlier channel but keeps its position
            match entries.iter().position(|(name, _)| *name == measurement) {
                Some(index) => entries[index].1 = channel,
                None => entries.push((measurement, channel)),
            }
        }
        Ok(MeasurementMap(entries))
    }
}

impl<'de> Deserialize<'de> for MeasurementMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(MeasurementMapVisitor)
    }
}

/// Upstream channel identifier as written in config
///
/// Either a plain key (`"ns=2;i=10"`, `"site_001_temperature"`) or a structured
/// numeric node reference, which is canonicalised to `ns=<ns>;i=<i>`.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ChannelRef {
    Key(String),
    Node { ns: u16, i: u32 },
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelRef::Key(key) => f.write_str(key),
            ChannelRef::Node { ns, i } => write!(f, "ns={ns};i={i}"),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SensorMetadata {
    pub serial_number: String,
    pub manufacturer: String,
    pub model: String,
    pub product_code: String,
    pub position: PositionConfig,
    pub external_references: Vec<ExternalReferenceConfig>,
    pub feed_type: FeedTypeConfig,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PositionConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub effective_range: f64,
    pub external_references: Vec<ExternalReferenceConfig>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ExternalReferenceConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub reference: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedTypeConfig {
    pub manufacturer: String,
    pub product_code: String,
    pub purchase_number: String,
    pub external_references: Vec<ExternalReferenceConfig>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UnitEntry {
    pub unit_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub server: Option<ServerEntry>,
    #[serde(default)]
    pub position: PositionConfig,
    #[serde(default)]
    pub external_references: Vec<ExternalReferenceConfig>,
}

#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct ServerEntry {
    pub endpoint: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl fmt::Debug for ServerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerEntry")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// How the router resolves a notification's `<scope>:<channel>` fragment
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum KeyMatch {
    /// First source key (in registration order) containing the fragment; the
    /// scan stops there, so one key is served per notification
    #[default]
    Substring,
    /// Exact lookup, applying every source key registered for the fragment
    Exact,
}
