use std::fmt;

pub const KEY_DELIMITER: char = ':';
pub const SITE_TOKEN: &str = "site";

/// Owner of a sensor, either the site pseudo-unit or a named unit
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    Site,
    Unit(String),
}

impl Scope {
    /// First component of every source key
    pub fn key_token(&self) -> &str {
        match self {
            Scope::Site => SITE_TOKEN,
            Scope::Unit(id) => id,
        }
    }

    /// Node path prefix, `Site|site` or `Unit|<id>`
    pub fn node_path(&self) -> String {
        match self {
            Scope::Site => format!("Site|{SITE_TOKEN}"),
            Scope::Unit(id) => format!("Unit|{id}"),
        }
    }

    pub fn sensor_node_id(&self, sensor_name: &str) -> String {
        format!("{}|Sensor|{}", self.node_path(), sensor_name)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_token())
    }
}

/// `<scope>:<channel>`, the part of a source key known when a value arrives
pub fn channel_fragment(scope: &Scope, channel: &str) -> String {
    format!("{}{KEY_DELIMITER}{}", scope.key_token(), channel)
}

/// Composite `<scope>:<channel>:<sensor>` key
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceKey(String);

impl SourceKey {
    pub fn new(scope: &Scope, channel: &str, sensor_name: &str) -> Self {
        SourceKey(format!(
            "{}{KEY_DELIMITER}{}",
            channel_fragment(scope, channel),
            sensor_name
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn contains(&self, fragment: &str) -> bool {
        self.0.contains(fragment)
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
