//! Structural templates, one per sensor class
//!
//! A template declares the analog items a sensor exposes and the static
//! metadata written next to them. The [`TemplateCatalog`] resolves a
//! `sensor_type` tag to its template; unknown tags have no template and are
//! materialized as bare sensor objects.
use std::collections::HashMap;

use crate::constants::defaults;

mod items;
mod standard;

pub use crate::address_space::{EuInformation, Range};
pub use items::{unece_unit_id, AnalogItemSpec, FeedTypeSpec};
pub use standard::sensor_types;

/// Display name suffix for sensors without a configured depth
pub const DYNAMIC_DEPTH: &str = "dynamic_depth";
/// Type definition used for sensor types the catalog does not know
pub const BASE_SENSOR_TYPE: &str = "BaseSensorType";

pub trait SensorTemplate: Send + Sync {
    /// Type tag matched against `sensor_type` in config
    fn sensor_type(&self) -> &str;

    /// Dynamic children written by the router
    fn analog_items(&self) -> &[AnalogItemSpec];

    fn type_definition(&self) -> String {
        type_definition_id(self.sensor_type())
    }

    fn has_position(&self) -> bool {
        true
    }

    fn has_external_references(&self) -> bool {
        true
    }

    fn feed_type(&self) -> Option<&FeedTypeSpec> {
        None
    }
}

/// Template of the water-quality sensor family
#[derive(Clone, Debug)]
pub struct EnvironmentTemplate {
    sensor_type: &'static str,
    items: Vec<AnalogItemSpec>,
}

impl EnvironmentTemplate {
    pub fn new(sensor_type: &'static str, items: Vec<AnalogItemSpec>) -> Self {
        EnvironmentTemplate { sensor_type, items }
    }
}

impl SensorTemplate for EnvironmentTemplate {
    fn sensor_type(&self) -> &str {
        self.sensor_type
    }

    fn analog_items(&self) -> &[AnalogItemSpec] {
        &self.items
    }
}

/// Template of the feeding sensor family, which also carries a `FeedType`
#[derive(Clone, Debug)]
pub struct FeedingTemplate {
    sensor_type: &'static str,
    items: Vec<AnalogItemSpec>,
    feed_type: FeedTypeSpec,
}

impl FeedingTemplate {
    pub fn new(sensor_type: &'static str, items: Vec<AnalogItemSpec>) -> Self {
        FeedingTemplate {
            sensor_type,
            items,
            feed_type: FeedTypeSpec::standard(),
        }
    }
}

impl SensorTemplate for FeedingTemplate {
    fn sensor_type(&self) -> &str {
        self.sensor_type
    }

    fn analog_items(&self) -> &[AnalogItemSpec] {
        &self.items
    }

    fn feed_type(&self) -> Option<&FeedTypeSpec> {
        Some(&self.feed_type)
    }
}

#[derive(Default)]
pub struct TemplateCatalog {
    templates: HashMap<String, Box<dyn SensorTemplate>, ahash::RandomState>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding every built-in sensor class
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for template in standard::environment_templates() {
            catalog.register(template);
        }
        for template in standard::feeding_templates() {
            catalog.register(template);
        }
        catalog
    }

    /// Registers a template, replacing any previous one for the same tag
    pub fn register(&mut self, template: impl SensorTemplate + 'static) {
        let tag = template.sensor_type().to_string();
        if self.templates.insert(tag.clone(), Box::new(template)).is_some() {
            log::debug!("Replaced template for {tag}");
        }
    }

    pub fn get(&self, sensor_type: &str) -> Option<&dyn SensorTemplate> {
        self.templates.get(sensor_type).map(|t| t.as_ref())
    }

    pub fn contains(&self, sensor_type: &str) -> bool {
        self.templates.contains_key(sensor_type)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

pub fn type_definition_id(name: &str) -> String {
    format!("{}|{}", defaults::TYPE_DEFINITION_PREFIX, name)
}

/// Display name prefix of a sensor type: `TemperatureSensorType` -> `Temperature`
pub fn name_prefix(sensor_type: &str) -> &str {
    sensor_type
        .strip_suffix("SensorType")
        .or_else(|| sensor_type.strip_suffix("Type"))
        .filter(|prefix| !prefix.is_empty())
        .unwrap_or(sensor_type)
}

pub fn depth_tag(depth: Option<f64>) -> String {
    match depth {
        Some(depth) => format!("{}m", depth.trunc() as i64),
        None => DYNAMIC_DEPTH.to_string(),
    }
}

/// Canonical sensor name, `<prefix>_<depth>m` or `<prefix>_dynamic_depth`
pub fn display_name(sensor_type: &str, depth: Option<f64>) -> String {
    format!("{}_{}", name_prefix(sensor_type), depth_tag(depth))
}
