//! Builds the node tree for compiled units and sensors
//!
//! Creation failures never abort the run: the failed node is logged, recorded
//! in the [`MaterializeReport`] and every node that would hang below it is
//! skipped, while its siblings are still created.
use thiserror::Error;

use crate::address_space::{AddressSpace, AddressSpaceError, NodeHandle, Value};
use crate::config::{ExternalReferenceConfig, FeedTypeConfig, PositionConfig, SensorMetadata};
use crate::mapping::{Scope, SensorDescriptor, UnitDescriptor, LOCAL_TIMESTAMP};
use crate::templates::{
    self, AnalogItemSpec, FeedTypeSpec, SensorTemplate, TemplateCatalog, BASE_SENSOR_TYPE,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MaterializeError {
    #[error("could not create node '{identifier}': {source}")]
    Create {
        identifier: String,
        #[source]
        source: AddressSpaceError,
    },
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct MaterializeReport {
    pub units: usize,
    pub sensors: usize,
    /// Sensors whose type has no template
    pub untyped_sensors: usize,
    pub nodes_created: usize,
    pub failures: Vec<MaterializeError>,
}

impl MaterializeReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Materializer<'a> {
    space: &'a dyn AddressSpace,
    catalog: &'a TemplateCatalog,
    report: MaterializeReport,
}

impl<'a> Materializer<'a> {
    pub fn new(space: &'a dyn AddressSpace, catalog: &'a TemplateCatalog) -> Self {
        Materializer {
            space,
            catalog,
            report: MaterializeReport::default(),
        }
    }

    /// Creates every unit below the objects root
    pub fn materialize_all(mut self, units: &[UnitDescriptor]) -> MaterializeReport {
        let root = self.space.objects_root();
        for unit in units {
            self.materialize_unit(unit, &root);
        }
        log::info!(
            "Materialized {} unit(s) and {} sensor(s), {} node(s) created, {} failure(s)",
            self.report.units,
            self.report.sensors,
            self.report.nodes_created,
            self.report.failures.len()
        );
        self.report
    }

    pub fn materialize_unit(
        &mut self,
        unit: &UnitDescriptor,
        parent: &NodeHandle,
    ) -> Option<NodeHandle> {
        let type_definition = match unit.scope {
            Scope::Site => templates::type_definition_id("SiteType"),
            Scope::Unit(_) => templates::type_definition_id("UnitType"),
        };
        let path = unit.scope.node_path();
        let node = self.create_object(parent, &path, &unit.name, Some(&type_definition))?;
        self.report.units += 1;

        self.create_variable(&node, "Name", Value::String(unit.name.clone()));
        self.write_external_references(&path, &node, &unit.external_references);
        self.write_position(&path, &node, &unit.position, None);

        let container_id = node.child_id("Sensors");
        if let Some(container) = self.create_object(&node, &container_id, "Sensors", None) {
            for sensor in &unit.sensors {
                self.materialize(&unit.scope, sensor, &container);
            }
        }
        Some(node)
    }

    /// Creates the sensor object and, when the type has a template, its
    /// typed children and static metadata
    pub fn materialize(
        &mut self,
        scope: &Scope,
        sensor: &SensorDescriptor,
        container: &NodeHandle,
    ) -> Option<NodeHandle> {
        let catalog = self.catalog;
        let template = catalog.get(&sensor.sensor_type);
        let type_definition = template
            .map(|t| t.type_definition())
            .unwrap_or_else(|| templates::type_definition_id(BASE_SENSOR_TYPE));
        let identifier = scope.sensor_node_id(&sensor.display_name);
        let node = self.create_object(
            container,
            &identifier,
            &sensor.display_name,
            Some(&type_definition),
        )?;
        self.report.sensors += 1;

        let Some(template) = template else {
            log::warn!(
                "No template for sensor type {}, {} has no measurements",
                sensor.sensor_type,
                sensor.display_name
            );
            self.report.untyped_sensors += 1;
            return Some(node);
        };

        self.write_identification(&node, &sensor.metadata);
        self.create_variable(&node, LOCAL_TIMESTAMP, Value::Empty);
        for item in template.analog_items() {
            self.write_analog_item(&node, item);
        }
        self.write_template_structures(template, &identifier, &node, sensor);
        Some(node)
    }

    fn write_template_structures(
        &mut self,
        template: &dyn SensorTemplate,
        identifier: &str,
        node: &NodeHandle,
        sensor: &SensorDescriptor,
    ) {
        let metadata: &SensorMetadata = &sensor.metadata;
        if template.has_external_references() {
            self.write_external_references(identifier, node, &metadata.external_references);
        }
        if template.has_position() {
            self.write_position(identifier, node, &metadata.position, sensor.depth);
        }
        if let Some(feed_template) = template.feed_type() {
            self.write_feed_type(node, feed_template, &metadata.feed_type);
        }
    }

    fn write_identification(&mut self, node: &NodeHandle, metadata: &SensorMetadata) {
        self.create_variable(node, "SerialNumber", Value::String(metadata.serial_number.clone()));
        self.create_variable(
            node,
            "Manufacturer",
            Value::LocalizedText(metadata.manufacturer.clone()),
        );
        self.create_variable(node, "Model", Value::LocalizedText(metadata.model.clone()));
        self.create_variable(node, "ProductCode", Value::String(metadata.product_code.clone()));
    }

    fn write_analog_item(&mut self, parent: &NodeHandle, item: &AnalogItemSpec) {
        let Some(node) = self.create_variable(parent, item.name, Value::Empty) else {
            return;
        };
        self.create_variable(
            &node,
            "EngineeringUnits",
            Value::EngineeringUnits(item.engineering_units.clone()),
        );
        self.create_variable(&node, "EURange", item.eu_range.map_or(Value::Empty, Value::Range));
        self.create_variable(
            &node,
            "InstrumentRange",
            item.instrument_range.map_or(Value::Empty, Value::Range),
        );
    }

    /// `owner_path` prefixes each reference identifier
    fn write_external_references(
        &mut self,
        owner_path: &str,
        owner: &NodeHandle,
        references: &[ExternalReferenceConfig],
    ) {
        let container_id = owner.child_id("ExternalReferences");
        let Some(container) = self.create_object(owner, &container_id, "ExternalReferences", None)
        else {
            return;
        };
        for reference in references {
            let identifier = format!(
                "{owner_path}|ExternalReference|{}|{}",
                reference.kind, reference.reference
            );
            let browse_name = format!("{}({})", reference.kind, reference.reference);
            let type_definition = templates::type_definition_id("ExternalReferenceType");
            if let Some(node) =
                self.create_object(&container, &identifier, &browse_name, Some(&type_definition))
            {
                self.create_variable(&node, "Type", Value::String(reference.kind.clone()));
                self.create_variable(
                    &node,
                    "Reference",
                    Value::String(reference.reference.clone()),
                );
            }
        }
    }

    fn write_position(
        &mut self,
        owner_path: &str,
        owner: &NodeHandle,
        position: &PositionConfig,
        depth: Option<f64>,
    ) {
        let type_definition = templates::type_definition_id("PositionType");
        let identifier = owner.child_id("Position");
        let Some(node) = self.create_object(owner, &identifier, "Position", Some(&type_definition))
        else {
            return;
        };
        self.create_variable(&node, "Latitude", Value::Float(position.latitude));
        self.create_variable(&node, "Longitude", Value::Float(position.longitude));
        self.create_variable(&node, "Depth", depth.map_or(Value::Empty, Value::Float));
        self.create_variable(&node, "EffectiveRange", Value::Float(position.effective_range));
        self.write_external_references(
            &format!("{owner_path}.Position"),
            &node,
            &position.external_references,
        );
    }

    fn write_feed_type(
        &mut self,
        owner: &NodeHandle,
        feed_template: &FeedTypeSpec,
        feed: &FeedTypeConfig,
    ) {
        let type_definition = templates::type_definition_id("FeedType");
        let identifier = owner.child_id("FeedType");
        let Some(node) = self.create_object(owner, &identifier, "FeedType", Some(&type_definition))
        else {
            return;
        };
        self.create_variable(&node, "Manufacturer", Value::String(feed.manufacturer.clone()));
        self.create_variable(&node, "ProductCode", Value::String(feed.product_code.clone()));
        self.create_variable(&node, "PurchaseNumber", Value::String(feed.purchase_number.clone()));
        for item in &feed_template.items {
            self.write_analog_item(&node, item);
        }
        self.write_external_references(identifier.as_str(), &node, &feed.external_references);
    }

    fn create_object(
        &mut self,
        parent: &NodeHandle,
        identifier: &str,
        browse_name: &str,
        type_definition: Option<&str>,
    ) -> Option<NodeHandle> {
        let res = self
            .space
            .create_object(parent, identifier, browse_name, type_definition);
        self.record(identifier, res)
    }

    /// Variables are identified as `<parent>.<browse_name>`
    fn create_variable(
        &mut self,
        parent: &NodeHandle,
        browse_name: &str,
        initial: Value,
    ) -> Option<NodeHandle> {
        let identifier = parent.child_id(browse_name);
        let res = self
            .space
            .create_variable(parent, &identifier, browse_name, initial);
        self.record(&identifier, res)
    }

    fn record(
        &mut self,
        identifier: &str,
        res: Result<NodeHandle, AddressSpaceError>,
    ) -> Option<NodeHandle> {
        match res {
            Ok(node) => {
                self.report.nodes_created += 1;
                Some(node)
            }
            Err(source) => {
                log::warn!("Could not create node {identifier}: {source}");
                self.report.failures.push(MaterializeError::Create {
                    identifier: identifier.to_string(),
                    source,
                });
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address_space::{EuInformation, MemoryAddressSpace, Range};
    use crate::config;
    use crate::mapping::compile;
    use crate::templates::sensor_types;

    fn materialized(config_raw: &str) -> (MemoryAddressSpace, MaterializeReport) {
        let compiled = compile(&config::from_str(config_raw).unwrap());
        let space = MemoryAddressSpace::new("urn:test");
        let catalog = TemplateCatalog::standard();
        let report = Materializer::new(&space, &catalog).materialize_all(&compiled.units);
        (space, report)
    }

    #[test]
    fn test_temperature_subtree() {
        let (space, report) = materialized(
            r#"{"sensors": [{"unit_id": "u1", "sensor_type": "TemperatureSensorType", "depth": 5,
                "serial_number": "SN-1", "mapping": {"Temperature": "ch"}}]}"#,
        );
        assert!(report.is_complete());
        assert_eq!((report.units, report.sensors), (1, 1));

        let sensor = space.get_node("Unit|u1|Sensor|Temperature_5m").unwrap();
        assert_eq!(
            space.type_definition(&sensor).as_deref(),
            Some("AquaCloud|TemperatureSensorType")
        );
        let container = space.get_parent(&sensor).unwrap();
        assert_eq!(container.identifier(), "Unit|u1.Sensors");

        let units = space
            .get_node("Unit|u1|Sensor|Temperature_5m.Temperature.EngineeringUnits")
            .unwrap();
        assert_eq!(
            space.read_value(&units),
            Some(Value::EngineeringUnits(EuInformation::cefact(
                "CEL", "C°", "Celsius"
            )))
        );
        let range = space
            .get_node("Unit|u1|Sensor|Temperature_5m.Temperature.InstrumentRange")
            .unwrap();
        assert_eq!(
            space.read_value(&range),
            Some(Value::Range(Range::new(-5.0, 50.0)))
        );
        let depth = space.get_node("Unit|u1|Sensor|Temperature_5m.Position.Depth").unwrap();
        assert_eq!(space.read_value(&depth), Some(Value::Float(5.0)));
        let serial = space.get_child(&sensor, "SerialNumber").unwrap();
        assert_eq!(space.read_value(&serial), Some(Value::String("SN-1".into())));
        let timestamp = space.get_child(&sensor, LOCAL_TIMESTAMP).unwrap();
        assert_eq!(space.read_value(&timestamp), Some(Value::Empty));
    }

    #[test]
    fn test_unknown_type_is_bare() {
        let (space, report) = materialized(
            r#"{"sensors": [{"unit_id": "u1", "sensor_type": "SonarSensorType", "mapping": {"Echo": "ch"}}]}"#,
        );
        assert!(report.is_complete());
        assert_eq!(report.untyped_sensors, 1);
        let sensor = space.get_node("Unit|u1|Sensor|Sonar_dynamic_depth").unwrap();
        assert!(space.children(&sensor).is_empty());
        assert_eq!(
            space.type_definition(&sensor).as_deref(),
            Some("AquaCloud|BaseSensorType")
        );
    }

    #[test]
    fn test_external_references_and_feed_type() {
        let (space, report) = materialized(
            r#"{"sensors": [{"unit_id": "u1", "sensor_type": "FeedSiloSensorType", "depth": 0,
                "external_references": [{"type": "Vendor", "reference": "silo-9"}],
                "feed_type": {"manufacturer": "Skretting", "purchase_number": "PO-1"},
                "mapping": {"Feed": "silo_feed"}}]}"#,
        );
        assert!(report.is_complete());
        let reference = space
            .get_node("Unit|u1|Sensor|FeedSilo_0m|ExternalReference|Vendor|silo-9")
            .unwrap();
        let kind = space.get_child(&reference, "Type").unwrap();
        assert_eq!(space.read_value(&kind), Some(Value::String("Vendor".into())));
        let parent = space.get_parent(&reference).unwrap();
        assert_eq!(parent.identifier(), "Unit|u1|Sensor|FeedSilo_0m.ExternalReferences");

        let feed_type = space.get_node("Unit|u1|Sensor|FeedSilo_0m.FeedType").unwrap();
        let manufacturer = space.get_child(&feed_type, "Manufacturer").unwrap();
        assert_eq!(
            space.read_value(&manufacturer),
            Some(Value::String("Skretting".into()))
        );
        assert!(space
            .get_node("Unit|u1|Sensor|FeedSilo_0m.FeedType.PelletSize.EngineeringUnits")
            .is_some());
    }

    #[test]
    fn test_failed_node_skips_dependents_only() {
        let space = MemoryAddressSpace::new("urn:test");
        let catalog = TemplateCatalog::standard();
        let compiled = compile(
            &config::from_str(
                r#"{"sensors": [
                    {"unit_id": "u1", "sensor_type": "PHSensorType", "mapping": {"pH": "a"}},
                    {"unit_id": "u1", "sensor_type": "PHSensorType", "mapping": {"pH": "b"}},
                    {"unit_id": "u1", "sensor_type": "LightSensorType", "mapping": {"Lux": "c"}}
                ]}"#,
            )
            .unwrap(),
        );
        let report = Materializer::new(&space, &catalog).materialize_all(&compiled.units);

        // The second PH sensor collides with the first
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            &report.failures[0],
            MaterializeError::Create { identifier, source: AddressSpaceError::DuplicateNode(_) }
                if identifier == "Unit|u1|Sensor|PH_dynamic_depth"
        ));
        assert_eq!(report.sensors, 2);
        assert!(space.get_node("Unit|u1|Sensor|Light_dynamic_depth.Lux").is_some());
        assert!(catalog.contains(sensor_types::LIGHT));
    }
}
