use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{AddressSpace, AddressSpaceError, NodeClass, NodeHandle, Value};

const OBJECTS_ROOT: &str = "Objects";

#[derive(Debug)]
struct NodeRecord {
    browse_name: String,
    class: NodeClass,
    type_definition: Option<String>,
    value: Value,
    parent: Option<NodeHandle>,
    children: Vec<NodeHandle>,
}

/// Thread-safe in-memory node tree
///
/// Every write takes the lock for the duration of a single node update, so
/// writes to different leaves never observe each other half-done.
#[derive(Debug)]
pub struct MemoryAddressSpace {
    namespace_uri: String,
    nodes: RwLock<HashMap<String, NodeRecord, ahash::RandomState>>,
}

impl MemoryAddressSpace {
    pub fn new(namespace_uri: impl Into<String>) -> Self {
        let mut nodes = HashMap::default();
        nodes.insert(
            OBJECTS_ROOT.to_string(),
            NodeRecord {
                browse_name: OBJECTS_ROOT.to_string(),
                class: NodeClass::Object,
                type_definition: None,
                value: Value::Empty,
                parent: None,
                children: Vec::new(),
            },
        );
        MemoryAddressSpace {
            namespace_uri: namespace_uri.into(),
            nodes: RwLock::new(nodes),
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        // The objects root is always present
        self.len() <= 1
    }

    pub fn node_class(&self, node: &NodeHandle) -> Option<NodeClass> {
        self.read().get(node.identifier()).map(|n| n.class)
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, NodeRecord, ahash::RandomState>> {
        self.nodes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, NodeRecord, ahash::RandomState>> {
        self.nodes.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(
        &self,
        parent: &NodeHandle,
        identifier: &str,
        record: NodeRecord,
    ) -> Result<NodeHandle, AddressSpaceError> {
        let mut nodes = self.write();
        if nodes.contains_key(identifier) {
            return Err(AddressSpaceError::DuplicateNode(identifier.to_string()));
        }
        let handle = NodeHandle::new(identifier);
        nodes
            .get_mut(parent.identifier())
            .ok_or_else(|| AddressSpaceError::ParentNotFound(parent.to_string()))?
            .children
            .push(handle.clone());
        nodes.insert(identifier.to_string(), record);
        log::trace!("Created node {identifier}");
        Ok(handle)
    }
}

impl AddressSpace for MemoryAddressSpace {
    fn namespace_uri(&self) -> &str {
        &self.namespace_uri
    }

    fn objects_root(&self) -> NodeHandle {
        NodeHandle::new(OBJECTS_ROOT)
    }

    fn create_object(
        &self,
        parent: &NodeHandle,
        identifier: &str,
        browse_name: &str,
        type_definition: Option<&str>,
    ) -> Result<NodeHandle, AddressSpaceError> {
        let record = NodeRecord {
            browse_name: browse_name.to_string(),
            class: NodeClass::Object,
            type_definition: type_definition.map(str::to_string),
            value: Value::Empty,
            parent: Some(parent.clone()),
            children: Vec::new(),
        };
        self.insert(parent, identifier, record)
    }

    fn create_variable(
        &self,
        parent: &NodeHandle,
        identifier: &str,
        browse_name: &str,
        initial: Value,
    ) -> Result<NodeHandle, AddressSpaceError> {
        let record = NodeRecord {
            browse_name: browse_name.to_string(),
            class: NodeClass::Variable,
            type_definition: None,
            value: initial,
            parent: Some(parent.clone()),
            children: Vec::new(),
        };
        self.insert(parent, identifier, record)
    }

    fn get_node(&self, identifier: &str) -> Option<NodeHandle> {
        self.read()
            .contains_key(identifier)
            .then(|| NodeHandle::new(identifier))
    }

    fn get_child(&self, node: &NodeHandle, browse_name: &str) -> Option<NodeHandle> {
        let nodes = self.read();
        nodes
            .get(node.identifier())?
            .children
            .iter()
            .find(|child| {
                nodes
                    .get(child.identifier())
                    .is_some_and(|c| c.browse_name == browse_name)
            })
            .cloned()
    }

    fn get_parent(&self, node: &NodeHandle) -> Option<NodeHandle> {
        self.read().get(node.identifier())?.parent.clone()
    }

    fn children(&self, node: &NodeHandle) -> Vec<NodeHandle> {
        self.read()
            .get(node.identifier())
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn type_definition(&self, node: &NodeHandle) -> Option<String> {
        self.read().get(node.identifier())?.type_definition.clone()
    }

    fn set_value(&self, node: &NodeHandle, value: Value) -> Result<(), AddressSpaceError> {
        let mut nodes = self.write();
        let record = nodes
            .get_mut(node.identifier())
            .ok_or_else(|| AddressSpaceError::NodeNotFound(node.to_string()))?;
        if record.class != NodeClass::Variable {
            return Err(AddressSpaceError::NotAVariable(node.to_string()));
        }
        record.value = value;
        Ok(())
    }

    fn read_value(&self, node: &NodeHandle) -> Option<Value> {
        self.read().get(node.identifier()).map(|n| n.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space_with_sensor() -> (MemoryAddressSpace, NodeHandle) {
        let space = MemoryAddressSpace::new("urn:test");
        let sensor = space
            .create_object(&space.objects_root(), "Unit|u1|Sensor|S", "S", Some("SType"))
            .unwrap();
        space
            .create_variable(&sensor, &sensor.child_id("Temperature"), "Temperature", Value::Empty)
            .unwrap();
        (space, sensor)
    }

    #[test]
    fn test_create_and_browse() {
        let (space, sensor) = space_with_sensor();
        let child = space.get_child(&sensor, "Temperature").unwrap();
        assert_eq!(child.identifier(), "Unit|u1|Sensor|S.Temperature");
        assert_eq!(space.get_parent(&child), Some(sensor.clone()));
        assert_eq!(space.get_parent(&sensor), Some(space.objects_root()));
        assert_eq!(space.type_definition(&sensor).as_deref(), Some("SType"));
        assert_eq!(space.node_class(&sensor), Some(NodeClass::Object));
        assert_eq!(space.node_class(&child), Some(NodeClass::Variable));
        assert_eq!(space.children(&sensor), vec![child]);
        assert!(space.get_child(&sensor, "Salinity").is_none());
    }

    #[test]
    fn test_duplicate_identifier_rejected() {
        let (space, _) = space_with_sensor();
        let res = space.create_object(&space.objects_root(), "Unit|u1|Sensor|S", "S", None);
        assert_eq!(
            res,
            Err(AddressSpaceError::DuplicateNode("Unit|u1|Sensor|S".into()))
        );
    }

    #[test]
    fn test_missing_parent_rejected() {
        let space = MemoryAddressSpace::new("urn:test");
        let res = space.create_object(&NodeHandle::new("nowhere"), "x", "x", None);
        assert!(matches!(res, Err(AddressSpaceError::ParentNotFound(_))));
        assert!(space.is_empty());
    }

    #[test]
    fn test_set_value() {
        let (space, sensor) = space_with_sensor();
        let temperature = space.get_node("Unit|u1|Sensor|S.Temperature").unwrap();
        space.set_value(&temperature, Value::Float(12.5)).unwrap();
        assert_eq!(space.read_value(&temperature), Some(Value::Float(12.5)));

        assert!(matches!(
            space.set_value(&sensor, Value::Float(1.0)),
            Err(AddressSpaceError::NotAVariable(_))
        ));
        assert!(matches!(
            space.set_value(&NodeHandle::new("gone"), Value::Float(1.0)),
            Err(AddressSpaceError::NodeNotFound(_))
        ));
    }
}
