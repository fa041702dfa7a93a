//! Local address space the bridge materializes sensors into
//!
//! [`AddressSpace`] is the seam towards the hosting server: node creation,
//! lookup by identifier, browsing by browse name and value writes.
//! [`MemoryAddressSpace`] is the in-process implementation used by the binary.
use std::fmt;

use thiserror::Error;

mod memory;
mod value;

pub use memory::MemoryAddressSpace;
pub use value::{EuInformation, Range, Value};

/// Identifier of a node in the address space
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(String);

impl NodeHandle {
    pub fn new(identifier: impl Into<String>) -> Self {
        NodeHandle(identifier.into())
    }

    pub fn identifier(&self) -> &str {
        &self.0
    }

    /// Identifier of a typed child, `<parent>.<browse_name>`
    pub fn child_id(&self, browse_name: &str) -> String {
        format!("{}.{}", self.0, browse_name)
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeClass {
    Object,
    Variable,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressSpaceError {
    #[error("node '{0}' already exists")]
    DuplicateNode(String),
    #[error("node '{0}' not found")]
    NodeNotFound(String),
    #[error("parent node '{0}' not found")]
    ParentNotFound(String),
    #[error("node '{0}' is not a variable")]
    NotAVariable(String),
}

pub trait AddressSpace: Send + Sync {
    fn namespace_uri(&self) -> &str;

    /// Root container every unit is created under
    fn objects_root(&self) -> NodeHandle;

    fn create_object(
        &self,
        parent: &NodeHandle,
        identifier: &str,
        browse_name: &str,
        type_definition: Option<&str>,
    ) -> Result<NodeHandle, AddressSpaceError>;

    fn create_variable(
        &self,
        parent: &NodeHandle,
        identifier: &str,
        browse_name: &str,
        initial: Value,
    ) -> Result<NodeHandle, AddressSpaceError>;

    fn get_node(&self, identifier: &str) -> Option<NodeHandle>;

    fn get_child(&self, node: &NodeHandle, browse_name: &str) -> Option<NodeHandle>;

    fn get_parent(&self, node: &NodeHandle) -> Option<NodeHandle>;

    fn children(&self, node: &NodeHandle) -> Vec<NodeHandle>;

    fn type_definition(&self, node: &NodeHandle) -> Option<String>;

    fn set_value(&self, node: &NodeHandle, value: Value) -> Result<(), AddressSpaceError>;

    fn read_value(&self, node: &NodeHandle) -> Option<Value>;
}
