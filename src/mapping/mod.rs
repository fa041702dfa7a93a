//! Compiles a [`SensorConfig`](crate::config::SensorConfig) into sensor
//! descriptors and the source-key mapping table
//!
//! Every source key is built by [`SourceKey::new`]; the compiler registers
//! keys with it and the router rebuilds the same `<scope>:<channel>` fragment
//! with [`channel_fragment`] when a value arrives.
mod compile;
mod descriptors;
mod key;
mod table;

pub use compile::{compile, CompiledConfig};
pub use descriptors::{Credentials, SensorDescriptor, ServerDescriptor, UnitDescriptor};
pub use key::{channel_fragment, Scope, SourceKey, KEY_DELIMITER, SITE_TOKEN};
pub use table::{MappingEntry, MappingTable};

/// Channel token of the synthesized per-sensor timestamp entry
pub const LOCAL_TIMESTAMP_CHANNEL: &str = "local_timestamp";
/// Measurement name written with the local wall-clock time
pub const LOCAL_TIMESTAMP: &str = "LocalTimestamp";
