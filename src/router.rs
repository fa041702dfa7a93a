//! Resolves incoming channel values through the mapping table into node writes
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::address_space::{AddressSpace, AddressSpaceError, NodeHandle, Value};
use crate::config::KeyMatch;
use crate::helpers;
use crate::mapping::{
    channel_fragment, CompiledConfig, MappingEntry, Scope, SourceKey, LOCAL_TIMESTAMP,
};

/// Measurement whose target lives inside the sensor's position record
const DEPTH: &str = "Depth";
const POSITION_DEPTH: &str = "Position.Depth";

/// Value carried by a data change
#[derive(Clone, Debug, PartialEq)]
pub enum Sample {
    Number(f64),
    Text(String),
}

impl Sample {
    /// Numbers when the payload parses as one, text otherwise
    pub fn parse(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(number) => Sample::Number(number),
            Err(_) => Sample::Text(raw.to_string()),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Sample::Number(number) => Some(*number),
            Sample::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sample::Number(number) => write!(f, "{number}"),
            Sample::Text(text) => f.write_str(text),
        }
    }
}

impl From<f64> for Sample {
    fn from(number: f64) -> Self {
        Sample::Number(number)
    }
}

impl From<&str> for Sample {
    fn from(text: &str) -> Self {
        Sample::Text(text.to_string())
    }
}

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("target node '{0}' not found")]
    TargetMissing(String),
    #[error("value '{value}' for '{target}' is not numeric")]
    NotNumeric { target: String, value: String },
    #[error(transparent)]
    Write(#[from] AddressSpaceError),
}

/// Summary of one routing pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RouteOutcome {
    pub matched_keys: usize,
    pub entries: usize,
    pub targets_written: usize,
    pub timestamps_written: usize,
    pub unresolved: usize,
}

/// Target path below the sensor object for a measurement name
pub fn measurement_path(measurement: &str) -> &str {
    if measurement == DEPTH {
        POSITION_DEPTH
    } else {
        measurement
    }
}

pub struct Router {
    space: Arc<dyn AddressSpace>,
    compiled: Arc<CompiledConfig>,
}

impl Router {
    pub fn new(space: Arc<dyn AddressSpace>, compiled: Arc<CompiledConfig>) -> Self {
        Router { space, compiled }
    }

    pub fn key_match(&self) -> KeyMatch {
        self.compiled.key_match
    }

    pub fn route(&self, scope: &Scope, channel: &str, sample: Sample) -> RouteOutcome {
        self.route_at(scope, channel, sample, &helpers::now_local())
    }

    /// Routes one value, stamping touched sensors with `local_time`
    pub fn route_at(
        &self,
        scope: &Scope,
        channel: &str,
        sample: Sample,
        local_time: &str,
    ) -> RouteOutcome {
        let mut outcome = RouteOutcome::default();
        let fragment = channel_fragment(scope, channel);
        let resolved = self.compiled.mapping.resolve(&fragment, self.key_match());
        if resolved.is_empty() {
            log::trace!("No {:?} mapping for {fragment}", self.key_match());
            return outcome;
        }

        for (key, entries) in resolved {
            self.serve(key, entries, &sample, local_time, &mut outcome);
        }
        log::trace!("Routed {sample} on {fragment}: {outcome:?}");
        outcome
    }

    /// Routes one value to the entries of a single, fully known source key
    pub fn route_key(&self, key: &SourceKey, sample: Sample, local_time: &str) -> RouteOutcome {
        let mut outcome = RouteOutcome::default();
        match self.compiled.mapping.get(key) {
            Some(entries) => self.serve(key, entries, &sample, local_time, &mut outcome),
            None => log::trace!("No mapping for {key}"),
        }
        outcome
    }

    fn serve(
        &self,
        key: &SourceKey,
        entries: &[MappingEntry],
        sample: &Sample,
        local_time: &str,
        outcome: &mut RouteOutcome,
    ) {
        outcome.matched_keys += 1;
        for entry in entries {
            outcome.entries += 1;
            match self.write_entry(entry, sample, local_time) {
                Ok(stamped) => {
                    outcome.targets_written += 1;
                    if stamped {
                        outcome.timestamps_written += 1;
                    }
                }
                Err(e) => {
                    outcome.unresolved += 1;
                    log::debug!("Skipping {key} -> {}: {e}", entry.measurement_name);
                }
            }
        }
    }

    /// Writes one target and returns whether its sibling timestamp was set
    fn write_entry(
        &self,
        entry: &MappingEntry,
        sample: &Sample,
        local_time: &str,
    ) -> Result<bool, RouteError> {
        let identifier = format!(
            "{}.{}",
            entry.scope.sensor_node_id(&entry.sensor_name),
            measurement_path(&entry.measurement_name)
        );
        let target = self
            .space
            .get_node(&identifier)
            .ok_or_else(|| RouteError::TargetMissing(identifier.clone()))?;

        let value = if entry.measurement_name == LOCAL_TIMESTAMP {
            Value::String(sample.to_string())
        } else {
            let number = sample.as_number().ok_or_else(|| RouteError::NotNumeric {
                target: identifier.clone(),
                value: sample.to_string(),
            })?;
            Value::Float(number)
        };
        self.space.set_value(&target, value)?;

        Ok(self.stamp_parent(&target, local_time))
    }

    fn stamp_parent(&self, target: &NodeHandle, local_time: &str) -> bool {
        let Some(timestamp) = self
            .space
            .get_parent(target)
            .and_then(|parent| self.space.get_child(&parent, LOCAL_TIMESTAMP))
        else {
            return false;
        };
        match self
            .space
            .set_value(&timestamp, Value::String(local_time.to_string()))
        {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Could not stamp {timestamp}: {e}");
                false
            }
        }
    }
}
