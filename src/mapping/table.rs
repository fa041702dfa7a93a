use std::collections::HashMap;

use crate::config::KeyMatch;

use super::{channel_fragment, Scope, SourceKey};

type FastMap<K, V> = HashMap<K, V, ahash::RandomState>;

/// Local write target of a source key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MappingEntry {
    pub scope: Scope,
    pub unit_id: String,
    pub sensor_name: String,
    pub measurement_name: String,
}

/// Source key to write targets, with a `<scope>:<channel>` fan-out index
///
/// Keys are kept in registration order; entries under one key keep their
/// insertion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MappingTable {
    keys: Vec<SourceKey>,
    entries: FastMap<SourceKey, Vec<MappingEntry>>,
    by_fragment: FastMap<String, Vec<usize>>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `entry` under the key of `(scope, channel, entry.sensor_name)`
    pub fn insert(&mut self, channel: &str, entry: MappingEntry) -> SourceKey {
        let key = SourceKey::new(&entry.scope, channel, &entry.sensor_name);
        match self.entries.get_mut(&key) {
            Some(list) => list.push(entry),
            None => {
                let fragment = channel_fragment(&entry.scope, channel);
                self.by_fragment
                    .entry(fragment)
                    .or_default()
                    .push(self.keys.len());
                self.keys.push(key.clone());
                self.entries.insert(key.clone(), vec![entry]);
            }
        }
        key
    }

    pub fn get(&self, key: &SourceKey) -> Option<&[MappingEntry]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Keys in registration order
    pub fn keys(&self) -> impl Iterator<Item = &SourceKey> {
        self.keys.iter()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SourceKey, &[MappingEntry])> {
        self.keys
            .iter()
            .filter_map(|key| self.get(key).map(|entries| (key, entries)))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of entries across all keys
    pub fn entry_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Every key registered for `fragment`, in registration order
    pub fn resolve_exact(&self, fragment: &str) -> Vec<(&SourceKey, &[MappingEntry])> {
        let Some(indices) = self.by_fragment.get(fragment) else {
            return Vec::new();
        };
        indices
            .iter()
            .filter_map(|&i| self.keys.get(i))
            .filter_map(|key| self.get(key).map(|entries| (key, entries)))
            .collect()
    }

    /// First key, in registration order, containing `fragment`
    pub fn resolve_substring(&self, fragment: &str) -> Option<(&SourceKey, &[MappingEntry])> {
        self.iter().find(|(key, _)| key.contains(fragment))
    }

    pub fn resolve(&self, fragment: &str, mode: KeyMatch) -> Vec<(&SourceKey, &[MappingEntry])> {
        match mode {
            KeyMatch::Exact => self.resolve_exact(fragment),
            KeyMatch::Substring => self.resolve_substring(fragment).into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(scope: &Scope, sensor: &str, measurement: &str) -> MappingEntry {
        MappingEntry {
            scope: scope.clone(),
            unit_id: scope.key_token().to_string(),
            sensor_name: sensor.to_string(),
            measurement_name: measurement.to_string(),
        }
    }

    #[test]
    fn test_insert_appends() {
        let unit = Scope::Unit("u1".into());
        let mut table = MappingTable::new();
        let a = table.insert("ch1", entry(&unit, "S", "Direction"));
        let b = table.insert("ch1", entry(&unit, "S", "Speed"));
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
        assert_eq!(table.entry_count(), 2);
        let names: Vec<_> = table
            .get(&a)
            .unwrap()
            .iter()
            .map(|e| e.measurement_name.as_str())
            .collect();
        assert_eq!(names, vec!["Direction", "Speed"]);
    }

    #[test]
    fn test_exact_fans_out() {
        let unit = Scope::Unit("u1".into());
        let mut table = MappingTable::new();
        table.insert("ch1", entry(&unit, "Temperature_5m", "Temperature"));
        table.insert("ch1", entry(&unit, "Temperature_10m", "Temperature"));
        table.insert("ch10", entry(&unit, "Salinity_5m", "Salinity"));

        let hits = table.resolve_exact("u1:ch1");
        let sensors: Vec<_> = hits.iter().map(|(_, e)| e[0].sensor_name.as_str()).collect();
        assert_eq!(sensors, vec!["Temperature_5m", "Temperature_10m"]);
        assert!(table.resolve_exact("u2:ch1").is_empty());
    }

    #[test]
    fn test_substring_first_match() {
        let unit = Scope::Unit("u1".into());
        let mut table = MappingTable::new();
        table.insert("ch10", entry(&unit, "Salinity_5m", "Salinity"));
        table.insert("ch1", entry(&unit, "Temperature_5m", "Temperature"));

        // "u1:ch1" is a prefix of "u1:ch10:..." so the earlier key wins
        let hits = table.resolve("u1:ch1", KeyMatch::Substring);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].1[0].sensor_name, "Salinity_5m");

        let exact = table.resolve("u1:ch1", KeyMatch::Exact);
        assert_eq!(exact[0].1[0].sensor_name, "Temperature_5m");
    }
}
