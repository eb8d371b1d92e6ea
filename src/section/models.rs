//! Section model types.

use serde::Serialize;
use std::collections::BTreeMap;

/// Attribute name to value, as printed by `runmqsc` and `dspmq`.
pub type AttributeRecord = BTreeMap<String, String>;

/// Status assumed for a queue manager that has no record of its own.
pub const DEFAULT_QMGR_STATUS: &str = "RUNNING";

/// Parsed `runmqsc` DISPLAY output.
///
/// Keys are either a bare queue manager name, holding that queue manager's
/// `STATUS` and `NOW`, or `"<qmgr>:<object>"` for queues and channels.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Section {
    records: BTreeMap<String, AttributeRecord>,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&AttributeRecord> {
        self.records.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Keys of managed objects, i.e. those carrying a queue manager prefix.
    pub fn object_keys(&self) -> impl Iterator<Item = &str> {
        self.keys().filter(|key| key.contains(':'))
    }

    /// Replace the record stored under `key`.
    pub fn insert(&mut self, key: impl Into<String>, record: AttributeRecord) {
        self.records.insert(key.into(), record);
    }

    /// Merge `attributes` into the record under `key`, later values winning.
    pub fn merge(&mut self, key: impl Into<String>, attributes: AttributeRecord) {
        self.records.entry(key.into()).or_default().extend(attributes);
    }

    /// Value of the `NOW` attribute of the given queue manager.
    pub fn qmgr_time(&self, qmgr: &str) -> Option<&str> {
        self.get(qmgr)
            .and_then(|record| record.get("NOW"))
            .map(String::as_str)
    }
}

impl FromIterator<(String, AttributeRecord)> for Section {
    fn from_iter<I: IntoIterator<Item = (String, AttributeRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
impl Section {
    pub(crate) fn from_pairs(entries: Vec<(&str, Vec<(&str, &str)>)>) -> Self {
        entries
            .into_iter()
            .map(|(key, attrs)| {
                let record: AttributeRecord = attrs
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                (key.to_string(), record)
            })
            .collect()
    }
}

/// One running instance of a multi-instance queue manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instance {
    pub name: String,
    pub mode: String,
}

/// A queue manager as reported by `dspmq -o all -x`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ManagerRecord {
    pub attributes: AttributeRecord,
    pub instances: Vec<Instance>,
}

impl ManagerRecord {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Parsed `dspmq` output, keyed by queue manager name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ManagerSection {
    records: BTreeMap<String, ManagerRecord>,
}

impl ManagerSection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ManagerRecord> {
        self.records.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ManagerRecord> {
        self.records.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, record: ManagerRecord) {
        self.records.insert(name.into(), record);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Self-report of the agent plugin (`version`, `dspmq`, `runmqsc`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PluginSection {
    values: BTreeMap<String, String>,
}

impl PluginSection {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
