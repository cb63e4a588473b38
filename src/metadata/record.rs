use serde::{Deserialize, Serialize};

use super::value::Value;

/// One row of metadata: labels mapped to values, in column order.
///
/// Null cells are not stored, so a label is either present with a value or
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    fields: Vec<(String, Value)>,
}

impl MetadataRecord {
    /// Empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Value stored under `label`
    pub fn get(&self, label: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, value)| value)
    }

    /// Set `label`, returning the previous value. New labels keep insertion order.
    pub fn insert(&mut self, label: impl Into<String>, value: Value) -> Option<Value> {
        let label = label.into();
        match self.fields.iter_mut().find(|(name, _)| *name == label) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((label, value));
                None
            }
        }
    }

    /// Remove `label`
    pub fn remove(&mut self, label: &str) -> Option<Value> {
        let pos = self.fields.iter().position(|(name, _)| name == label)?;
        Some(self.fields.remove(pos).1)
    }

    /// Copy every field of `other` into this record, overwriting shared labels
    pub fn merge(&mut self, other: MetadataRecord) {
        for (label, value) in other.fields {
            self.insert(label, value);
        }
    }

    /// Fields in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<L: Into<String>> FromIterator<(L, Value)> for MetadataRecord {
    fn from_iter<T: IntoIterator<Item = (L, Value)>>(iter: T) -> Self {
        let mut record = MetadataRecord::new();
        for (label, value) in iter {
            record.insert(label, value);
        }
        record
    }
}
