//! Extracted records and their identity keys.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One extracted item: an ordered field-name → value mapping.
///
/// The extraction backend decides the field set; field order is preserved so
/// responses read the way the extraction instruction listed the fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedRecord(pub IndexMap<String, Value>);

impl ExtractedRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a field value.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field value, returning self for chaining.
    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Whether every named field is present and non-null.
    ///
    /// Fetchers use this to enforce record validity; the pagination loop
    /// never re-checks it.
    pub fn has_fields<S: AsRef<str>>(&self, fields: &[S]) -> bool {
        fields.iter().all(|f| {
            self.0
                .get(f.as_ref())
                .map(|v| !v.is_null())
                .unwrap_or(false)
        })
    }

    /// Derive the record's identity key from the named field.
    ///
    /// Returns `None` when the field is absent or carries a value with no
    /// canonical string form; such records are never deduplicated.
    pub fn identity_key(&self, field: &str) -> Option<IdentityKey> {
        self.0.get(field).and_then(IdentityKey::from_value)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ExtractedRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Duplicate-detection key for a record within one session.
///
/// Two records with the same key are the same logical entity; only the first
/// occurrence is kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Derive a key from a field value.
    ///
    /// Strings are used as-is; numbers and bools via their JSON text form.
    /// Null and structured values have no canonical identity and yield
    /// `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(_) | Value::Bool(_) => Some(Self(value.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// The key's string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
