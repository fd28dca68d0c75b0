//! Checker data model.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of the field that identifies a checker on the remote service.
pub const UUID_FIELD: &str = "uuid";

/// A single checker field value.
///
/// Numbers keep their exact JSON representation, so `1` and `1.0` compare
/// as different values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    /// Borrow the value as a string slice, if it is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

/// A checker as a mapping from field name to value.
///
/// Used both for the desired state supplied by the caller and for the
/// records returned by the remote service; the two have the same shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checker {
    fields: BTreeMap<String, FieldValue>,
}

/// Desired state of one checker.
pub type CheckerSpec = Checker;

/// The remote service's current representation of one checker.
pub type ExistingChecker = Checker;

impl Checker {
    /// Create an empty checker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// The checker's identifier, when present as a non-empty string.
    #[must_use]
    pub fn uuid(&self) -> Option<&str> {
        self.fields
            .get(UUID_FIELD)
            .and_then(FieldValue::as_str)
            .filter(|uuid| !uuid.is_empty())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Names of the fields in `self` whose value differs from `existing`.
    ///
    /// A field missing from `existing` counts as a difference. Fields only
    /// present on `existing` are ignored.
    #[must_use]
    pub fn dirty_fields(&self, existing: &Self) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(key, value)| existing.fields.get(key.as_str()) != Some(*value))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// `self` with every field of `spec` written over it.
    #[must_use]
    pub fn overlay(&self, spec: &Self) -> Self {
        let mut fields = self.fields.clone();
        fields.extend(spec.fields.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self { fields }
    }

    /// Compact JSON rendering, used to name a checker in error messages.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self.fields))
    }
}

/// Bearer credential for the checks service.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}
