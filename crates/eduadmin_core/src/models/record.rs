//! Remote records (selectable options) and their identity keys.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Canonical record identifier.
///
/// Content APIs hand out identifiers as JSON numbers in some payloads and as
/// strings in others. Both are normalized to one string form when parsed, so
/// every comparison past the boundary is plain equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Convert back to JSON for outgoing filters.
    ///
    /// # Returns
    /// A JSON number when the identifier is a plain unsigned integer,
    /// otherwise a JSON string.
    pub fn to_json(&self) -> Value {
        let is_plain_integer = !self.0.is_empty()
            && self.0.bytes().all(|b| b.is_ascii_digit())
            && (self.0 == "0" || !self.0.starts_with('0'));
        if is_plain_integer {
            if let Ok(number) = self.0.parse::<u64>() {
                return Value::from(number);
            }
        }
        Value::String(self.0.clone())
    }

    /// Normalize a JSON scalar into an identifier.
    ///
    /// # Returns
    /// `None` for nulls, booleans, arrays, objects and blank strings.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) if !text.trim().is_empty() => Some(Self::new(text.as_str())),
            Value::Number(number) => Some(Self(number.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Self::from_json(&raw)
            .ok_or_else(|| de::Error::custom(format!("expected string or number id, got {raw}")))
    }
}

/// A selectable record returned by a list endpoint.
///
/// Only the identity fields are typed; everything else (display text,
/// relations, flags) stays in `fields` so one type serves every resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(
        rename = "documentId",
        alias = "document_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub document_id: Option<RecordId>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            document_id: None,
            fields: Map::new(),
        }
    }

    pub fn with_document_id(mut self, document_id: impl Into<RecordId>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Canonical identity: the document id when present, else the primary id.
    pub fn identity_key(&self) -> &RecordId {
        self.document_id.as_ref().unwrap_or(&self.id)
    }

    /// Whether `id` names this record through either identity field.
    pub fn matches(&self, id: &RecordId) -> bool {
        &self.id == id || self.document_id.as_ref() == Some(id)
    }

    /// Whether two records describe the same logical entry.
    pub fn shares_identity(&self, other: &Record) -> bool {
        other.matches(&self.id) || self.document_id.as_ref().is_some_and(|doc| other.matches(doc))
    }

    /// Look up a field, treating `id` and `documentId` as regular fields.
    pub fn field(&self, key: &str) -> Option<Value> {
        match key {
            "id" => Some(self.id.to_json()),
            "documentId" | "document_id" => self.document_id.as_ref().map(RecordId::to_json),
            _ => self.fields.get(key).cloned(),
        }
    }

    /// Render a field as display text.
    ///
    /// # Returns
    /// Text for string, number and boolean fields; `None` otherwise.
    pub fn display(&self, field: &str) -> Option<String> {
        match self.field(field)? {
            Value::String(text) => Some(text),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    /// Display text, falling back to `#id` when the field is missing.
    pub fn display_or_id(&self, field: &str) -> String {
        self.display(field)
            .unwrap_or_else(|| format!("#{}", self.identity_key()))
    }
}
