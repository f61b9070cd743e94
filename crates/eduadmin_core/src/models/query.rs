//! List request/response shapes for the content API's list endpoints.

use super::record::Record;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Key/value constraints narrowing a list fetch.
///
/// Ordered so two filters built in different insertion orders compare equal
/// and serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(BTreeMap<String, Value>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Compact JSON object used as the `filter` query parameter.
    pub fn to_query_value(&self) -> String {
        Value::Object(self.0.clone().into_iter().collect()).to_string()
    }
}

/// Sort direction for list fetches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one bounded list fetch. `page` is 1-based.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListParams {
    pub page: usize,
    pub per_page: usize,
    pub sort_field: String,
    pub sort_order: SortOrder,
    pub filter: Filter,
}

/// A list fetch addressed to a resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListRequest {
    pub resource: String,
    pub params: ListParams,
}

/// One page of records plus whatever boundary signal the backend sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListPage {
    #[serde(default)]
    pub data: Vec<Record>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(rename = "hasMore", alias = "has_more", default)]
    pub has_more: Option<bool>,
}

impl ListPage {
    pub fn new(data: Vec<Record>) -> Self {
        Self {
            data,
            total: None,
            has_more: None,
        }
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    pub fn with_has_more(mut self, has_more: bool) -> Self {
        self.has_more = Some(has_more);
        self
    }
}
