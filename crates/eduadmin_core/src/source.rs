//! The list-fetch collaborator seam plus an in-memory implementation.
//!
//! Selectors never talk to HTTP directly; they ask a [`ListSource`] for a
//! bounded page. The in-memory [`StaticListSource`] backs tests and the
//! offline demo mode.

use crate::constants::DEFAULT_SEARCH_PARAM;
use crate::error::AppError;
use crate::models::{ListPage, ListParams, ListRequest, Record, RecordId, SortOrder};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Mutex;

/// Fetches one page of records for a named resource.
///
/// Implementations block; async callers run them on a worker thread.
pub trait ListSource: Send + Sync {
    /// # Errors
    /// Returns transport, status or decode failures. Callers in the selector
    /// layer log these and degrade to empty results.
    fn fetch_list(&self, resource: &str, params: &ListParams) -> Result<ListPage, AppError>;
}

impl<T: ListSource + ?Sized> ListSource for std::sync::Arc<T> {
    fn fetch_list(&self, resource: &str, params: &ListParams) -> Result<ListPage, AppError> {
        (**self).fetch_list(resource, params)
    }
}

/// In-memory resource tables that honor filter, search, sort and paging.
///
/// Filter semantics: every entry must match. A record field matches when it
/// equals the filter value after id normalization, when it is an array
/// containing the value, or when it is a relation object whose `id` or
/// `documentId` equals the value. The search key (`q`) matches a
/// case-insensitive substring of any string field.
#[derive(Default)]
pub struct StaticListSource {
    tables: HashMap<String, Vec<Record>>,
    search_param: String,
    pending_failures: AtomicUsize,
    requests: Mutex<Vec<ListRequest>>,
}

impl StaticListSource {
    pub fn new() -> Self {
        Self {
            search_param: DEFAULT_SEARCH_PARAM.to_string(),
            ..Self::default()
        }
    }

    pub fn with_table(mut self, resource: &str, records: Vec<Record>) -> Self {
        self.tables.insert(resource.to_string(), records);
        self
    }

    /// Make the next `count` fetches fail with a transport error.
    pub fn fail_next(&self, count: usize) {
        self.pending_failures.store(count, AtomicOrdering::SeqCst);
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<ListRequest> {
        match self.requests.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests().len()
    }

    fn record_request(&self, resource: &str, params: &ListParams) {
        let request = ListRequest {
            resource: resource.to_string(),
            params: params.clone(),
        };
        match self.requests.lock() {
            Ok(mut guard) => guard.push(request),
            Err(poisoned) => poisoned.into_inner().push(request),
        }
    }

    fn take_failure(&self) -> bool {
        self.pending_failures
            .fetch_update(AtomicOrdering::SeqCst, AtomicOrdering::SeqCst, |left| {
                left.checked_sub(1)
            })
            .is_ok()
    }

    fn record_passes(&self, record: &Record, params: &ListParams) -> bool {
        params.filter.iter().all(|(key, expected)| {
            if key == &self.search_param {
                return match expected.as_str().map(str::trim) {
                    Some(needle) if !needle.is_empty() => record_contains_text(record, needle),
                    _ => true,
                };
            }
            match record.field(key) {
                Some(actual) => value_matches(&actual, expected),
                None => expected.is_null(),
            }
        })
    }
}

impl ListSource for StaticListSource {
    fn fetch_list(&self, resource: &str, params: &ListParams) -> Result<ListPage, AppError> {
        self.record_request(resource, params);
        if self.take_failure() {
            return Err(AppError::Transport("injected failure".to_string()));
        }
        let table = self
            .tables
            .get(resource)
            .ok_or_else(|| AppError::UnknownResource(resource.to_string()))?;

        let mut matching: Vec<&Record> = table
            .iter()
            .filter(|record| self.record_passes(record, params))
            .collect();
        matching.sort_by(|a, b| {
            let ordering = compare_fields(
                a.field(&params.sort_field).as_ref(),
                b.field(&params.sort_field).as_ref(),
            );
            match params.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = matching.len() as u64;
        let page = params.page.max(1);
        let data = matching
            .into_iter()
            .skip((page - 1).saturating_mul(params.per_page))
            .take(params.per_page)
            .cloned()
            .collect();
        Ok(ListPage::new(data).with_total(total))
    }
}

fn value_matches(actual: &Value, expected: &Value) -> bool {
    match actual {
        Value::Array(items) => items.iter().any(|item| value_matches(item, expected)),
        Value::Object(relation) => ["id", "documentId"]
            .iter()
            .filter_map(|key| relation.get(*key))
            .any(|id| value_matches(id, expected)),
        _ => match (RecordId::from_json(actual), RecordId::from_json(expected)) {
            (Some(left), Some(right)) => left == right,
            _ => actual == expected,
        },
    }
}

fn record_contains_text(record: &Record, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    record
        .fields
        .values()
        .filter_map(Value::as_str)
        .any(|text| text.to_lowercase().contains(&needle))
}

fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(left)), Some(Value::Number(right))) => {
            let left = left.as_f64().unwrap_or_default();
            let right = right.as_f64().unwrap_or_default();
            left.partial_cmp(&right).unwrap_or(Ordering::Equal)
        }
        (Some(left), Some(right)) => sort_text(left).cmp(&sort_text(right)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn sort_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.to_lowercase(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Filter;
    use serde_json::json;

    fn topics() -> Vec<Record> {
        vec![
            Record::new(1u64)
                .with_field("name", "Algebra")
                .with_field("subject", json!({ "id": 10 })),
            Record::new(2u64)
                .with_field("name", "geometry")
                .with_field("subject", json!({ "id": 10 })),
            Record::new(3u64)
                .with_field("name", "Calculus")
                .with_field("subject", json!({ "id": 11 })),
        ]
    }

    fn params(page: usize, per_page: usize, filter: Filter) -> ListParams {
        ListParams {
            page,
            per_page,
            sort_field: "name".to_string(),
            sort_order: SortOrder::Asc,
            filter,
        }
    }

    fn names(page: &ListPage) -> Vec<String> {
        page.data
            .iter()
            .map(|record| record.display_or_id("name"))
            .collect()
    }

    #[test]
    fn sorts_case_insensitively_and_pages() {
        let source = StaticListSource::new().with_table("topics", topics());
        let first = source
            .fetch_list("topics", &params(1, 2, Filter::new()))
            .expect("page 1");
        let second = source
            .fetch_list("topics", &params(2, 2, Filter::new()))
            .expect("page 2");
        assert_eq!(names(&first), vec!["Algebra", "Calculus"]);
        assert_eq!(names(&second), vec!["geometry"]);
        assert_eq!(first.total, Some(3));
        assert_eq!(source.request_count(), 2);
    }

    #[test]
    fn filters_on_relation_ids_with_mixed_id_types() {
        let source = StaticListSource::new().with_table("topics", topics());
        let page = source
            .fetch_list("topics", &params(1, 10, Filter::new().with("subject", "10")))
            .expect("filtered");
        assert_eq!(names(&page), vec!["Algebra", "geometry"]);
    }

    #[test]
    fn search_param_matches_substrings() {
        let source = StaticListSource::new().with_table("topics", topics());
        let page = source
            .fetch_list("topics", &params(1, 10, Filter::new().with("q", "CALC")))
            .expect("search");
        assert_eq!(names(&page), vec!["Calculus"]);
    }

    #[test]
    fn injected_failures_are_consumed_once() {
        let source = StaticListSource::new().with_table("topics", topics());
        source.fail_next(1);
        assert!(source
            .fetch_list("topics", &params(1, 10, Filter::new()))
            .is_err());
        assert!(source
            .fetch_list("topics", &params(1, 10, Filter::new()))
            .is_ok());
    }

    #[test]
    fn unknown_resource_is_an_error() {
        let source = StaticListSource::new();
        let err = source
            .fetch_list("lessons", &params(1, 10, Filter::new()))
            .expect_err("unknown");
        assert!(matches!(err, AppError::UnknownResource(name) if name == "lessons"));
    }
}
