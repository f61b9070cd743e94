//! Remote option cache backing dropdown selectors.
//!
//! The cache performs one bounded fetch per query identity (resource, display
//! field, sort order, filter) and merges externally supplied initial records
//! so previously chosen values stay visible when the fetched page does not
//! contain them. Fetch failures never escape: they are logged and the cache
//! degrades to the initial records.

use crate::constants::{DEFAULT_DISPLAY_FIELD, DEFAULT_OPTION_LIMIT};
use crate::error::AppError;
use crate::models::{Filter, ListPage, ListParams, ListRequest, Record, RecordId, SortOrder};
use crate::source::ListSource;
use tracing::{debug, warn};

/// Prepend `incoming` records that are not already present in `current`.
///
/// Presence is decided by shared identity (primary id or document id), so an
/// initial record never duplicates a fetched one. Incoming records keep their
/// relative order ahead of the fetched ones; repeats inside `incoming` are
/// dropped. Calling this twice with the same `incoming` is a no-op the second
/// time.
pub fn merge_initial(current: Vec<Record>, incoming: &[Record]) -> Vec<Record> {
    let mut prefix: Vec<Record> = Vec::new();
    for record in incoming {
        let known = current
            .iter()
            .chain(prefix.iter())
            .any(|existing| existing.shares_identity(record));
        if !known {
            prefix.push(record.clone());
        }
    }
    if prefix.is_empty() {
        return current;
    }
    prefix.extend(current);
    prefix
}

/// What a dropdown needs to know to fetch its options.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionQuery {
    pub resource: String,
    pub display_field: String,
    pub sort_order: SortOrder,
    pub filter: Filter,
    /// Records that must stay visible (typically the current selection).
    pub initial: Vec<Record>,
    /// Size of the single bounded fetch.
    pub limit: usize,
}

impl OptionQuery {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            display_field: DEFAULT_DISPLAY_FIELD.to_string(),
            sort_order: SortOrder::Asc,
            filter: Filter::new(),
            initial: Vec::new(),
            limit: DEFAULT_OPTION_LIMIT,
        }
    }

    pub fn with_display_field(mut self, field: impl Into<String>) -> Self {
        self.display_field = field.into();
        self
    }

    pub fn with_sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_initial(mut self, initial: Vec<Record>) -> Self {
        self.initial = initial;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// # Errors
    /// Returns [`AppError::BadRequest`] for a blank resource or display field
    /// or a zero limit.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.resource.trim().is_empty() {
            return Err(AppError::BadRequest("resource must not be empty".to_string()));
        }
        if self.display_field.trim().is_empty() {
            return Err(AppError::BadRequest(
                "display field must not be empty".to_string(),
            ));
        }
        if self.limit == 0 {
            return Err(AppError::BadRequest("limit must be positive".to_string()));
        }
        Ok(())
    }

    /// Whether switching from `self` to `other` requires a refetch.
    fn fetch_identity_differs(&self, other: &OptionQuery) -> bool {
        self.resource != other.resource
            || self.display_field != other.display_field
            || self.sort_order != other.sort_order
            || self.filter != other.filter
            || self.limit != other.limit
    }

    pub fn list_request(&self) -> ListRequest {
        ListRequest {
            resource: self.resource.clone(),
            params: ListParams {
                page: 1,
                per_page: self.limit,
                sort_field: self.display_field.clone(),
                sort_order: self.sort_order,
                filter: self.filter.clone(),
            },
        }
    }
}

/// A load handed to an asynchronous driver. Echo `generation` back to
/// [`OptionCache::finish_load`].
#[derive(Debug, Clone, PartialEq)]
pub struct PendingLoad {
    pub generation: u64,
    pub request: ListRequest,
}

/// Deduplicated option list for one dropdown instance.
#[derive(Debug, Clone)]
pub struct OptionCache {
    query: OptionQuery,
    records: Vec<Record>,
    generation: u64,
    in_flight: bool,
    stale: bool,
    has_loaded: bool,
}

impl OptionCache {
    /// Create a cache that shows `initial` records until the first load.
    ///
    /// # Errors
    /// Propagates [`OptionQuery::validate`] failures.
    pub fn new(query: OptionQuery) -> Result<Self, AppError> {
        query.validate()?;
        let records = merge_initial(Vec::new(), &query.initial);
        Ok(Self {
            query,
            records,
            generation: 0,
            in_flight: false,
            stale: true,
            has_loaded: false,
        })
    }

    pub fn query(&self) -> &OptionQuery {
        &self.query
    }

    pub fn display_field(&self) -> &str {
        self.query.display_field.as_str()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// A load is due (query changed or never loaded) and none is running.
    pub fn needs_load(&self) -> bool {
        self.stale && !self.in_flight
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    /// True only while the very first load for the current query runs.
    pub fn is_initial_loading(&self) -> bool {
        self.in_flight && !self.has_loaded
    }

    /// Replace the query, invalidating cached records when the resource,
    /// display field, sort order, limit or filter changed by value.
    ///
    /// # Returns
    /// `true` when a refetch is now required.
    ///
    /// # Errors
    /// Returns the validation error and leaves the cache untouched.
    pub fn set_query(&mut self, query: OptionQuery) -> Result<bool, AppError> {
        query.validate()?;
        if self.query.fetch_identity_differs(&query) {
            debug!(
                resource = query.resource.as_str(),
                "option query changed; invalidating cache"
            );
            self.generation = self.generation.wrapping_add(1);
            self.records = merge_initial(Vec::new(), &query.initial);
            self.query = query;
            self.in_flight = false;
            self.stale = true;
            self.has_loaded = false;
            return Ok(true);
        }
        if self.query.initial != query.initial {
            let records = std::mem::take(&mut self.records);
            self.records = merge_initial(records, &query.initial);
        }
        self.query = query;
        Ok(false)
    }

    /// Mark a load as started.
    ///
    /// # Returns
    /// The request to run and the generation to report back.
    pub fn begin_load(&mut self) -> PendingLoad {
        self.generation = self.generation.wrapping_add(1);
        self.in_flight = true;
        self.stale = false;
        PendingLoad {
            generation: self.generation,
            request: self.query.list_request(),
        }
    }

    /// Apply the outcome of a load started with [`Self::begin_load`].
    ///
    /// Failures are logged and degrade to the initial records.
    ///
    /// # Returns
    /// `false` when the result belonged to a superseded load and was dropped.
    pub fn finish_load(&mut self, generation: u64, result: Result<ListPage, AppError>) -> bool {
        if generation != self.generation || !self.in_flight {
            debug!(
                resource = self.query.resource.as_str(),
                generation, "dropping superseded option load"
            );
            return false;
        }
        self.in_flight = false;
        self.has_loaded = true;
        let fetched = match result {
            Ok(page) => page.data,
            Err(err) => {
                warn!(
                    resource = self.query.resource.as_str(),
                    "option load failed: {}", err
                );
                Vec::new()
            }
        };
        self.records = merge_initial(dedupe(fetched), &self.query.initial);
        true
    }

    /// Run one load synchronously against `source`.
    pub fn load(&mut self, source: &dyn ListSource) {
        let pending = self.begin_load();
        let result = source.fetch_list(&pending.request.resource, &pending.request.params);
        self.finish_load(pending.generation, result);
    }

    /// Records whose display text contains `text`, case-insensitively.
    ///
    /// Blank search returns every record. The cache is never modified.
    pub fn search(&self, text: &str) -> Vec<&Record> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return self.records.iter().collect();
        }
        let field = self.display_field();
        self.records
            .iter()
            .filter(|record| {
                record
                    .display(field)
                    .is_some_and(|label| label.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Record named by `id` through either identity field.
    pub fn find(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|record| record.matches(id))
    }
}

fn dedupe(records: Vec<Record>) -> Vec<Record> {
    let mut out: Vec<Record> = Vec::with_capacity(records.len());
    for record in records {
        if !out.iter().any(|existing| existing.shares_identity(&record)) {
            out.push(record);
        }
    }
    out
}
