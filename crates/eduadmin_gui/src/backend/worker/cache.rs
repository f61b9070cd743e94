//! Short-lived page cache for the fetch worker.

use eduadmin_core::{ListPage, ListParams};
use std::time::{Duration, Instant};
use tracing::info;

// Entries expire quickly so edits made elsewhere show up on the next open.
pub(crate) const LIST_CACHE_MAX_AGE: Duration = Duration::from_millis(500);
pub(crate) const LIST_CACHE_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq)]
struct ListCacheKey {
    resource: String,
    params: ListParams,
}

#[derive(Debug)]
struct ListCacheEntry {
    key: ListCacheKey,
    page: ListPage,
    cached_at: Instant,
}

#[derive(Debug, Default)]
pub(super) struct ListCache {
    entries: Vec<ListCacheEntry>,
    hits: u64,
    misses: u64,
    invalidations: u64,
}

impl ListCache {
    /// Fresh cached page for `resource` + `params`, counting the hit or miss.
    pub(super) fn lookup(&mut self, resource: &str, params: &ListParams) -> Option<ListPage> {
        self.entries
            .retain(|entry| entry.cached_at.elapsed() <= LIST_CACHE_MAX_AGE);
        let found = self
            .entries
            .iter()
            .find(|entry| entry.key.resource == resource && &entry.key.params == params)
            .map(|entry| entry.page.clone());
        if found.is_some() {
            self.hits = self.hits.saturating_add(1);
        } else {
            self.misses = self.misses.saturating_add(1);
        }
        found
    }

    pub(super) fn store(&mut self, resource: &str, params: &ListParams, page: &ListPage) {
        let key = ListCacheKey {
            resource: resource.to_string(),
            params: params.clone(),
        };
        self.entries.retain(|entry| entry.key != key);
        if self.entries.len() >= LIST_CACHE_CAPACITY {
            self.entries.remove(0);
        }
        self.entries.push(ListCacheEntry {
            key,
            page: page.clone(),
            cached_at: Instant::now(),
        });
    }

    pub(super) fn invalidate(&mut self) {
        if !self.entries.is_empty() {
            self.entries.clear();
            self.invalidations = self.invalidations.saturating_add(1);
        }
    }

    #[cfg(test)]
    pub(super) fn counters(&self) -> (u64, u64, u64) {
        (self.hits, self.misses, self.invalidations)
    }
}

pub(super) fn log_fetch_perf(
    enabled: bool,
    cache: &ListCache,
    resource: &str,
    cache_hit: bool,
    elapsed_ms: f64,
    items: usize,
) {
    if !enabled {
        return;
    }
    info!(
        target: "eduadmin_gui::backend_perf",
        resource = resource,
        cache_hit = cache_hit,
        elapsed_ms = elapsed_ms,
        items = items,
        cache_hits = cache.hits,
        cache_misses = cache.misses,
        cache_entries = cache.entries.len(),
        cache_invalidations = cache.invalidations,
        "backend list perf"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use eduadmin_core::{Filter, Record, SortOrder};

    fn params(page: usize) -> ListParams {
        ListParams {
            page,
            per_page: 20,
            sort_field: "name".to_string(),
            sort_order: SortOrder::Asc,
            filter: Filter::new().with("subject", 3),
        }
    }

    #[test]
    fn lookup_hits_only_identical_resource_and_params() {
        let mut cache = ListCache::default();
        let page = ListPage::new(vec![Record::new(1u64)]);
        cache.store("topics", &params(1), &page);

        assert_eq!(cache.lookup("topics", &params(1)), Some(page));
        assert!(cache.lookup("topics", &params(2)).is_none());
        assert!(cache.lookup("subjects", &params(1)).is_none());
        assert_eq!(cache.counters(), (1, 2, 0));
    }

    #[test]
    fn invalidate_counts_only_non_empty_clears() {
        let mut cache = ListCache::default();
        cache.invalidate();
        cache.store("topics", &params(1), &ListPage::default());
        cache.invalidate();
        assert!(cache.lookup("topics", &params(1)).is_none());
        assert_eq!(cache.counters().2, 1);
    }

    #[test]
    fn capacity_evicts_oldest_entry() {
        let mut cache = ListCache::default();
        for page in 1..=LIST_CACHE_CAPACITY + 1 {
            cache.store("questions", &params(page), &ListPage::default());
        }
        assert!(cache.lookup("questions", &params(1)).is_none());
        assert!(cache
            .lookup("questions", &params(LIST_CACHE_CAPACITY + 1))
            .is_some());
    }
}
