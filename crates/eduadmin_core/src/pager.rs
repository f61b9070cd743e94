//! Incremental pager behind infinite-scroll modal selectors.
//!
//! ```text
//!   reset ──► Idle ──request_next / sentinel──► Fetching
//!              ▲                                  │
//!              └── full page, or fetch failed ◄───┤
//!                                                 └── short page / hasMore=false ──► Exhausted
//! ```
//!
//! Only one fetch runs at a time, so page N is always appended before page
//! N+1 is requested. A query change bumps the generation; responses that
//! arrive for an older generation are dropped instead of merged.

use crate::constants::{DEFAULT_PAGE_SIZE, DEFAULT_SEARCH_PARAM};
use crate::error::AppError;
use crate::models::{Filter, ListPage, ListParams, ListRequest, Record, RecordId, SortOrder};
use tracing::{debug, warn};

/// Pager lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerState {
    Idle,
    Fetching,
    /// No more pages for the current query; only [`Pager::reset`] leaves it.
    Exhausted,
}

/// "All records" versus "records I own".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    All,
    Mine {
        owner_field: String,
        owner_id: RecordId,
    },
}

/// The user-controlled part of a paged query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagerQuery {
    pub filter: Filter,
    pub search: String,
    pub view_mode: ViewMode,
}

impl PagerQuery {
    /// Fold search text and view mode into the outgoing filter.
    pub fn effective_filter(&self, search_param: &str) -> Filter {
        let mut filter = self.filter.clone();
        let search = self.search.trim();
        if !search.is_empty() {
            filter.insert(search_param, search);
        }
        if let ViewMode::Mine {
            owner_field,
            owner_id,
        } = &self.view_mode
        {
            filter.insert(owner_field, owner_id.to_json());
        }
        filter
    }
}

/// Fixed settings of a pager instance.
#[derive(Debug, Clone, PartialEq)]
pub struct PagerConfig {
    pub resource: String,
    pub per_page: usize,
    pub sort_field: String,
    pub sort_order: SortOrder,
    pub search_param: String,
}

impl PagerConfig {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            per_page: DEFAULT_PAGE_SIZE,
            sort_field: "id".to_string(),
            sort_order: SortOrder::Desc,
            search_param: DEFAULT_SEARCH_PARAM.to_string(),
        }
    }

    pub fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_field = field.into();
        self.sort_order = order;
        self
    }
}

/// A page fetch handed to the driver. Echo `generation` to [`Pager::finish`].
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub generation: u64,
    pub request: ListRequest,
}

/// Accumulates pages for one query.
#[derive(Debug, Clone)]
pub struct Pager {
    config: PagerConfig,
    query: PagerQuery,
    items: Vec<Record>,
    next_page: usize,
    state: PagerState,
    generation: u64,
    total: Option<u64>,
}

impl Pager {
    /// # Errors
    /// Returns [`AppError::BadRequest`] for a blank resource or zero page size.
    pub fn new(config: PagerConfig) -> Result<Self, AppError> {
        if config.resource.trim().is_empty() {
            return Err(AppError::BadRequest("resource must not be empty".to_string()));
        }
        if config.per_page == 0 {
            return Err(AppError::BadRequest("page size must be positive".to_string()));
        }
        Ok(Self {
            config,
            query: PagerQuery::default(),
            items: Vec::new(),
            next_page: 1,
            state: PagerState::Idle,
            generation: 0,
            total: None,
        })
    }

    pub fn config(&self) -> &PagerConfig {
        &self.config
    }

    pub fn query(&self) -> &PagerQuery {
        &self.query
    }

    pub fn items(&self) -> &[Record] {
        &self.items
    }

    pub fn state(&self) -> PagerState {
        self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == PagerState::Exhausted
    }

    pub fn is_fetching(&self) -> bool {
        self.state == PagerState::Fetching
    }

    /// 1-based number of the page the next request will ask for.
    pub fn next_page(&self) -> usize {
        self.next_page
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Drop accumulated results and restart from page 1 with `query`.
    pub fn reset(&mut self, query: PagerQuery) {
        self.generation = self.generation.wrapping_add(1);
        self.query = query;
        self.items.clear();
        self.next_page = 1;
        self.total = None;
        self.state = PagerState::Idle;
    }

    /// Reset only when `query` differs by value from the current one.
    ///
    /// # Returns
    /// `true` when the pager was reset.
    pub fn set_query(&mut self, query: PagerQuery) -> bool {
        if query == self.query {
            return false;
        }
        self.reset(query);
        true
    }

    /// Start the next page fetch if the state machine allows one.
    ///
    /// # Returns
    /// `None` while a fetch is in flight or once exhausted.
    pub fn request_next(&mut self) -> Option<PageRequest> {
        if self.state != PagerState::Idle {
            return None;
        }
        self.state = PagerState::Fetching;
        Some(PageRequest {
            generation: self.generation,
            request: ListRequest {
                resource: self.config.resource.clone(),
                params: ListParams {
                    page: self.next_page,
                    per_page: self.config.per_page,
                    sort_field: self.config.sort_field.clone(),
                    sort_order: self.config.sort_order,
                    filter: self.query.effective_filter(&self.config.search_param),
                },
            },
        })
    }

    /// The scroll sentinel became visible.
    pub fn sentinel_visible(&mut self) -> Option<PageRequest> {
        self.request_next()
    }

    /// Apply the outcome of a fetch started by [`Self::request_next`].
    ///
    /// A short page or an explicit `hasMore: false` exhausts the pager.
    /// Reaching `total` does too, unless the backend says `hasMore: true`. Failures
    /// keep accumulated results and return to `Idle` so the next sentinel
    /// hit retries the same page.
    ///
    /// # Returns
    /// `false` when the response belonged to a superseded query.
    pub fn finish(&mut self, generation: u64, result: Result<ListPage, AppError>) -> bool {
        if generation != self.generation || self.state != PagerState::Fetching {
            debug!(
                resource = self.config.resource.as_str(),
                generation,
                current = self.generation,
                "dropping stale page response"
            );
            return false;
        }
        match result {
            Ok(page) => {
                let received = page.data.len();
                self.items.extend(page.data);
                self.next_page += 1;
                self.total = page.total.or(self.total);
                let reached_total = self
                    .total
                    .is_some_and(|total| self.items.len() as u64 >= total);
                let exhausted = received < self.config.per_page
                    || page.has_more == Some(false)
                    || (page.has_more.is_none() && reached_total);
                self.state = if exhausted {
                    PagerState::Exhausted
                } else {
                    PagerState::Idle
                };
            }
            Err(err) => {
                warn!(
                    resource = self.config.resource.as_str(),
                    page = self.next_page,
                    "page fetch failed: {}",
                    err
                );
                self.state = PagerState::Idle;
            }
        }
        true
    }
}
