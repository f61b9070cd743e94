//! Core library for EduAdmin selectors: models, option caches, selection
//! state, the incremental pager and the answer-option builder.
//!
//! Nothing here performs I/O on its own. State machines hand out requests
//! and accept results, so the GUI can run fetches on a worker thread while
//! the CLI and tests drive them synchronously through a [`ListSource`].

/// Answer-option builder for question editing.
pub mod builder;
/// Configuration loading and defaults.
pub mod config;
/// Shared defaults.
pub mod constants;
/// Environment helpers used by tests.
pub mod env;
/// Application error types.
pub mod error;
/// Records, identifiers and list request shapes.
pub mod models;
/// Remote option cache for dropdown selectors.
pub mod options;
/// Incremental pager for infinite-scroll selectors.
pub mod pager;
/// Single, multi and modal selection state.
pub mod selection;
/// List-fetch collaborator trait and in-memory implementation.
pub mod source;

pub use config::Config;
pub use constants::{DEFAULT_API_URL, DEFAULT_OPTION_LIMIT, DEFAULT_PAGE_SIZE};
pub use error::AppError;
pub use models::{Filter, ListPage, ListParams, ListRequest, Record, RecordId, SortOrder};
pub use options::{merge_initial, OptionCache, OptionQuery};
pub use pager::{Pager, PagerConfig, PagerQuery, PagerState, ViewMode};
pub use source::{ListSource, StaticListSource};
