//! Shared constants used across EduAdmin crates.

/// Default base URL of the content API.
pub const DEFAULT_API_URL: &str = "http://localhost:1337";

/// Default request timeout for list fetches, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Page size used by the incremental pager behind modal selectors.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Upper bound for the single bounded fetch done by dropdown option caches.
pub const DEFAULT_OPTION_LIMIT: usize = 100;

/// Display field used when a selector does not name one.
pub const DEFAULT_DISPLAY_FIELD: &str = "name";

/// Filter key carrying free-text search for list endpoints.
pub const DEFAULT_SEARCH_PARAM: &str = "q";

/// Minimum answer options a question keeps before removal is refused.
pub const DEFAULT_MIN_ANSWER_OPTIONS: usize = 2;
/// Maximum answer options a question accepts.
pub const DEFAULT_MAX_ANSWER_OPTIONS: usize = 26;
