//! Data models for list fetches and selectable records.

/// List request/response shapes.
pub mod query;
/// Records and identity keys.
pub mod record;

mod tests;

pub use query::{Filter, ListPage, ListParams, ListRequest, SortOrder};
pub use record::{Record, RecordId};
