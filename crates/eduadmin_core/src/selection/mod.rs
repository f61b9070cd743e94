//! Selection state for dropdown and modal selectors.
//!
//! Selectors never own the canonical value; they emit [`SelectionChange`]
//! events and the owning form stores the result.

/// Transient toggle buffer for modal selectors.
pub mod buffer;
/// Multi-select state with an optional cap.
pub mod multi;
/// Single-select dropdown state.
pub mod single;

use crate::models::RecordId;

pub use buffer::{merge_committed, SelectionBuffer};
pub use multi::{Chip, MultiSelect};
pub use single::SingleSelect;

/// Value emitted to the owning form after a selection mutation.
///
/// Multi-select always carries the full list, never a delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    Single(Option<RecordId>),
    Multi(Vec<RecordId>),
}
