//! Root crate facade for the EduAdmin selector toolkit.
//!
//! Re-exports the state machines from `eduadmin_core`, the HTTP list source
//! and, with the `gui` feature, the desktop quiz editor.

pub use eduadmin_client::HttpListSource;
pub use eduadmin_core::{
    builder, config, constants, error, models, options, pager, selection, source, AppError,
    Config, Filter, ListPage, ListParams, ListRequest, ListSource, OptionCache, OptionQuery,
    Pager, PagerConfig, PagerQuery, PagerState, Record, RecordId, SortOrder, StaticListSource,
    ViewMode,
};

#[cfg(feature = "gui")]
/// Desktop quiz editor (feature-gated).
pub use eduadmin_gui::{run as run_gui, QuizDraft, QuizEditorApp};
