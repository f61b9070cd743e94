//! Modal picker over a paged resource with a commit/cancel buffer.
//!
//! Toggles land in a [`SelectionBuffer`]; nothing reaches the owning form
//! until the user confirms. Records the form already holds are shown as
//! added and cannot be toggled. Search edits are debounced before they
//! reset the pager, and the pager fetches its next page when the sentinel
//! row under the list scrolls into view.
//!
//! The sentinel is edge-triggered. A page that loads re-arms it, so a row
//! still on screen keeps paging. A page that fails leaves it disarmed until
//! the row leaves the viewport and comes back.

use super::{send_or_fail, FetchBridge, FetchDriven};
use crate::backend::WidgetId;
use eduadmin_core::selection::SelectionBuffer;
use eduadmin_core::{
    AppError, Filter, ListPage, Pager, PagerConfig, PagerQuery, Record, RecordId, ViewMode,
};
use eframe::egui;
use std::time::{Duration, Instant};
use tracing::debug;

/// Quiet period after the last search keystroke before refetching.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(150);

const LIST_MAX_HEIGHT: f32 = 320.0;

/// How a modal session ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ModalOutcome {
    Committed(Vec<Record>),
    Cancelled,
}

pub struct RecordSelectorModal {
    id: WidgetId,
    title: String,
    display_field: String,
    pager: Pager,
    buffer: SelectionBuffer,
    already_added: Vec<Record>,
    max: Option<usize>,
    open: bool,
    base_filter: Filter,
    owner: Option<(String, RecordId)>,
    mine_only: bool,
    search: String,
    search_edited_at: Option<Instant>,
    wants_page: bool,
    sentinel_in_view: bool,
}

impl RecordSelectorModal {
    /// # Errors
    /// Propagates [`Pager::new`] validation failures.
    pub fn new(
        id: WidgetId,
        title: impl Into<String>,
        config: PagerConfig,
        display_field: impl Into<String>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            id,
            title: title.into(),
            display_field: display_field.into(),
            pager: Pager::new(config)?,
            buffer: SelectionBuffer::default(),
            already_added: Vec::new(),
            max: None,
            open: false,
            base_filter: Filter::new(),
            owner: None,
            mine_only: false,
            search: String::new(),
            search_edited_at: None,
            wants_page: false,
            sentinel_in_view: false,
        })
    }

    pub fn with_max(mut self, max: usize) -> Self {
        self.max = Some(max);
        self
    }

    /// Enable the "only mine" view, constraining `owner_field` to `owner_id`.
    pub fn with_owner(mut self, owner_field: impl Into<String>, owner_id: RecordId) -> Self {
        self.owner = Some((owner_field.into(), owner_id));
        self
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn buffer(&self) -> &SelectionBuffer {
        &self.buffer
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn mine_only(&self) -> bool {
        self.mine_only
    }

    pub fn is_already_added(&self, record: &Record) -> bool {
        self.already_added
            .iter()
            .any(|held| held.shares_identity(record))
    }

    /// Start a session with an empty buffer and restart paging under
    /// `filter`. `already_added` rows render as added and refuse toggles.
    pub fn open(&mut self, already_added: &[Record], filter: Filter) {
        self.buffer = SelectionBuffer::new(Vec::new(), self.max);
        self.already_added = already_added.to_vec();
        self.base_filter = filter;
        self.search.clear();
        self.search_edited_at = None;
        self.pager.reset(self.current_query());
        self.open = true;
        self.wants_page = true;
        self.sentinel_in_view = false;
    }

    /// Record a search edit; the pager resets once the edit settles.
    pub fn set_search(&mut self, text: impl Into<String>, now: Instant) {
        self.search = text.into();
        self.search_edited_at = Some(now);
    }

    /// Apply a settled search edit.
    ///
    /// # Returns
    /// `true` when the pager was reset for a new query.
    pub fn settle_search(&mut self, now: Instant) -> bool {
        let Some(edited_at) = self.search_edited_at else {
            return false;
        };
        if now.duration_since(edited_at) < SEARCH_DEBOUNCE {
            return false;
        }
        self.search_edited_at = None;
        self.apply_query()
    }

    /// Switch between all records and the owner's own. Ignored without an
    /// owner.
    pub fn set_mine_only(&mut self, mine_only: bool) {
        if self.owner.is_none() || self.mine_only == mine_only {
            return;
        }
        self.mine_only = mine_only;
        self.search_edited_at = None;
        self.apply_query();
    }

    /// Report whether the sentinel row is on screen this frame. Only the
    /// transition into view asks for a page.
    ///
    /// # Returns
    /// `true` when a page was requested.
    pub fn sentinel_visible(&mut self, visible: bool) -> bool {
        let entered = visible && !self.sentinel_in_view;
        self.sentinel_in_view = visible;
        if entered && !self.pager.is_exhausted() && !self.pager.is_fetching() {
            self.wants_page = true;
            return true;
        }
        false
    }

    /// # Returns
    /// `false` when the add was refused at the cap or the record is
    /// already in the form.
    pub fn toggle(&mut self, record: &Record) -> bool {
        if self.is_already_added(record) {
            return false;
        }
        self.buffer.toggle(record)
    }

    /// Hand the buffered records to the caller and close.
    pub fn confirm(&mut self) -> ModalOutcome {
        self.open = false;
        self.search_edited_at = None;
        self.already_added.clear();
        ModalOutcome::Committed(self.buffer.commit())
    }

    /// Discard the buffer and close.
    pub fn cancel(&mut self) -> ModalOutcome {
        self.open = false;
        self.search_edited_at = None;
        self.buffer.cancel();
        self.already_added.clear();
        ModalOutcome::Cancelled
    }

    fn current_query(&self) -> PagerQuery {
        let view_mode = match (&self.owner, self.mine_only) {
            (Some((owner_field, owner_id)), true) => ViewMode::Mine {
                owner_field: owner_field.clone(),
                owner_id: owner_id.clone(),
            },
            _ => ViewMode::All,
        };
        PagerQuery {
            filter: self.base_filter.clone(),
            search: self.search.clone(),
            view_mode,
        }
    }

    fn apply_query(&mut self) -> bool {
        let reset = self.pager.set_query(self.current_query());
        if reset {
            debug!(
                resource = self.pager.config().resource.as_str(),
                search = self.search.as_str(),
                mine_only = self.mine_only,
                "selector query changed"
            );
            self.wants_page = true;
            self.sentinel_in_view = false;
        }
        reset
    }

    /// Draw the modal while open.
    ///
    /// # Returns
    /// The outcome on the frame the user confirmed, cancelled or closed it.
    pub fn show(&mut self, ctx: &egui::Context) -> Option<ModalOutcome> {
        if !self.open {
            return None;
        }
        let mut outcome = None;
        let mut window_open = true;
        let title = self.title.clone();
        egui::Window::new(title)
            .id(egui::Id::new(("record-selector", self.id)))
            .collapsible(false)
            .resizable(true)
            .default_width(420.0)
            .open(&mut window_open)
            .show(ctx, |ui| {
                outcome = self.show_contents(ui);
            });
        if !window_open && outcome.is_none() {
            outcome = Some(self.cancel());
        }
        if self.search_edited_at.is_some() {
            ctx.request_repaint_after(SEARCH_DEBOUNCE);
        }
        outcome
    }

    fn show_contents(&mut self, ui: &mut egui::Ui) -> Option<ModalOutcome> {
        ui.horizontal(|ui| {
            let mut search = self.search.clone();
            let response = ui.add(
                egui::TextEdit::singleline(&mut search)
                    .id_salt(("record-selector-search", self.id))
                    .hint_text("Search..."),
            );
            if response.changed() {
                self.set_search(search, Instant::now());
            }
            if self.owner.is_some() {
                let mut mine = self.mine_only;
                if ui.checkbox(&mut mine, "Only mine").changed() {
                    self.set_mine_only(mine);
                }
            }
        });
        let counter = match self.max {
            Some(max) => format!("{} / {} selected", self.buffer.len(), max),
            None => format!("{} selected", self.buffer.len()),
        };
        ui.weak(counter);
        ui.separator();

        let mut toggled = None;
        let mut sentinel_seen = None;
        egui::ScrollArea::vertical()
            .id_salt(("record-selector-list", self.id))
            .max_height(LIST_MAX_HEIGHT)
            .show(ui, |ui| {
                let full = self.buffer.is_full();
                for record in self.pager.items() {
                    let label = record.display_or_id(&self.display_field);
                    if self.is_already_added(record) {
                        let mut added = true;
                        ui.add_enabled(
                            false,
                            egui::Checkbox::new(&mut added, format!("{label} (added)")),
                        );
                        continue;
                    }
                    let mut checked = self.buffer.contains(record);
                    let response = ui.add_enabled(
                        checked || !full,
                        egui::Checkbox::new(&mut checked, label),
                    );
                    if response.changed() {
                        toggled = Some(record.clone());
                    }
                }
                if self.pager.is_exhausted() {
                    if self.pager.items().is_empty() {
                        ui.weak("No results");
                    }
                } else if self.pager.is_fetching() {
                    ui.horizontal(|ui| {
                        ui.add(egui::Spinner::new());
                        ui.weak("Loading...");
                    });
                } else {
                    let sentinel = ui.weak("Load more");
                    sentinel_seen = Some(ui.is_rect_visible(sentinel.rect));
                }
            });
        if let Some(record) = toggled {
            self.toggle(&record);
        }
        if let Some(visible) = sentinel_seen {
            self.sentinel_visible(visible);
        }

        ui.separator();
        let mut outcome = None;
        ui.horizontal(|ui| {
            if ui.button("Cancel").clicked() {
                outcome = Some(self.cancel());
            }
            let confirm = format!("Add ({})", self.buffer.len());
            if ui.button(confirm).clicked() {
                outcome = Some(self.confirm());
            }
        });
        outcome
    }
}

impl FetchDriven for RecordSelectorModal {
    fn widget_id(&self) -> WidgetId {
        self.id
    }

    fn pump(&mut self, bridge: &FetchBridge) {
        if !self.open {
            return;
        }
        self.settle_search(Instant::now());
        if !std::mem::take(&mut self.wants_page) {
            return;
        }
        if let Some(request) = self.pager.request_next() {
            send_or_fail(self, bridge, request.generation, request.request);
        }
    }

    fn apply(&mut self, generation: u64, result: Result<ListPage, AppError>) -> bool {
        let retryable = result.as_ref().err().map(AppError::is_retryable);
        let accepted = self.pager.finish(generation, result);
        if accepted {
            match retryable {
                None => self.sentinel_in_view = false,
                Some(retryable) => debug!(
                    resource = self.pager.config().resource.as_str(),
                    retryable,
                    "page failed; waiting for the sentinel to re-enter view"
                ),
            }
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eduadmin_core::{PagerState, SortOrder};

    fn modal() -> RecordSelectorModal {
        RecordSelectorModal::new(
            WidgetId(3),
            "Add questions",
            PagerConfig::new("questions")
                .with_per_page(2)
                .with_sort("id", SortOrder::Desc),
            "title",
        )
        .expect("modal")
        .with_owner("author", RecordId::from(42u64))
    }

    fn question(id: u64) -> Record {
        Record::new(id).with_field("title", format!("Question {id}"))
    }

    fn start_fetch(modal: &mut RecordSelectorModal) -> u64 {
        assert!(std::mem::take(&mut modal.wants_page));
        modal.pager.request_next().expect("request").generation
    }

    #[test]
    fn open_starts_empty_and_requests_first_page() {
        let mut modal = modal().with_max(3);
        modal.open(&[question(1)], Filter::new().with("topic", 4));
        assert!(modal.is_open());
        assert!(modal.buffer().is_empty());
        assert!(modal.is_already_added(&question(1)));
        assert!(modal.wants_page);

        let request = modal.pager.request_next().expect("first page");
        assert_eq!(request.request.params.page, 1);
        assert_eq!(request.request.params.filter.get("topic"), Some(&4.into()));
    }

    #[test]
    fn confirm_commits_buffer_and_closes() {
        let mut modal = modal();
        modal.open(&[], Filter::new());
        assert!(modal.toggle(&question(5)));
        assert!(modal.toggle(&question(6)));
        assert!(modal.toggle(&question(5)));

        match modal.confirm() {
            ModalOutcome::Committed(records) => {
                assert_eq!(records, vec![question(6)]);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!modal.is_open());
        assert!(modal.buffer().is_empty());
    }

    #[test]
    fn cancel_discards_buffer() {
        let mut modal = modal();
        modal.open(&[question(1)], Filter::new());
        modal.toggle(&question(2));
        assert_eq!(modal.cancel(), ModalOutcome::Cancelled);
        assert!(modal.buffer().is_empty());
        assert!(!modal.is_open());
    }

    #[test]
    fn cap_refuses_extra_toggles() {
        let mut modal = modal().with_max(1);
        modal.open(&[], Filter::new());
        assert!(modal.toggle(&question(1)));
        assert!(!modal.toggle(&question(2)));
        assert_eq!(modal.buffer().len(), 1);
    }

    #[test]
    fn already_added_records_refuse_toggles() {
        let mut modal = modal();
        let existing = Record::new(7u64).with_document_id("q-7");
        modal.open(&[existing], Filter::new());
        assert!(!modal.toggle(&Record::new("q-7")));
        assert!(modal.toggle(&question(8)));

        match modal.confirm() {
            ModalOutcome::Committed(records) => assert_eq!(records, vec![question(8)]),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!modal.is_already_added(&Record::new(7u64)));
    }

    #[test]
    fn search_waits_for_debounce_then_resets_pager() {
        let mut modal = modal();
        modal.open(&[], Filter::new());
        let generation = start_fetch(&mut modal);
        modal.apply(generation, Ok(ListPage::new(vec![question(1), question(2)])));
        assert_eq!(modal.pager().items().len(), 2);

        let typed_at = Instant::now();
        modal.set_search("fraction", typed_at);
        assert!(!modal.settle_search(typed_at + Duration::from_millis(50)));
        assert_eq!(modal.pager().items().len(), 2);

        assert!(modal.settle_search(typed_at + SEARCH_DEBOUNCE));
        assert!(modal.pager().items().is_empty());
        assert!(modal.wants_page);
        let request = modal.pager.request_next().expect("search page");
        assert_eq!(
            request.request.params.filter.get("q"),
            Some(&"fraction".into())
        );
        assert!(!modal.apply(generation, Ok(ListPage::new(vec![question(9)]))));
    }

    #[test]
    fn mine_only_adds_owner_constraint() {
        let mut modal = modal();
        modal.open(&[], Filter::new());
        let _ = start_fetch(&mut modal);
        modal.set_mine_only(true);
        assert!(modal.mine_only());
        let request = modal.pager.request_next().expect("mine page");
        assert_eq!(request.request.params.filter.get("author"), Some(&42.into()));
    }

    #[test]
    fn sentinel_requests_pages_until_exhausted() {
        let mut modal = modal();
        modal.open(&[], Filter::new());
        let first = start_fetch(&mut modal);
        modal.apply(first, Ok(ListPage::new(vec![question(4), question(3)])));
        assert_eq!(modal.pager().state(), PagerState::Idle);

        assert!(modal.sentinel_visible(true));
        let second = start_fetch(&mut modal);
        modal.apply(second, Ok(ListPage::new(vec![question(2)])));
        assert!(modal.pager().is_exhausted());

        assert!(!modal.sentinel_visible(true));
        assert!(!modal.wants_page);
        assert_eq!(modal.pager().items().len(), 3);
    }

    #[test]
    fn sentinel_staying_in_view_asks_once() {
        let mut modal = modal();
        modal.open(&[], Filter::new());
        let first = start_fetch(&mut modal);
        modal.apply(first, Ok(ListPage::new(vec![question(6), question(5)])));

        assert!(modal.sentinel_visible(true));
        assert!(!modal.sentinel_visible(true));
        assert!(!modal.sentinel_visible(true));
    }

    #[test]
    fn loaded_page_rearms_a_sentinel_still_in_view() {
        let mut modal = modal();
        modal.open(&[], Filter::new());
        let first = start_fetch(&mut modal);
        modal.apply(first, Ok(ListPage::new(vec![question(6), question(5)])));
        assert!(modal.sentinel_visible(true));
        let second = start_fetch(&mut modal);
        modal.apply(second, Ok(ListPage::new(vec![question(4), question(3)])));

        assert!(modal.sentinel_visible(true));
        let request = modal.pager.request_next().expect("page 3");
        assert_eq!(request.request.params.page, 3);
    }

    #[test]
    fn failed_page_waits_for_sentinel_to_reenter_view() {
        let mut modal = modal();
        modal.open(&[], Filter::new());
        let first = start_fetch(&mut modal);
        modal.apply(first, Ok(ListPage::new(vec![question(4), question(3)])));

        assert!(modal.sentinel_visible(true));
        let second = start_fetch(&mut modal);
        modal.apply(second, Err(AppError::Transport("timeout".to_string())));
        assert_eq!(modal.pager().items().len(), 2);
        assert_eq!(modal.pager().state(), PagerState::Idle);

        for _ in 0..20 {
            assert!(!modal.sentinel_visible(true));
        }
        assert!(!modal.wants_page);

        assert!(!modal.sentinel_visible(false));
        assert!(modal.sentinel_visible(true));
        assert!(std::mem::take(&mut modal.wants_page));
        let retry = modal.pager.request_next().expect("retry");
        assert_eq!(retry.request.params.page, 2);
    }
}
