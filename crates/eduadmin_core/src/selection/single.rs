use super::SelectionChange;
use crate::models::{Record, RecordId};
use crate::options::OptionCache;

/// State of a single-value async dropdown.
#[derive(Debug, Clone, Default)]
pub struct SingleSelect {
    selected: Option<RecordId>,
    open: bool,
    search: String,
    searchable: bool,
    focus_search: bool,
}

impl SingleSelect {
    pub fn new(selected: Option<RecordId>) -> Self {
        Self {
            selected,
            searchable: true,
            ..Self::default()
        }
    }

    pub fn with_searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    pub fn selected(&self) -> Option<&RecordId> {
        self.selected.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_searchable(&self) -> bool {
        self.searchable
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut String {
        &mut self.search
    }

    /// Open the dropdown. With search enabled, the search field is asked to
    /// take focus on the same frame.
    pub fn open(&mut self) {
        if self.open {
            return;
        }
        self.open = true;
        if self.searchable {
            self.focus_search = true;
        }
    }

    pub fn close(&mut self) {
        self.open = false;
        self.focus_search = false;
    }

    pub fn toggle_open(&mut self) {
        if self.open {
            self.close();
        } else {
            self.open();
        }
    }

    /// A click landed outside the control's container.
    pub fn pointer_outside(&mut self) {
        self.close();
    }

    /// Consume the one-shot focus request raised by [`Self::open`].
    pub fn take_focus_request(&mut self) -> bool {
        std::mem::take(&mut self.focus_search)
    }

    /// Choose `record`: store its id, close, clear search.
    pub fn select(&mut self, record: &Record) -> SelectionChange {
        self.selected = Some(record.id.clone());
        self.close();
        self.search.clear();
        SelectionChange::Single(self.selected.clone())
    }

    /// Drop the selection. Does not reopen the dropdown.
    pub fn clear(&mut self) -> SelectionChange {
        self.selected = None;
        SelectionChange::Single(None)
    }

    /// Sync from the owning form without emitting a change.
    pub fn set_selected(&mut self, selected: Option<RecordId>) {
        self.selected = selected;
    }

    /// The loaded record for the current selection, if any.
    pub fn selected_option<'a>(&self, cache: &'a OptionCache) -> Option<&'a Record> {
        self.selected.as_ref().and_then(|id| cache.find(id))
    }

    /// Options to render, narrowed by the current search text.
    pub fn visible_options<'a>(&self, cache: &'a OptionCache) -> Vec<&'a Record> {
        cache.search(&self.search)
    }

    /// Button text: the selected record's display text or `placeholder`.
    pub fn display_label(&self, cache: &OptionCache, placeholder: &str) -> String {
        self.selected_option(cache)
            .and_then(|record| record.display(cache.display_field()))
            .unwrap_or_else(|| placeholder.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionQuery;
    use crate::source::StaticListSource;

    fn loaded_cache(records: Vec<Record>) -> OptionCache {
        let source = StaticListSource::new().with_table("topics", records);
        let mut cache = OptionCache::new(OptionQuery::new("topics")).expect("cache");
        cache.load(&source);
        cache
    }

    #[test]
    fn selected_option_finds_loaded_record() {
        let geometry = Record::new(2u64).with_field("name", "Geometry");
        let cache = loaded_cache(vec![geometry.clone()]);
        let state = SingleSelect::new(Some(RecordId::from(2u64)));

        assert_eq!(state.selected_option(&cache), Some(&geometry));
        assert_eq!(state.display_label(&cache, "Select a topic"), "Geometry");
    }

    #[test]
    fn selected_option_is_none_for_empty_cache() {
        let cache = loaded_cache(Vec::new());
        let state = SingleSelect::new(Some(RecordId::from(2u64)));

        assert!(state.selected_option(&cache).is_none());
        assert_eq!(state.display_label(&cache, "Select a topic"), "Select a topic");
    }

    #[test]
    fn select_closes_clears_search_and_emits_id() {
        let mut state = SingleSelect::new(None);
        state.open();
        state.search_mut().push_str("geo");
        let change = state.select(&Record::new(2u64).with_field("name", "Geometry"));

        assert_eq!(change, SelectionChange::Single(Some(RecordId::from(2u64))));
        assert!(!state.is_open());
        assert!(state.search().is_empty());
    }

    #[test]
    fn clear_does_not_reopen() {
        let mut state = SingleSelect::new(Some(RecordId::from(5u64)));
        assert_eq!(state.clear(), SelectionChange::Single(None));
        assert!(!state.is_open());
        assert!(state.selected().is_none());
    }

    #[test]
    fn opening_with_search_requests_focus_once() {
        let mut state = SingleSelect::new(None);
        state.open();
        assert!(state.take_focus_request());
        assert!(!state.take_focus_request());

        let mut plain = SingleSelect::new(None).with_searchable(false);
        plain.open();
        assert!(!plain.take_focus_request());
    }

    #[test]
    fn outside_click_closes_dropdown() {
        let mut state = SingleSelect::new(None);
        state.toggle_open();
        assert!(state.is_open());
        state.pointer_outside();
        assert!(!state.is_open());
    }

    #[test]
    fn search_narrows_visible_options_only() {
        let cache = loaded_cache(vec![
            Record::new(1u64).with_field("name", "Algebra"),
            Record::new(2u64).with_field("name", "Geometry"),
        ]);
        let mut state = SingleSelect::new(None);
        state.search_mut().push_str("ALG");
        assert_eq!(state.visible_options(&cache).len(), 1);
        assert_eq!(cache.records().len(), 2);
    }
}
