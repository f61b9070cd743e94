use super::SelectionChange;
use crate::models::{Record, RecordId};
use crate::options::OptionCache;

/// A removable token for one selected value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip {
    pub id: RecordId,
    /// `None` when the record is not among the loaded options.
    pub label: Option<String>,
}

impl Chip {
    pub fn text(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| format!("#{}", self.id))
    }
}

/// State of a multi-value async dropdown.
///
/// Stored identifiers are identity keys (`documentId` when present, else
/// `id`). Adding past `max_select` is refused silently; removal always works.
#[derive(Debug, Clone, Default)]
pub struct MultiSelect {
    selected: Vec<RecordId>,
    max_select: Option<usize>,
    open: bool,
    search: String,
}

impl MultiSelect {
    pub fn new(selected: Vec<RecordId>, max_select: Option<usize>) -> Self {
        let mut state = Self {
            max_select,
            ..Self::default()
        };
        state.set_selected(selected);
        state
    }

    pub fn selected(&self) -> &[RecordId] {
        &self.selected
    }

    pub fn max_select(&self) -> Option<usize> {
        self.max_select
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle_open(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut String {
        &mut self.search
    }

    pub fn is_full(&self) -> bool {
        self.max_select
            .is_some_and(|max| self.selected.len() >= max)
    }

    pub fn is_selected(&self, record: &Record) -> bool {
        self.selected.iter().any(|id| record.matches(id))
    }

    /// Remove `record` when selected, otherwise append it if below the cap.
    ///
    /// # Returns
    /// The full updated list, or `None` when the add was refused at the cap.
    pub fn toggle(&mut self, record: &Record) -> Option<SelectionChange> {
        if self.is_selected(record) {
            self.selected.retain(|id| !record.matches(id));
            return Some(self.change());
        }
        if self.is_full() {
            return None;
        }
        self.selected.push(record.identity_key().clone());
        Some(self.change())
    }

    /// Remove one identifier regardless of the cap.
    ///
    /// # Returns
    /// `None` when `id` was not selected.
    pub fn remove(&mut self, id: &RecordId) -> Option<SelectionChange> {
        let before = self.selected.len();
        self.selected.retain(|existing| existing != id);
        (self.selected.len() != before).then(|| self.change())
    }

    /// # Returns
    /// `None` when nothing was selected.
    pub fn clear_all(&mut self) -> Option<SelectionChange> {
        if self.selected.is_empty() {
            return None;
        }
        self.selected.clear();
        Some(self.change())
    }

    /// Sync from the owning form without emitting a change. Duplicates are
    /// dropped and the list is truncated to the cap.
    pub fn set_selected(&mut self, selected: Vec<RecordId>) {
        self.selected.clear();
        for id in selected {
            if self.is_full() {
                break;
            }
            if !self.selected.contains(&id) {
                self.selected.push(id);
            }
        }
    }

    /// One chip per selected id, labelled from the loaded options when
    /// possible.
    pub fn chips(&self, cache: &OptionCache) -> Vec<Chip> {
        self.selected
            .iter()
            .map(|id| Chip {
                id: id.clone(),
                label: cache
                    .find(id)
                    .and_then(|record| record.display(cache.display_field())),
            })
            .collect()
    }

    /// `"n selected"`, or `"n / max"` when capped.
    pub fn counter_label(&self) -> String {
        match self.max_select {
            Some(max) => format!("{} / {}", self.selected.len(), max),
            None => format!("{} selected", self.selected.len()),
        }
    }

    fn change(&self) -> SelectionChange {
        SelectionChange::Multi(self.selected.clone())
    }
}
