//! Capped multi-choice dropdown rendering selections as removable chips.

use super::{clicked_outside, send_or_fail, FetchBridge, FetchDriven, OPTIONS_MAX_HEIGHT};
use crate::backend::WidgetId;
use eduadmin_core::selection::{Chip, MultiSelect, SelectionChange};
use eduadmin_core::{AppError, ListPage, OptionCache, OptionQuery, Record, RecordId};
use eframe::egui;

enum MultiAction {
    Toggle(Record),
    Remove(RecordId),
    ClearAll,
}

pub struct AsyncMultiSelect {
    id: WidgetId,
    label: String,
    placeholder: String,
    cache: OptionCache,
    state: MultiSelect,
}

impl AsyncMultiSelect {
    /// # Errors
    /// Propagates [`OptionQuery::validate`] failures.
    pub fn new(
        id: WidgetId,
        label: impl Into<String>,
        query: OptionQuery,
        selected: Vec<RecordId>,
        max_select: Option<usize>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            id,
            label: label.into(),
            placeholder: "Select...".to_string(),
            cache: OptionCache::new(query)?,
            state: MultiSelect::new(selected, max_select),
        })
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn cache(&self) -> &OptionCache {
        &self.cache
    }

    pub fn state(&self) -> &MultiSelect {
        &self.state
    }

    pub fn selected(&self) -> &[RecordId] {
        self.state.selected()
    }

    pub fn chips(&self) -> Vec<Chip> {
        self.state.chips(&self.cache)
    }

    pub fn set_selected(&mut self, selected: Vec<RecordId>) {
        self.state.set_selected(selected);
    }

    /// # Errors
    /// Propagates [`OptionCache::set_query`] validation failures.
    pub fn set_query(&mut self, query: OptionQuery) -> Result<bool, AppError> {
        self.cache.set_query(query)
    }

    pub fn toggle(&mut self, record: &Record) -> Option<SelectionChange> {
        self.state.toggle(record)
    }

    pub fn remove(&mut self, id: &RecordId) -> Option<SelectionChange> {
        self.state.remove(id)
    }

    pub fn clear_all(&mut self) -> Option<SelectionChange> {
        self.state.clear_all()
    }

    /// Draw the widget.
    ///
    /// # Returns
    /// The full selection after any user mutation this frame.
    pub fn show(&mut self, ui: &mut egui::Ui) -> Option<SelectionChange> {
        let loading = self.cache.is_initial_loading();
        let mut action = None;
        ui.horizontal(|ui| {
            if !self.label.is_empty() {
                ui.label(self.label.as_str());
            }
            ui.weak(self.state.counter_label());
        });

        let chips = self.chips();
        let header = ui.horizontal_wrapped(|ui| {
            if chips.is_empty() {
                ui.weak(self.placeholder.as_str());
            }
            for chip in &chips {
                if ui
                    .small_button(format!("{}  x", chip.text()))
                    .on_hover_text("Remove")
                    .clicked()
                {
                    action = Some(MultiAction::Remove(chip.id.clone()));
                }
            }
            if loading {
                ui.add(egui::Spinner::new());
            }
            let toggle_text = if self.state.is_open() { "Done" } else { "Add..." };
            let toggled = ui
                .add_enabled(!loading, egui::Button::new(toggle_text))
                .clicked();
            if !chips.is_empty() && ui.small_button("Clear all").clicked() {
                action = Some(MultiAction::ClearAll);
            }
            toggled
        });
        if header.inner {
            self.state.toggle_open();
        }

        let mut area = header.response.rect;
        if self.state.is_open() {
            let popup = egui::Frame::popup(ui.style()).show(ui, |ui| self.show_options(ui));
            area = area.union(popup.response.rect);
            if let Some(record) = popup.inner {
                action = Some(MultiAction::Toggle(record));
            }
        }
        if self.state.is_open() && clicked_outside(ui, area) {
            self.state.close();
        }

        match action? {
            MultiAction::Toggle(record) => self.toggle(&record),
            MultiAction::Remove(id) => self.remove(&id),
            MultiAction::ClearAll => self.clear_all(),
        }
    }

    fn show_options(&mut self, ui: &mut egui::Ui) -> Option<Record> {
        ui.add(
            egui::TextEdit::singleline(self.state.search_mut())
                .id_salt(("multi-select-search", self.id))
                .hint_text("Search..."),
        );
        let visible = self.cache.search(self.state.search());
        if visible.is_empty() {
            ui.weak("No options");
            return None;
        }
        let full = self.state.is_full();
        let field = self.cache.display_field();
        let mut toggled = None;
        egui::ScrollArea::vertical()
            .id_salt(("multi-select-options", self.id))
            .max_height(OPTIONS_MAX_HEIGHT)
            .show(ui, |ui| {
                for record in visible {
                    let mut checked = self.state.is_selected(record);
                    let enabled = checked || !full;
                    let response = ui.add_enabled(
                        enabled,
                        egui::Checkbox::new(&mut checked, record.display_or_id(field)),
                    );
                    if response.changed() {
                        toggled = Some(record.clone());
                    }
                }
            });
        toggled
    }
}

impl FetchDriven for AsyncMultiSelect {
    fn widget_id(&self) -> WidgetId {
        self.id
    }

    fn pump(&mut self, bridge: &FetchBridge) {
        if !self.cache.needs_load() {
            return;
        }
        let pending = self.cache.begin_load();
        send_or_fail(self, bridge, pending.generation, pending.request);
    }

    fn apply(&mut self, generation: u64, result: Result<ListPage, AppError>) -> bool {
        self.cache.finish_load(generation, result)
    }
}
