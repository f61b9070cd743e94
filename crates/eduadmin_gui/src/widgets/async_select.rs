//! Single-choice dropdown over a remote option list.

use super::{clicked_outside, send_or_fail, FetchBridge, FetchDriven, OPTIONS_MAX_HEIGHT};
use crate::backend::WidgetId;
use eduadmin_core::selection::{SelectionChange, SingleSelect};
use eduadmin_core::{AppError, ListPage, OptionCache, OptionQuery, Record, RecordId};
use eframe::egui;

pub struct AsyncSelect {
    id: WidgetId,
    label: String,
    placeholder: String,
    cache: OptionCache,
    state: SingleSelect,
}

impl AsyncSelect {
    /// # Errors
    /// Propagates [`OptionQuery::validate`] failures.
    pub fn new(
        id: WidgetId,
        label: impl Into<String>,
        query: OptionQuery,
        selected: Option<RecordId>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            id,
            label: label.into(),
            placeholder: "Select...".to_string(),
            cache: OptionCache::new(query)?,
            state: SingleSelect::new(selected),
        })
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_searchable(mut self, searchable: bool) -> Self {
        self.state = self.state.with_searchable(searchable);
        self
    }

    pub fn cache(&self) -> &OptionCache {
        &self.cache
    }

    pub fn state(&self) -> &SingleSelect {
        &self.state
    }

    pub fn selected(&self) -> Option<&RecordId> {
        self.state.selected()
    }

    pub fn selected_record(&self) -> Option<&Record> {
        self.state.selected_option(&self.cache)
    }

    /// Sync from the owning form.
    pub fn set_selected(&mut self, selected: Option<RecordId>) {
        self.state.set_selected(selected);
    }

    /// # Returns
    /// `true` when the new query forces a refetch.
    ///
    /// # Errors
    /// Propagates [`OptionCache::set_query`] validation failures.
    pub fn set_query(&mut self, query: OptionQuery) -> Result<bool, AppError> {
        self.cache.set_query(query)
    }

    pub fn choose(&mut self, record: &Record) -> SelectionChange {
        self.state.select(record)
    }

    pub fn clear(&mut self) -> SelectionChange {
        self.state.clear()
    }

    pub fn button_text(&self) -> String {
        if self.cache.is_initial_loading() {
            return "Loading...".to_string();
        }
        self.state.display_label(&self.cache, &self.placeholder)
    }

    /// Draw the widget.
    ///
    /// # Returns
    /// A change for the owning form when the user picked or cleared a value.
    pub fn show(&mut self, ui: &mut egui::Ui) -> Option<SelectionChange> {
        let mut change = None;
        let loading = self.cache.is_initial_loading();
        if !self.label.is_empty() {
            ui.label(self.label.as_str());
        }
        let button_text = self.button_text();
        let has_value = self.state.selected().is_some();
        let header = ui.horizontal(|ui| {
            let button = ui.add_enabled(!loading, egui::Button::new(button_text));
            if loading {
                ui.add(egui::Spinner::new());
            }
            let cleared = has_value && ui.small_button("Clear").clicked();
            (button.clicked(), cleared)
        });
        let (toggled, cleared) = header.inner;
        if toggled {
            self.state.toggle_open();
        }
        if cleared {
            change = Some(self.clear());
        }

        let mut area = header.response.rect;
        if self.state.is_open() {
            let popup = egui::Frame::popup(ui.style()).show(ui, |ui| self.show_options(ui));
            area = area.union(popup.response.rect);
            if let Some(record) = popup.inner {
                change = Some(self.choose(&record));
            }
        }
        if self.state.is_open() && clicked_outside(ui, area) {
            self.state.pointer_outside();
        }
        change
    }

    fn show_options(&mut self, ui: &mut egui::Ui) -> Option<Record> {
        if self.state.is_searchable() {
            let search = ui.add(
                egui::TextEdit::singleline(self.state.search_mut())
                    .id_salt(("async-select-search", self.id))
                    .hint_text("Search..."),
            );
            if self.state.take_focus_request() {
                search.request_focus();
            }
        }

        let visible = self.state.visible_options(&self.cache);
        if visible.is_empty() {
            ui.weak(if self.cache.is_loading() {
                "Loading..."
            } else {
                "No options"
            });
            return None;
        }
        let selected = self.state.selected();
        let field = self.cache.display_field();
        let mut chosen = None;
        egui::ScrollArea::vertical()
            .id_salt(("async-select-options", self.id))
            .max_height(OPTIONS_MAX_HEIGHT)
            .show(ui, |ui| {
                for record in visible {
                    let is_selected = selected.is_some_and(|id| record.matches(id));
                    if ui
                        .selectable_label(is_selected, record.display_or_id(field))
                        .clicked()
                    {
                        chosen = Some(record.clone());
                    }
                }
            });
        chosen
    }
}

impl FetchDriven for AsyncSelect {
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
