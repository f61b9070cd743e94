//! Answer-option editor with drag-to-reorder rows.

use eduadmin_core::builder::{OptionBuilder, QuestionKind};
use eframe::egui;

const KINDS: [QuestionKind; 3] = [
    QuestionKind::SingleChoice,
    QuestionKind::MultipleChoice,
    QuestionKind::TrueFalse,
];

/// Drag payload: the index of the row being dragged.
#[derive(Debug, Clone, Copy)]
struct DraggedOption(usize);

enum RowAction {
    Move { from: usize, to: usize },
    Remove(usize),
    SetCorrect(usize, bool),
    SetText(usize, String),
}

pub struct OptionBuilderPanel {
    builder: OptionBuilder,
    draft: String,
}

impl OptionBuilderPanel {
    pub fn new(builder: OptionBuilder) -> Self {
        Self {
            builder,
            draft: String::new(),
        }
    }

    pub fn builder(&self) -> &OptionBuilder {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut OptionBuilder {
        &mut self.builder
    }

    /// Add the drafted option text.
    ///
    /// # Returns
    /// `false` when the draft is blank or the builder refused it.
    pub fn commit_draft(&mut self) -> bool {
        let text = self.draft.trim().to_string();
        if text.is_empty() || !self.builder.add(text) {
            return false;
        }
        self.draft.clear();
        true
    }

    /// Draw the editor.
    ///
    /// # Returns
    /// `true` when the option list changed this frame.
    pub fn show(&mut self, ui: &mut egui::Ui) -> bool {
        let mut changed = false;
        let mut kind = self.builder.kind();
        egui::ComboBox::from_id_salt("question-kind")
            .selected_text(kind.label())
            .show_ui(ui, |ui| {
                for candidate in KINDS {
                    ui.selectable_value(&mut kind, candidate, candidate.label());
                }
            });
        if kind != self.builder.kind() {
            self.builder.set_kind(kind);
            changed = true;
        }

        let mut action = None;
        for (index, (label, option)) in self.builder.labeled().into_iter().enumerate() {
            let row = ui.horizontal(|ui| {
                let _ = ui
                    .dnd_drag_source(
                        egui::Id::new(("answer-option-handle", index)),
                        DraggedOption(index),
                        |ui| ui.label("::"),
                    )
                    .response
                    .on_hover_text("Drag to reorder");
                ui.strong(format!("{label}."));

                let mut text = option.text.clone();
                let edit = ui.add(
                    egui::TextEdit::singleline(&mut text)
                        .id_salt(("answer-option-text", index))
                        .desired_width(240.0),
                );
                if edit.changed() {
                    action = Some(RowAction::SetText(index, text));
                }

                if self.builder.kind().single_correct() {
                    if ui.radio(option.is_correct, "Correct").clicked() {
                        action = Some(RowAction::SetCorrect(index, true));
                    }
                } else {
                    let mut correct = option.is_correct;
                    if ui.checkbox(&mut correct, "Correct").changed() {
                        action = Some(RowAction::SetCorrect(index, correct));
                    }
                }

                if ui
                    .add_enabled(self.builder.can_remove(), egui::Button::new("Remove"))
                    .clicked()
                {
                    action = Some(RowAction::Remove(index));
                }
            });
            if let Some(dragged) = row.response.dnd_release_payload::<DraggedOption>() {
                action = Some(RowAction::Move {
                    from: dragged.0,
                    to: index,
                });
            }
        }
        if let Some(action) = action {
            changed |= self.apply(action);
        }

        if self.builder.can_add() {
            ui.horizontal(|ui| {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.draft)
                        .id_salt("answer-option-draft")
                        .hint_text("New option"),
                );
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if (ui.button("Add option").clicked() || submitted) && self.commit_draft() {
                    changed = true;
                }
            });
        }

        if let Err(err) = self.builder.validate() {
            ui.colored_label(ui.visuals().warn_fg_color, err.to_string());
        }
        changed
    }

    fn apply(&mut self, action: RowAction) -> bool {
        match action {
            RowAction::Move { from, to } => self.builder.move_option(from, to),
            RowAction::Remove(index) => self.builder.remove(index),
            RowAction::SetCorrect(index, correct) => self.builder.set_correct(index, correct),
            RowAction::SetText(index, text) => self.builder.set_text(index, text),
        }
    }
}
