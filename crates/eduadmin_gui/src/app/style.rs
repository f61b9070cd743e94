//! Theme constants and one-time style application for the quiz editor.

use super::QuizEditorApp;
use eframe::egui::{
    self, style::WidgetVisuals, Color32, CornerRadius, FontFamily, FontId, Margin, Stroke,
    TextStyle, Visuals,
};

pub(super) const COLOR_BG_PRIMARY: Color32 = Color32::from_rgb(0x11, 0x16, 0x1f);
pub(super) const COLOR_BG_SECONDARY: Color32 = Color32::from_rgb(0x18, 0x1f, 0x2a);
pub(super) const COLOR_BG_TERTIARY: Color32 = Color32::from_rgb(0x22, 0x2b, 0x38);
pub(super) const COLOR_TEXT_PRIMARY: Color32 = Color32::from_rgb(0xd6, 0xdc, 0xe4);
pub(super) const COLOR_TEXT_SECONDARY: Color32 = Color32::from_rgb(0x93, 0x9c, 0xa8);
pub(super) const COLOR_ACCENT: Color32 = Color32::from_rgb(0x2f, 0x80, 0xed);
pub(super) const COLOR_ACCENT_HOVER: Color32 = Color32::from_rgb(0x1c, 0x64, 0xc8);
pub(super) const COLOR_BORDER: Color32 = Color32::from_rgb(0x33, 0x3c, 0x48);
pub(super) const COLOR_STATUS_OK: Color32 = Color32::from_rgb(0x3f, 0xb9, 0x50);

fn widget_visuals(fill: Color32, stroke: Color32, text: Color32, expansion: f32) -> WidgetVisuals {
    WidgetVisuals {
        bg_fill: fill,
        weak_bg_fill: fill,
        bg_stroke: Stroke::new(1.0, stroke),
        corner_radius: CornerRadius::same(6),
        fg_stroke: Stroke::new(1.0, text),
        expansion,
    }
}

impl QuizEditorApp {
    pub(super) fn ensure_style(&mut self, ctx: &egui::Context) {
        if self.style_applied {
            return;
        }

        let mut style = (*ctx.style()).clone();
        style.visuals = Visuals::dark();
        style.visuals.override_text_color = Some(COLOR_TEXT_PRIMARY);
        style.visuals.window_fill = COLOR_BG_PRIMARY;
        style.visuals.panel_fill = COLOR_BG_SECONDARY;
        style.visuals.extreme_bg_color = COLOR_BG_PRIMARY;
        style.visuals.faint_bg_color = COLOR_BG_TERTIARY;
        style.visuals.window_stroke = Stroke::new(1.0, COLOR_BORDER);
        style.visuals.selection.stroke = Stroke::new(1.0, COLOR_ACCENT);
        style.visuals.text_edit_bg_color = Some(COLOR_BG_TERTIARY);

        style.visuals.widgets.noninteractive =
            widget_visuals(COLOR_BG_SECONDARY, COLOR_BORDER, COLOR_TEXT_SECONDARY, 0.0);
        style.visuals.widgets.inactive =
            widget_visuals(COLOR_BG_TERTIARY, COLOR_BORDER, COLOR_TEXT_PRIMARY, 0.0);
        style.visuals.widgets.hovered =
            widget_visuals(COLOR_ACCENT_HOVER, COLOR_ACCENT_HOVER, Color32::WHITE, 0.5);
        style.visuals.widgets.active =
            widget_visuals(COLOR_ACCENT, COLOR_ACCENT, Color32::WHITE, 0.5);
        style.visuals.widgets.open = widget_visuals(COLOR_ACCENT, COLOR_ACCENT, Color32::WHITE, 0.0);

        style.spacing.window_margin = Margin::same(12);
        style.spacing.button_padding = egui::vec2(10.0, 6.0);
        style.spacing.item_spacing = egui::vec2(10.0, 8.0);
        style.spacing.text_edit_width = 260.0;
        style.spacing.combo_width = 220.0;

        style.text_styles.insert(
            TextStyle::Heading,
            FontId::new(22.0, FontFamily::Proportional),
        );
        style
            .text_styles
            .insert(TextStyle::Body, FontId::new(15.0, FontFamily::Proportional));

        ctx.set_style(style);
        self.style_applied = true;
    }
}
