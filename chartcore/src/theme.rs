//! Notecharter theme — the lane palette and egui styling.
//!
//! The canvas is mostly color-coded: each difficulty group has a pastel
//! background, note bodies are tinted by side, and the selection overlay is
//! its own green. Everything the canvas paints comes from [`Palette`] so the
//! drawing code never hardcodes a color.

use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};

/// Fixed colors for the chart canvas.
pub struct Palette;

impl Palette {
    pub const BACKGROUND: Color32 = Color32::WHITE;

    // Lane group backgrounds
    pub const LANE_BPM: Color32 = Color32::from_rgb(255, 224, 255);
    pub const LANE_HARD: Color32 = Color32::from_rgb(255, 224, 224);
    pub const LANE_NORMAL: Color32 = Color32::from_rgb(255, 255, 224);
    pub const LANE_EASY: Color32 = Color32::from_rgb(224, 255, 224);

    // Note bodies
    pub const NOTE_LEFT: Color32 = Color32::from_rgb(255, 191, 191);
    pub const NOTE_RIGHT: Color32 = Color32::from_rgb(191, 191, 255);
    pub const NOTE_NEUTRAL: Color32 = Color32::from_rgb(191, 191, 191);
    pub const NOTE_BPM: Color32 = Color32::from_rgb(128, 128, 128);
    pub const NOTE_HIGHLIGHT: Color32 = Color32::from_rgb(128, 192, 128);
    pub const NOTE_OUTLINE: Color32 = Color32::from_rgb(128, 128, 128);

    // Grid
    pub const COLUMN_LINE: Color32 = Color32::from_rgb(192, 192, 192);
    pub const GRID_GREEN: Color32 = Color32::from_rgb(0, 192, 0);
    pub const GRID_RED: Color32 = Color32::from_rgb(224, 0, 0);
    pub const GRID_BLUE: Color32 = Color32::from_rgb(0, 0, 224);
    pub const MEASURE_LABEL: Color32 = Color32::from_rgb(224, 224, 224);

    // Selection rectangle
    pub const SELECT_FILL: Color32 = Color32::from_rgba_premultiplied(128, 128, 112, 64);
    pub const SELECT_OUTLINE: Color32 = Color32::from_rgb(128, 128, 128);

    pub const TEXT: Color32 = Color32::BLACK;
    pub const TEXT_ON_NOTE: Color32 = Color32::WHITE;
}

/// Theme configuration applied to the egui context at startup.
pub struct EditorTheme {
    pub font_size_body: f32,
    pub font_size_heading: f32,
    pub font_size_small: f32,
    pub window_padding: f32,
    pub item_spacing: f32,
}

impl Default for EditorTheme {
    fn default() -> Self {
        Self {
            font_size_body: 14.0,
            font_size_heading: 20.0,
            font_size_small: 11.0,
            window_padding: 8.0,
            item_spacing: 4.0,
        }
    }
}

impl EditorTheme {
    pub fn apply(&self, ctx: &egui::Context) {
        let mut style = Style::default();

        style.text_styles = [
            (TextStyle::Small, FontId::new(self.font_size_small, FontFamily::Proportional)),
            (TextStyle::Body, FontId::new(self.font_size_body, FontFamily::Proportional)),
            (TextStyle::Button, FontId::new(self.font_size_body, FontFamily::Proportional)),
            (TextStyle::Heading, FontId::new(self.font_size_heading, FontFamily::Proportional)),
            (TextStyle::Monospace, FontId::new(self.font_size_body, FontFamily::Monospace)),
        ]
        .into();

        let mut visuals = Visuals::light();
        visuals.window_fill = Palette::BACKGROUND;
        visuals.panel_fill = Palette::BACKGROUND;
        visuals.window_rounding = Rounding::ZERO;
        visuals.menu_rounding = Rounding::ZERO;
        visuals.window_stroke = Stroke::new(1.0, Palette::NOTE_OUTLINE);
        style.visuals = visuals;

        style.spacing.window_margin = egui::Margin::same(self.window_padding);
        style.spacing.item_spacing = egui::vec2(self.item_spacing, self.item_spacing);
        style.spacing.button_padding = egui::vec2(8.0, 4.0);

        ctx.set_style(style);
    }
}

/// Menu bar framing helper.
pub fn menu_bar<R>(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui) -> R) -> egui::InnerResponse<R> {
    let frame_resp = egui::Frame::none()
        .fill(Palette::BACKGROUND)
        .stroke(Stroke::new(1.0, Palette::NOTE_OUTLINE))
        .inner_margin(egui::Margin::symmetric(4.0, 2.0))
        .show(ui, |ui| ui.horizontal(add_contents).inner);
    egui::InnerResponse {
        inner: frame_resp.inner,
        response: frame_resp.response,
    }
}
