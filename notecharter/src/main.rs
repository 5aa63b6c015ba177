//! notecharter — chart editor for the Thapsteak rhythm game.

mod app;
mod chart;
mod grid;
mod playback;

use app::NotecharterApp;
use eframe::NativeOptions;

fn main() -> eframe::Result<()> {
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 768.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("notecharter"),
        ..Default::default()
    };

    eframe::run_native(
        "notecharter",
        options,
        Box::new(|cc| {
            chartcore::EditorTheme::default().apply(&cc.egui_ctx);
            Box::new(NotecharterApp::new(cc))
        }),
    )
}
