//! notecharter — the editor application.
//!
//! Single-threaded and event-driven: every mutation of the chart, the view
//! state and the selection happens inside `update()`. The canvas is drawn
//! from scratch each frame as a pure function of that state; the only thing
//! that moves between input events is the tick cursor while autoplay is
//! following the audio clock.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chartcore::repaint::RepaintController;
use chartcore::storage::{charts_dir, FileBrowser, StorageError};
use chartcore::theme::{menu_bar, Palette};
use chartcore::widgets::{status_bar, toolbar_separator, FileListItem};
use egui::{Color32, Context, Key, Pos2, Rect, Sense, Stroke, Vec2};

use crate::chart::{Direction, Lane, Note, NoteId, Notechart, Side, TICKS_PER_MEASURE};
use crate::grid;
use crate::playback::{self, AudioEngine};

/// Editing modes. Toggled explicitly (q / w), never inferred from input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Select and inspect notes with a drag rectangle.
    Pointer,
    /// Place notes at the hovered cell.
    Create,
}

impl Mode {
    fn label(self) -> &'static str {
        match self {
            Mode::Pointer => "pointer",
            Mode::Create => "create",
        }
    }
}

/// What the file browser window is currently picking.
#[derive(Clone, Copy, PartialEq, Eq)]
enum BrowseTarget {
    OpenChart,
    SaveChart,
    LoadAudio,
}

/// Pending BPM-lane placement, waiting for the value prompt.
struct BpmPrompt {
    tick: i64,
    text: String,
}

pub struct NotecharterApp {
    chart: Notechart,
    file_path: Option<PathBuf>,

    // View state
    /// Scroll accumulator in ticks; the canvas bottom edge is its floor.
    current_tick: f64,
    /// Pixels per tick, 1..=8.
    row_size: i64,
    granularity_index: usize,

    // Interaction
    mode: Mode,
    /// Pending side applied to new notes and, on change, to the selection.
    current_side: Side,
    /// Pending flick direction, same dual role as the side.
    current_direction: Option<Direction>,
    /// Anchor of the live selection drag, in screen space.
    select_anchor: Option<Pos2>,
    select_corner: Pos2,
    /// Ids picked up by the last selection rectangle.
    highlighted: HashSet<NoteId>,

    // Playback
    bpm: f64,
    autoplay: bool,
    audio: Option<AudioEngine>,
    audio_path: Option<PathBuf>,

    // Dialogs
    file_browser: FileBrowser,
    browse_target: Option<BrowseTarget>,
    save_filename: String,
    warp_open: bool,
    warp_text: String,
    bpm_prompt: Option<BpmPrompt>,
    show_about: bool,
    status_error: Option<String>,

    repaint: RepaintController,
}

impl NotecharterApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        Self {
            chart: Notechart::new(),
            file_path: None,

            current_tick: 0.0,
            row_size: 3,
            granularity_index: 0,

            mode: Mode::Pointer,
            current_side: Side::None,
            current_direction: None,
            select_anchor: None,
            select_corner: Pos2::ZERO,
            highlighted: HashSet::new(),

            bpm: 140.0,
            autoplay: false,
            audio: None,
            audio_path: None,

            file_browser: FileBrowser::new(charts_dir()),
            browse_target: None,
            save_filename: String::new(),
            warp_open: false,
            warp_text: String::new(),
            bpm_prompt: None,
            show_about: false,
            status_error: None,

            repaint: RepaintController::new(),
        }
    }

    fn granularity(&self) -> i64 {
        grid::GRANULARITIES[self.granularity_index]
    }

    /// A modal window is open; canvas input is suspended until it resolves.
    fn dialog_open(&self) -> bool {
        self.browse_target.is_some()
            || self.warp_open
            || self.bpm_prompt.is_some()
            || self.show_about
    }

    // ---------------------------------------------------------------
    // Editing commands
    // ---------------------------------------------------------------

    fn set_mode(&mut self, mode: Mode) {
        // No simultaneous manual-editing-and-autoplay state.
        self.stop_autoplay();
        self.mode = mode;
        self.select_anchor = None;
    }

    /// Set the pending direction and retroactively apply it to every
    /// highlighted note through the id index.
    fn apply_direction(&mut self, direction: Option<Direction>) {
        for &id in &self.highlighted.clone() {
            self.chart.set_direction(id, direction);
        }
        self.current_direction = direction;
    }

    /// Set the pending side, applied to new notes and to the selection.
    fn apply_side(&mut self, side: Side) {
        for &id in &self.highlighted.clone() {
            self.chart.set_side(id, side);
        }
        self.current_side = side;
    }

    fn delete_highlighted(&mut self) {
        for id in self.highlighted.drain() {
            // Stale ids are safe no-ops.
            self.chart.remove(id);
        }
    }

    fn step_granularity(&mut self, delta: isize) {
        let max = grid::GRANULARITIES.len() as isize - 1;
        let next = (self.granularity_index as isize + delta).clamp(0, max);
        self.granularity_index = next as usize;
    }

    fn step_row_size(&mut self, delta: i64) {
        self.row_size = (self.row_size + delta).clamp(grid::ROW_SIZE_MIN, grid::ROW_SIZE_MAX);
    }

    // ---------------------------------------------------------------
    // Playback
    // ---------------------------------------------------------------

    fn toggle_autoplay(&mut self) {
        if self.autoplay {
            self.stop_autoplay();
        } else if let Some(engine) = &self.audio {
            engine.seek_to_seconds(playback::seek_seconds(self.current_tick, self.bpm));
            engine.start();
            self.autoplay = true;
        }
        // No engine: autoplay stays unavailable, editing continues.
    }

    fn stop_autoplay(&mut self) {
        if self.autoplay {
            self.autoplay = false;
            if let Some(engine) = &self.audio {
                engine.stop();
            }
        }
    }

    /// While autoplay runs the audio clock owns the tick cursor.
    fn sync_autoplay(&mut self) {
        if !self.autoplay {
            return;
        }
        if let Some(engine) = &self.audio {
            let tick = playback::elapsed_to_tick(engine.elapsed_seconds(), self.bpm);
            self.current_tick = tick.max(0.0);
        }
    }

    // ---------------------------------------------------------------
    // File operations
    // ---------------------------------------------------------------

    fn new_chart(&mut self) {
        self.stop_autoplay();
        self.chart = Notechart::new();
        self.file_path = None;
        self.highlighted.clear();
        self.current_tick = 0.0;
        self.status_error = None;
    }

    fn show_open_dialog(&mut self) {
        self.file_browser =
            FileBrowser::new(charts_dir()).with_filter(vec!["thapsteak".into()]);
        self.browse_target = Some(BrowseTarget::OpenChart);
    }

    fn show_save_dialog(&mut self) {
        self.file_browser =
            FileBrowser::new(charts_dir()).with_filter(vec!["thapsteak".into()]);
        self.browse_target = Some(BrowseTarget::SaveChart);
        self.save_filename = self
            .file_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "untitled.thapsteak".to_string());
    }

    fn show_audio_dialog(&mut self) {
        self.file_browser = FileBrowser::new(charts_dir()).with_filter(vec![
            "mp3".into(),
            "wav".into(),
            "ogg".into(),
            "flac".into(),
        ]);
        self.browse_target = Some(BrowseTarget::LoadAudio);
    }

    fn read_chart(path: &Path) -> chartcore::storage::Result<Notechart> {
        if !path.is_file() {
            return Err(StorageError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Notechart::from_json(&content)?)
    }

    /// Import a chart. The file is parsed completely before the open chart
    /// is replaced, so a malformed file leaves the editor untouched.
    fn load_chart_from(&mut self, path: PathBuf) {
        self.stop_autoplay();
        match Self::read_chart(&path) {
            Ok(mut chart) => {
                chart.update(); // freshly imported counts as saved
                self.chart = chart;
                self.highlighted.clear();
                self.file_path = Some(path);
                self.status_error = None;
            }
            Err(err) => {
                self.status_error = Some(format!("import failed: {err}"));
            }
        }
    }

    fn write_chart(chart: &Notechart, path: &Path) -> chartcore::storage::Result<()> {
        let json = chart.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    fn save_chart_to(&mut self, path: PathBuf) {
        match Self::write_chart(&self.chart, &path) {
            Ok(()) => {
                self.chart.update();
                self.file_path = Some(path);
                self.status_error = None;
            }
            Err(err) => {
                self.status_error = Some(format!("export failed: {err}"));
            }
        }
    }

    fn load_audio_from(&mut self, path: PathBuf) {
        self.stop_autoplay();
        match AudioEngine::init(&path) {
            Some(engine) => {
                self.audio = Some(engine);
                self.audio_path = Some(path);
                self.status_error = None;
            }
            None => {
                self.status_error = Some(format!("could not open audio: {}", path.display()));
            }
        }
    }

    // ---------------------------------------------------------------
    // Input
    // ---------------------------------------------------------------

    fn handle_keys(&mut self, ctx: &Context) {
        ctx.input(|i| {
            // Mode
            if i.key_pressed(Key::Q) {
                self.set_mode(Mode::Pointer);
            }
            if i.key_pressed(Key::W) {
                self.set_mode(Mode::Create);
            }

            // Tick granularity
            if i.key_pressed(Key::Equals) || i.key_pressed(Key::Plus) {
                self.step_granularity(1);
            }
            if i.key_pressed(Key::Minus) {
                self.step_granularity(-1);
            }

            // Row size
            if i.key_pressed(Key::CloseBracket) {
                self.step_row_size(1);
            }
            if i.key_pressed(Key::OpenBracket) {
                self.step_row_size(-1);
            }

            // Warp
            if i.key_pressed(Key::F) {
                self.warp_open = true;
                self.warp_text.clear();
            }

            // Flick direction
            if i.key_pressed(Key::Z) {
                self.apply_direction(Some(Direction::Right));
            }
            if i.key_pressed(Key::X) {
                self.apply_direction(Some(Direction::UpRight));
            }
            if i.key_pressed(Key::C) {
                self.apply_direction(Some(Direction::Up));
            }
            if i.key_pressed(Key::V) {
                self.apply_direction(Some(Direction::UpLeft));
            }
            if i.key_pressed(Key::B) {
                self.apply_direction(Some(Direction::Left));
            }
            if i.key_pressed(Key::N) {
                self.apply_direction(None);
            }

            // Side
            if i.key_pressed(Key::Comma) {
                self.apply_side(Side::None);
            }
            if i.key_pressed(Key::Period) {
                self.apply_side(Side::Left);
            }
            if i.key_pressed(Key::Slash) {
                self.apply_side(Side::Right);
            }

            // File
            if i.key_pressed(Key::I) {
                self.show_open_dialog();
            }
            if i.key_pressed(Key::S) {
                self.show_save_dialog();
            }

            // Delete selection
            if i.key_pressed(Key::Backspace) || i.key_pressed(Key::Delete) {
                self.delete_highlighted();
            }

            // Autoplay
            if i.key_pressed(Key::Space) {
                self.toggle_autoplay();
            }
        });
    }

    /// Place a note at a pointer position (Create mode primary action).
    fn place_note_at(&mut self, canvas: Rect, pos: Pos2, long_held: bool) {
        let column = grid::column_at(pos.x - canvas.min.x);
        let Some(lane) = Lane::from_column(column) else {
            return; // gap column, nothing to place
        };

        let raw = grid::y_to_tick(
            pos.y - canvas.min.y,
            self.current_tick as i64,
            canvas.height(),
            self.row_size,
        );
        let tick = grid::quantize_down(raw, self.granularity());

        if lane == Lane::Bpm {
            // Value comes from the prompt; the note is placed on confirm.
            self.bpm_prompt = Some(BpmPrompt {
                tick,
                text: String::new(),
            });
            return;
        }

        let mut note = Note::new(tick, lane);
        note.side = self.current_side;
        note.direction = self.current_direction;
        note.is_longnote = long_held && self.current_side != Side::None;
        self.chart.add_note(note);
    }

    // ---------------------------------------------------------------
    // Canvas
    // ---------------------------------------------------------------

    fn render_canvas(&mut self, ui: &mut egui::Ui) {
        let interactive = !self.dialog_open();
        let available = ui.available_size();
        let (response, painter) = ui.allocate_painter(available, Sense::click_and_drag());
        let rect = response.rect;

        painter.rect_filled(rect, 0.0, Palette::BACKGROUND);

        let current_tick = self.current_tick as i64;
        let row_size = self.row_size;
        let height = rect.height();
        let to_screen_y =
            |tick: i64| rect.min.y + grid::tick_to_y(tick, current_tick, height, row_size);

        // Lane group backgrounds
        let groups: [(usize, usize, Color32); 4] = [
            (Lane::Bpm.column(), 1, Palette::LANE_BPM),
            (Lane::H1.column(), 5, Palette::LANE_HARD),
            (Lane::N1.column(), 4, Palette::LANE_NORMAL),
            (Lane::E1.column(), 3, Palette::LANE_EASY),
        ];
        for (start, span, color) in groups {
            let band = Rect::from_min_size(
                Pos2::new(rect.min.x + grid::column_to_x(start), rect.min.y),
                Vec2::new(grid::COL_WIDTH * span as f32, height),
            );
            painter.rect_filled(band, 0.0, color);
        }

        // Column lines
        for col in 0..=18 {
            let x = rect.min.x + grid::column_to_x(col);
            if x > rect.max.x {
                break;
            }
            painter.vline(x, rect.y_range(), Stroke::new(1.0, Palette::COLUMN_LINE));
        }

        // Horizontal gridlines, finest family first so emphasized lines
        // paint on top.
        let visible_ticks = (height / row_size as f32).ceil() as i64;
        let top_tick = current_tick + visible_ticks;
        for level in grid::grid_levels(self.granularity()) {
            let stroke = gridline_stroke(level.level);
            let mut tick = current_tick - current_tick.rem_euclid(level.step_ticks);
            if tick < current_tick {
                tick += level.step_ticks;
            }
            while tick <= top_tick {
                painter.hline(rect.x_range(), to_screen_y(tick), stroke);
                tick += level.step_ticks;
            }
        }

        // Measure numbers
        let mut measure_tick = current_tick - current_tick.rem_euclid(TICKS_PER_MEASURE);
        while measure_tick <= top_tick {
            if measure_tick >= current_tick {
                painter.text(
                    Pos2::new(rect.max.x - 16.0, to_screen_y(measure_tick)),
                    egui::Align2::RIGHT_BOTTOM,
                    format!("#{:03}", measure_tick / TICKS_PER_MEASURE),
                    egui::FontId::proportional(64.0),
                    Palette::MEASURE_LABEL,
                );
            }
            measure_tick += TICKS_PER_MEASURE;
        }

        // Selection drag bookkeeping (Pointer mode)
        if interactive && self.mode == Mode::Pointer {
            if response.drag_started_by(egui::PointerButton::Primary) {
                if let Some(pos) = response.interact_pointer_pos() {
                    self.select_anchor = Some(pos);
                    self.select_corner = pos;
                }
            }
            if self.select_anchor.is_some() {
                if let Some(pos) = response.interact_pointer_pos() {
                    self.select_corner = pos;
                }
            }
            if response.drag_released_by(egui::PointerButton::Primary) {
                // The highlighted set keeps its last computed value.
                self.select_anchor = None;
            }
            if response.clicked() {
                self.highlighted.clear();
            }
        }
        let select_rect = self
            .select_anchor
            .map(|anchor| Rect::from_two_pos(anchor, self.select_corner));

        // Notes. While a selection drag is live the highlighted set is
        // recomputed from scratch against the normalized rectangle.
        let mut hits: HashSet<NoteId> = HashSet::new();
        let notes: Vec<&Note> = self.chart.notes().collect();
        for (idx, &note) in notes.iter().enumerate() {
            let top = to_screen_y(note.tick) - grid::NOTE_HEIGHT;
            let body = Rect::from_min_size(
                Pos2::new(
                    rect.min.x + grid::column_to_x(note.lane.column()),
                    top,
                ),
                Vec2::new(grid::COL_WIDTH + 1.0, grid::NOTE_HEIGHT + 1.0),
            );

            if body.max.y < rect.min.y || body.min.y > rect.max.y {
                continue;
            }

            if let Some(sel) = select_rect {
                if body.intersects(sel) {
                    hits.insert(note.id);
                }
            }
            let is_highlighted = if select_rect.is_some() {
                hits.contains(&note.id)
            } else {
                self.highlighted.contains(&note.id)
            };

            let mut fill = match note.side {
                Side::Left => Palette::NOTE_LEFT,
                Side::Right => Palette::NOTE_RIGHT,
                Side::None => Palette::NOTE_NEUTRAL,
            };
            if note.lane == Lane::Bpm {
                fill = Palette::NOTE_BPM;
            }
            if is_highlighted {
                fill = Palette::NOTE_HIGHLIGHT;
            }

            painter.rect_filled(body, 0.0, fill);
            painter.rect_stroke(body, 0.0, Stroke::new(1.0, Palette::NOTE_OUTLINE));

            if note.lane == Lane::Bpm {
                painter.text(
                    body.min + Vec2::new(2.0, 2.0),
                    egui::Align2::LEFT_TOP,
                    format!("{:.3}", note.value),
                    egui::FontId::proportional(12.0),
                    Palette::TEXT_ON_NOTE,
                );
                continue;
            }

            if note.is_longnote {
                painter.text(
                    body.min + Vec2::new(2.0, 2.0),
                    egui::Align2::LEFT_TOP,
                    "DRAG",
                    egui::FontId::proportional(12.0),
                    Palette::TEXT_ON_NOTE,
                );

                // Connector back to the previous same-side note in the group
                for prev in notes[..idx].iter().rev().copied() {
                    if prev.side == note.side && Notechart::is_same_lane_group(prev, note) {
                        let prev_center = Pos2::new(
                            rect.min.x
                                + grid::column_to_x(prev.lane.column())
                                + grid::COL_WIDTH / 2.0,
                            to_screen_y(prev.tick) - grid::NOTE_HEIGHT / 2.0,
                        );
                        painter.line_segment(
                            [body.center(), prev_center],
                            Stroke::new(5.0, Palette::NOTE_OUTLINE),
                        );
                        break;
                    }
                }
            }

            if note.side != Side::None {
                // If the next connector starts above the viewport, draw the
                // chain line heading off-screen.
                for next in notes[idx + 1..].iter().copied() {
                    if next.side == note.side && Notechart::is_same_lane_group(next, note) {
                        if next.is_longnote {
                            let next_top = to_screen_y(next.tick) - grid::NOTE_HEIGHT;
                            if next_top < rect.min.y {
                                let next_center = Pos2::new(
                                    rect.min.x
                                        + grid::column_to_x(next.lane.column())
                                        + grid::COL_WIDTH / 2.0,
                                    next_top + grid::NOTE_HEIGHT / 2.0,
                                );
                                painter.line_segment(
                                    [body.center(), next_center],
                                    Stroke::new(5.0, Palette::NOTE_OUTLINE),
                                );
                            }
                        }
                        break;
                    }
                }
            }

            if let Some(direction) = note.direction {
                painter.text(
                    Pos2::new(body.center().x, body.min.y - 2.0),
                    egui::Align2::CENTER_BOTTOM,
                    direction.arrow(),
                    egui::FontId::proportional(24.0),
                    Palette::NOTE_OUTLINE,
                );
            }
        }
        if select_rect.is_some() {
            self.highlighted = hits;
        }

        // Hover ghost (Create mode)
        if interactive && self.mode == Mode::Create {
            if let Some(pos) = response.hover_pos() {
                let column = grid::column_at(pos.x - rect.min.x);
                if Lane::from_column(column).is_some() {
                    let ghost = Rect::from_min_size(
                        Pos2::new(
                            rect.min.x + grid::column_to_x(column),
                            pos.y - grid::NOTE_HEIGHT / 2.0,
                        ),
                        Vec2::new(grid::COL_WIDTH + 1.0, grid::NOTE_HEIGHT),
                    );
                    let tint = match self.current_side {
                        Side::Left => Palette::NOTE_LEFT,
                        Side::Right => Palette::NOTE_RIGHT,
                        Side::None => Palette::NOTE_NEUTRAL,
                    };
                    painter.rect(
                        ghost,
                        0.0,
                        tint.gamma_multiply(0.6),
                        Stroke::new(1.0, Palette::NOTE_OUTLINE),
                    );
                }
            }
        }

        // Selection rectangle
        if let Some(sel) = select_rect {
            painter.rect(
                sel,
                0.0,
                Palette::SELECT_FILL,
                Stroke::new(1.0, Palette::SELECT_OUTLINE),
            );
        }

        // Primary action in Create mode
        if interactive && self.mode == Mode::Create && response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let long_held = ui.input(|i| i.modifiers.shift);
                self.place_note_at(rect, pos, long_held);
            }
        }

        // Scroll: the raw wheel delta moves the tick cursor directly, and
        // any manual scroll takes the cursor back from the audio clock.
        if interactive && response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                self.stop_autoplay();
                self.current_tick = (self.current_tick + scroll as f64).max(0.0);
            }
        }
    }

    // ---------------------------------------------------------------
    // Panels and dialogs
    // ---------------------------------------------------------------

    fn render_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui
                .selectable_label(self.mode == Mode::Pointer, "pointer (q)")
                .clicked()
            {
                self.set_mode(Mode::Pointer);
            }
            if ui
                .selectable_label(self.mode == Mode::Create, "create (w)")
                .clicked()
            {
                self.set_mode(Mode::Create);
            }

            toolbar_separator(ui);

            ui.label("grid:");
            if ui.button("-").clicked() {
                self.step_granularity(-1);
            }
            ui.label(format!("1/{}", self.granularity()));
            if ui.button("+").clicked() {
                self.step_granularity(1);
            }

            toolbar_separator(ui);

            ui.label("row:");
            if ui.button("[").clicked() {
                self.step_row_size(-1);
            }
            ui.label(format!("{}", self.row_size));
            if ui.button("]").clicked() {
                self.step_row_size(1);
            }

            toolbar_separator(ui);

            ui.menu_button(format!("side: {}", self.current_side.label()), |ui| {
                if ui.button("null (,)").clicked() {
                    self.apply_side(Side::None);
                    ui.close_menu();
                }
                if ui.button("left (.)").clicked() {
                    self.apply_side(Side::Left);
                    ui.close_menu();
                }
                if ui.button("right (/)").clicked() {
                    self.apply_side(Side::Right);
                    ui.close_menu();
                }
            });

            toolbar_separator(ui);

            ui.label("bpm:");
            if ui
                .add(egui::DragValue::new(&mut self.bpm).clamp_range(40.0..=300.0).speed(0.5))
                .changed()
            {
                // A BPM change invalidates any running sync.
                self.stop_autoplay();
            }

            toolbar_separator(ui);

            if self.audio.is_some() {
                let label = if self.autoplay { "stop" } else { "play" };
                if ui.button(label).clicked() {
                    self.toggle_autoplay();
                }
            } else {
                ui.add_enabled(false, egui::Button::new("no audio"));
            }
        });
    }

    fn render_file_browser(&mut self, ctx: &Context) {
        let Some(target) = self.browse_target else {
            return;
        };
        let title = match target {
            BrowseTarget::OpenChart => "import chart",
            BrowseTarget::SaveChart => "export chart",
            BrowseTarget::LoadAudio => "load audio",
        };

        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .default_width(380.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("location:");
                    ui.label(self.file_browser.current_dir.to_string_lossy().to_string());
                });
                ui.separator();

                let mut picked: Option<PathBuf> = None;

                egui::ScrollArea::vertical().max_height(220.0).show(ui, |ui| {
                    let mut clicked_idx = None;
                    let mut nav_path = None;
                    for (idx, entry) in self.file_browser.entries.iter().enumerate() {
                        let selected = self.file_browser.selected_index == Some(idx);
                        let response = ui
                            .add(FileListItem::new(&entry.name, entry.is_directory).selected(selected));
                        if response.clicked() {
                            clicked_idx = Some(idx);
                        }
                        if response.double_clicked() {
                            if entry.is_directory {
                                nav_path = Some(entry.path.clone());
                            } else if target != BrowseTarget::SaveChart {
                                picked = Some(entry.path.clone());
                            }
                        }
                    }
                    if let Some(idx) = clicked_idx {
                        self.file_browser.selected_index = Some(idx);
                    }
                    if let Some(path) = nav_path {
                        self.file_browser.navigate_to(path);
                    }
                });

                if target == BrowseTarget::SaveChart {
                    ui.separator();
                    ui.horizontal(|ui| {
                        ui.label("filename:");
                        ui.text_edit_singleline(&mut self.save_filename);
                    });
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("cancel").clicked() {
                        self.browse_target = None;
                    }
                    let action = match target {
                        BrowseTarget::OpenChart => "import",
                        BrowseTarget::SaveChart => "export",
                        BrowseTarget::LoadAudio => "load",
                    };
                    if ui.button(action).clicked() {
                        if target == BrowseTarget::SaveChart {
                            if !self.save_filename.is_empty() {
                                let path =
                                    self.file_browser.save_directory().join(&self.save_filename);
                                let path = if path.extension().is_none() {
                                    path.with_extension("thapsteak")
                                } else {
                                    path
                                };
                                self.save_chart_to(path);
                                self.browse_target = None;
                            }
                        } else if let Some(entry) = self.file_browser.selected_entry() {
                            if !entry.is_directory {
                                picked = Some(entry.path.clone());
                            }
                        }
                    }
                });

                if let Some(path) = picked {
                    match target {
                        BrowseTarget::OpenChart => self.load_chart_from(path),
                        BrowseTarget::LoadAudio => self.load_audio_from(path),
                        BrowseTarget::SaveChart => {}
                    }
                    self.browse_target = None;
                }
            });
    }

    fn render_warp_prompt(&mut self, ctx: &Context) {
        if !self.warp_open {
            return;
        }
        let mut go = false;
        let mut close = false;
        egui::Window::new("warp to measure")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("measure:");
                    ui.text_edit_singleline(&mut self.warp_text);
                });
                ui.horizontal(|ui| {
                    if ui.button("cancel").clicked() {
                        close = true;
                    }
                    if ui.button("warp").clicked() || ui.input(|i| i.key_pressed(Key::Enter)) {
                        go = true;
                        close = true;
                    }
                });
            });
        if go {
            if let Ok(measure) = self.warp_text.trim().parse::<i64>() {
                self.stop_autoplay();
                self.current_tick = (measure.max(0) * TICKS_PER_MEASURE) as f64;
            }
        }
        if close {
            self.warp_open = false;
        }
    }

    fn render_bpm_prompt(&mut self, ctx: &Context) {
        let Some(mut prompt) = self.bpm_prompt.take() else {
            return;
        };
        let mut done = false;
        let mut value: Option<f32> = None;
        egui::Window::new("bpm")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("bpm:");
                    ui.text_edit_singleline(&mut prompt.text);
                });
                ui.horizontal(|ui| {
                    if ui.button("cancel").clicked() {
                        done = true;
                    }
                    if ui.button("place").clicked() || ui.input(|i| i.key_pressed(Key::Enter)) {
                        value = Some(prompt.text.trim().parse().unwrap_or(0.0));
                        done = true;
                    }
                });
            });

        if let Some(bpm) = value {
            let mut note = Note::new(prompt.tick, Lane::Bpm);
            note.value = bpm;
            self.chart.add_note(note);
        }
        if !done {
            self.bpm_prompt = Some(prompt);
        }
    }

    fn render_about(&mut self, ctx: &Context) {
        egui::Window::new("about notecharter")
            .collapsible(false)
            .resizable(false)
            .default_width(300.0)
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading("notecharter");
                    ui.label("chart editor for Thapsteak");
                });
                ui.add_space(8.0);
                ui.label("q/w  pointer / create mode");
                ui.label("=/−  tick granularity, [/]  row size");
                ui.label("z x c v b n  flick direction, , . /  side");
                ui.label("shift+click  long note, f  warp, space  autoplay");
                ui.label("i/s  import / export .thapsteak");
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    if ui.button("ok").clicked() {
                        self.show_about = false;
                    }
                });
            });
    }

    fn status_line(&self) -> String {
        let nominal_ms =
            (playback::tick_to_seconds(self.current_tick, self.bpm) * 1000.0) as i64;
        let mut status = format!(
            "{} | grid 1/{} | side {} | dir {} | row {} | {} notes | {} ms | {}",
            self.mode.label(),
            self.granularity(),
            self.current_side.label(),
            self.current_direction.map_or("none", Direction::arrow),
            self.row_size,
            self.chart.len(),
            nominal_ms,
            if self.chart.is_updated() { "modified" } else { "saved" },
        );
        if let Some(engine) = &self.audio {
            let clock_ms = ((engine.elapsed_seconds() + playback::OFFSET_SECS) * 1000.0) as i64;
            let name = self
                .audio_path
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            status.push_str(&format!(
                " | {} {} ms @ {} Hz",
                name,
                clock_ms,
                engine.sample_rate()
            ));
        }
        if let Some(err) = &self.status_error {
            status.push_str(&format!(" | {err}"));
        }
        status
    }
}

/// Stroke for one gridline family. Coarser levels are heavier; the cycling
/// colors keep adjacent families distinguishable at a glance.
fn gridline_stroke(level: i64) -> Stroke {
    match level {
        1 => Stroke::new(3.0, Palette::GRID_RED),
        2 => Stroke::new(2.5, Palette::GRID_GREEN),
        4 => Stroke::new(2.5, Palette::GRID_BLUE),
        6 | 8 => Stroke::new(2.0, Palette::GRID_RED),
        12 | 16 => Stroke::new(1.5, Palette::GRID_GREEN),
        24 | 32 => Stroke::new(1.0, Palette::GRID_BLUE),
        48 | 64 => Stroke::new(1.0, Palette::GRID_RED),
        _ => Stroke::new(0.5, Palette::COLUMN_LINE),
    }
}

impl eframe::App for NotecharterApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.repaint.begin_frame(ctx);

        if !self.dialog_open() {
            self.handle_keys(ctx);
        }
        self.sync_autoplay();
        self.repaint.set_continuous(self.autoplay);

        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            menu_bar(ui, |ui| {
                ui.menu_button("file", |ui| {
                    if ui.button("new").clicked() {
                        self.new_chart();
                        ui.close_menu();
                    }
                    if ui.button("import…    i").clicked() {
                        self.show_open_dialog();
                        ui.close_menu();
                    }
                    if ui.button("export…    s").clicked() {
                        self.show_save_dialog();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("load audio…").clicked() {
                        self.show_audio_dialog();
                        ui.close_menu();
                    }
                });
                ui.menu_button("edit", |ui| {
                    if ui.button("delete selection  ⌫").clicked() {
                        self.delete_highlighted();
                        ui.close_menu();
                    }
                    if ui.button("clear selection").clicked() {
                        self.highlighted.clear();
                        ui.close_menu();
                    }
                });
                ui.menu_button("help", |ui| {
                    if ui.button("about").clicked() {
                        self.show_about = true;
                        ui.close_menu();
                    }
                });
            });
        });

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.render_toolbar(ui);
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            status_bar(ui, &self.status_line());
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Palette::BACKGROUND))
            .show(ctx, |ui| {
                self.render_canvas(ui);
            });

        self.render_file_browser(ctx);
        self.render_warp_prompt(ctx);
        self.render_bpm_prompt(ctx);
        if self.show_about {
            self.render_about(ctx);
        }

        self.repaint.end_frame(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_line_is_heaviest() {
        let measure = gridline_stroke(1);
        for level in grid::GRANULARITIES.iter().skip(1) {
            assert!(gridline_stroke(*level).width <= measure.width);
        }
    }

    #[test]
    fn test_mode_labels() {
        assert_eq!(Mode::Pointer.label(), "pointer");
        assert_eq!(Mode::Create.label(), "create");
    }
}
