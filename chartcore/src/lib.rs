//! chartcore — shared library for the Thapsteak notecharter

pub mod repaint;
pub mod storage;
pub mod theme;
pub mod widgets;

pub use repaint::RepaintController;
pub use theme::EditorTheme;
