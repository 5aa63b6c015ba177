//! Repaint governor for the notecharter.
//!
//! egui is an immediate-mode GUI: a frame only runs when something asks for
//! one. The editor spends most of its life idle — the chart is a pure
//! function of its state, so there is nothing to animate. The exception is
//! autoplay, where the audio clock moves the tick cursor between input
//! events and the canvas must follow it.
//!
//! `RepaintController` keeps the frame rate honest:
//!
//! 1. Input frames (clicks, keys, scroll) always paint.
//! 2. While continuous mode is on (autoplay running), a timed repaint fires
//!    at a fixed interval.
//! 3. Otherwise the context sleeps until the next input event.
//!
//! The controller also measures the time since the previous frame. Frame
//! content is a deterministic function of editor state, so the delta is not
//! used to advance anything — it is kept for the status readout and for
//! anything that later needs wall-clock pacing.

use std::time::{Duration, Instant};

/// Repaint interval while autoplay is running (~30 fps).
const CONTINUOUS_INTERVAL: Duration = Duration::from_millis(33);

/// Controls when the egui context should request repaints.
///
/// Call [`begin_frame`](Self::begin_frame) at the top of `update()` and
/// [`end_frame`](Self::end_frame) at the bottom.
pub struct RepaintController {
    /// Whether timed continuous repainting is active.
    continuous: bool,
    /// One-shot repaint requested from inside the current frame.
    needs_repaint: bool,
    /// Frame counter (0 = first frame).
    frame: u64,
    /// When the previous frame ran.
    last_frame: Instant,
    /// Seconds elapsed between the previous frame and this one.
    delta_seconds: f64,
}

impl Default for RepaintController {
    fn default() -> Self {
        Self::new()
    }
}

impl RepaintController {
    pub fn new() -> Self {
        Self {
            continuous: false,
            needs_repaint: false,
            frame: 0,
            last_frame: Instant::now(),
            delta_seconds: 0.0,
        }
    }

    /// Enable or disable timed continuous repainting.
    ///
    /// Turn this on while autoplay is driving the tick cursor and off as
    /// soon as it stops.
    pub fn set_continuous(&mut self, continuous: bool) {
        self.continuous = continuous;
    }

    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    /// Request a single repaint on the next opportunity. For state changes
    /// that happen outside an input event.
    pub fn mark_needs_repaint(&mut self) {
        self.needs_repaint = true;
    }

    /// Seconds between the previous frame and the current one.
    pub fn delta_seconds(&self) -> f64 {
        self.delta_seconds
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Call at the start of `update()`.
    pub fn begin_frame(&mut self, _ctx: &egui::Context) {
        let now = Instant::now();
        self.delta_seconds = if self.frame == 0 {
            0.0
        } else {
            now.duration_since(self.last_frame).as_secs_f64()
        };
        self.last_frame = now;
        self.needs_repaint = false;
    }

    /// Call at the end of `update()`. Schedules the next repaint if one is
    /// needed; otherwise egui sleeps until the next input event.
    pub fn end_frame(&mut self, ctx: &egui::Context) {
        self.frame += 1;

        if self.continuous {
            ctx.request_repaint_after(CONTINUOUS_INTERVAL);
        } else if self.needs_repaint {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_has_zero_delta() {
        let mut rc = RepaintController::new();
        let ctx = egui::Context::default();
        rc.begin_frame(&ctx);
        assert_eq!(rc.delta_seconds(), 0.0);
        rc.end_frame(&ctx);
        assert_eq!(rc.frame(), 1);
    }

    #[test]
    fn test_continuous_toggle() {
        let mut rc = RepaintController::new();
        assert!(!rc.is_continuous());
        rc.set_continuous(true);
        assert!(rc.is_continuous());
        rc.set_continuous(false);
        assert!(!rc.is_continuous());
    }
}
