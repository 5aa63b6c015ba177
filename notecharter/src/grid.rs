//! Tick/pixel transform and grid geometry.
//!
//! Everything here is a pure function of its parameters. The bottom edge of
//! the canvas always sits at the integer part of the scroll position, and
//! ticks grow upward, so both rendering and hit-testing share one mapping.

use crate::chart::TICKS_PER_MEASURE;

/// Width of one lane column in pixels.
pub const COL_WIDTH: f32 = 48.0;

/// Height of a drawn note body in pixels.
pub const NOTE_HEIGHT: f32 = 18.0;

/// Snapping resolutions, as subdivisions of one 192-tick measure.
pub const GRANULARITIES: [i64; 13] = [1, 2, 4, 6, 8, 12, 16, 24, 32, 48, 64, 96, 192];

/// Pixels-per-tick bounds.
pub const ROW_SIZE_MIN: i64 = 1;
pub const ROW_SIZE_MAX: i64 = 8;

/// Screen y (relative to the canvas top) of a tick.
pub fn tick_to_y(tick: i64, current_tick: i64, height: f32, row_size: i64) -> f32 {
    height - ((tick - current_tick) * row_size) as f32
}

/// Tick at a screen y (relative to the canvas top). Inverse of
/// [`tick_to_y`]; quantize separately with [`quantize_down`].
pub fn y_to_tick(y: f32, current_tick: i64, height: f32, row_size: i64) -> i64 {
    ((height - y) / row_size as f32) as i64 + current_tick
}

/// Snap a tick down to the nearest multiple of `192 / granularity`.
pub fn quantize_down(tick: i64, granularity: i64) -> i64 {
    let step = TICKS_PER_MEASURE / granularity;
    tick.div_euclid(step) * step
}

/// Screen x (relative to the canvas left) of a column.
pub fn column_to_x(column: usize) -> f32 {
    column as f32 * COL_WIDTH
}

/// Column index at a screen x (relative to the canvas left).
pub fn column_at(x: f32) -> usize {
    (x / COL_WIDTH).max(0.0) as usize
}

/// One family of horizontal gridlines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLevel {
    /// The granularity level this family belongs to.
    pub level: i64,
    /// Tick spacing between consecutive lines of the family.
    pub step_ticks: i64,
}

/// Gridline families to draw at the selected granularity, coarsest last so
/// emphasized lines paint on top.
///
/// A level draws whenever the selected granularity is divisible by it —
/// finer granularities therefore draw a superset of coarser gridlines, and
/// level 1 (the measure line, every 192 ticks) is always present.
pub fn grid_levels(granularity: i64) -> impl Iterator<Item = GridLevel> {
    GRANULARITIES
        .iter()
        .rev()
        .copied()
        .filter(move |level| granularity % level == 0)
        .map(|level| GridLevel {
            level,
            step_ticks: TICKS_PER_MEASURE / level,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bottom_edge_is_current_tick() {
        let y = tick_to_y(40, 40, 600.0, 3);
        assert_eq!(y, 600.0);
        // Ticks above the cursor move up the screen.
        assert!(tick_to_y(41, 40, 600.0, 3) < y);
    }

    #[test]
    fn test_round_trip_recovers_tick() {
        for row_size in ROW_SIZE_MIN..=ROW_SIZE_MAX {
            for tick in [0, 1, 37, 100, 191, 192, 1000] {
                let y = tick_to_y(tick, 12, 600.0, row_size);
                assert_eq!(y_to_tick(y, 12, 600.0, row_size), tick);
            }
        }
    }

    #[test]
    fn test_quantize_floors_to_step_multiples() {
        // Finest granularity: 192/192 = 1-tick steps, everything snaps to
        // itself.
        assert_eq!(quantize_down(100, 192), 100);
        // A pixel that lands between ticks floors to the step below.
        assert_eq!(quantize_down(100, 16), 96); // step = 12
        assert_eq!(quantize_down(191, 1), 0); // step = 192
        assert_eq!(quantize_down(192, 1), 192);
    }

    #[test]
    fn test_click_at_fractional_pixel_places_floor_tick() {
        // row_size 3: tick 100.4 sits at y = 600 - 100.4*3 = 298.8.
        let tick = y_to_tick(298.8, 0, 600.0, 3);
        assert_eq!(quantize_down(tick, 192), 100);
    }

    #[test]
    fn test_column_mapping() {
        assert_eq!(column_at(0.0), 0);
        assert_eq!(column_at(47.9), 0);
        assert_eq!(column_at(48.0), 1);
        assert_eq!(column_at(column_to_x(16) + 1.0), 16);
    }

    #[test]
    fn test_finer_granularity_draws_superset_of_gridlines() {
        let coarse: Vec<i64> = grid_levels(4).map(|g| g.level).collect();
        let fine: Vec<i64> = grid_levels(16).map(|g| g.level).collect();
        for level in &coarse {
            assert!(fine.contains(level));
        }
        // The measure line is always drawn.
        assert!(coarse.contains(&1));
        assert!(fine.contains(&1));
        // Levels that do not divide the selection are absent: 16 % 6 != 0.
        assert!(!fine.contains(&6));
    }

    #[test]
    fn test_grid_levels_are_coarsest_last() {
        let steps: Vec<i64> = grid_levels(192).map(|g| g.step_ticks).collect();
        let mut sorted = steps.clone();
        sorted.sort();
        assert_eq!(steps, sorted);
        assert_eq!(*steps.last().unwrap(), TICKS_PER_MEASURE);
    }
}
