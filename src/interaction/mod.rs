//! Zoom, scroll, and crosshair state transitions.
//!
//! All transitions are pure functions over [`Viewport`] and plain cursor
//! structs; the engine owns the state and applies them.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::{CoordinateMapper, Viewport};

pub const MIN_BAR_WIDTH: f64 = 1.0;
pub const MAX_BAR_WIDTH: f64 = 100.0;
pub const MIN_BAR_SPACING: f64 = 0.0;
pub const MAX_BAR_SPACING: f64 = 50.0;

const BAR_WIDTH_STEP: f64 = 1.0;
const BAR_SPACING_STEP: f64 = 0.5;

/// Widens bars and gaps by one step, clamped to the upper limits.
pub fn zoom_in(viewport: &mut Viewport) {
    viewport.bar_width = (viewport.bar_width + BAR_WIDTH_STEP).min(MAX_BAR_WIDTH);
    viewport.bar_spacing = (viewport.bar_spacing + BAR_SPACING_STEP).min(MAX_BAR_SPACING);
}

/// Narrows bars and gaps by one step, clamped to the lower limits.
pub fn zoom_out(viewport: &mut Viewport) {
    viewport.bar_width = (viewport.bar_width - BAR_WIDTH_STEP).max(MIN_BAR_WIDTH);
    viewport.bar_spacing = (viewport.bar_spacing - BAR_SPACING_STEP).max(MIN_BAR_SPACING);
}

/// Shifts the view `step` bars further into the past. The upper bound is
/// enforced later by visible-range clamping, not here.
pub fn scroll_back(viewport: &mut Viewport, step: usize) {
    viewport.offset_bars = viewport.offset_bars.saturating_add(step);
}

/// Shifts the view `step` bars toward the newest data, saturating at the
/// live edge.
pub fn scroll_forward(viewport: &mut Viewport, step: usize) {
    viewport.offset_bars = viewport.offset_bars.saturating_sub(step);
}

/// Raw pointer position in price-pane pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    pub x: f64,
    pub y: f64,
}

/// Crosshair position after snapping the cursor to the nearest visible bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrosshairSnap {
    pub bar_index: usize,
    /// Snapped vertical-line x, at the bar's center.
    pub x_px: f64,
    /// Cursor y, unsnapped.
    pub y_px: f64,
    /// Price under the cursor on the pane's scale.
    pub price: f64,
}

/// Snaps the cursor to the closest visible bar center, or `None` when the
/// cursor is off the pane.
#[must_use]
pub fn snap_crosshair(mapper: CoordinateMapper, cursor: Cursor) -> Option<CrosshairSnap> {
    if !mapper.is_x_on_pane(cursor.x) {
        return None;
    }
    let range = mapper.range();
    let bar_index = (range.start..=range.end)
        .min_by_key(|&index| OrderedFloat((mapper.x_center(index) - cursor.x).abs()))?;

    Some(CrosshairSnap {
        bar_index,
        x_px: mapper.x_center(bar_index),
        y_px: cursor.y,
        price: mapper.price_at_y(cursor.y),
    })
}

#[cfg(test)]
mod tests {
    use super::{
        Cursor, MAX_BAR_WIDTH, MIN_BAR_SPACING, scroll_back, scroll_forward, snap_crosshair,
        zoom_in, zoom_out,
    };
    use crate::core::{CoordinateMapper, PriceDomain, Viewport, VisibleRange};

    #[test]
    fn zoom_steps_and_clamps() {
        let mut viewport = Viewport::new(700.0, 400.0);
        zoom_in(&mut viewport);
        assert_eq!(viewport.bar_width, 6.0);
        assert_eq!(viewport.bar_spacing, 2.5);

        for _ in 0..500 {
            zoom_in(&mut viewport);
        }
        assert_eq!(viewport.bar_width, MAX_BAR_WIDTH);

        for _ in 0..500 {
            zoom_out(&mut viewport);
        }
        assert_eq!(viewport.bar_width, 1.0);
        assert_eq!(viewport.bar_spacing, MIN_BAR_SPACING);
    }

    #[test]
    fn scroll_saturates_at_live_edge() {
        let mut viewport = Viewport::new(700.0, 400.0);
        scroll_forward(&mut viewport, 3);
        assert_eq!(viewport.offset_bars, 0);
        scroll_back(&mut viewport, 10);
        scroll_forward(&mut viewport, 4);
        assert_eq!(viewport.offset_bars, 6);
    }

    #[test]
    fn crosshair_snaps_to_bar_center() {
        let mapper = CoordinateMapper::new(
            Viewport::new(700.0, 400.0),
            VisibleRange { start: 0, end: 99 },
            PriceDomain {
                min: 90.0,
                max: 110.0,
            },
        )
        .unwrap();
        let cursor = Cursor {
            x: mapper.x_center(50) + 2.0,
            y: 200.0,
        };
        let snap = snap_crosshair(mapper, cursor).unwrap();
        assert_eq!(snap.bar_index, 50);
        assert_eq!(snap.x_px, mapper.x_center(50));

        assert!(snap_crosshair(mapper, Cursor { x: -5.0, y: 0.0 }).is_none());
    }
}
