use serde::{Deserialize, Serialize};

use crate::core::types::Viewport;

/// Inclusive index span of bars currently fitting in a pane's pixel width.
///
/// Derived per render pass, never stored. Invariant: `start <= end` and both
/// index into the bar series that produced the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleRange {
    pub start: usize,
    pub end: usize,
}

impl VisibleRange {
    /// Number of bars in the range.
    #[must_use]
    pub const fn len(self) -> usize {
        self.end - self.start + 1
    }

    /// A constructed range always holds at least one bar.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        false
    }

    #[must_use]
    pub const fn contains(self, index: usize) -> bool {
        index >= self.start && index <= self.end
    }
}

/// Determines which contiguous bar span fits in `pane_width_px`.
///
/// The rightmost visible bar is the newest bar shifted left by
/// `offset_bars`; offsets scrolling past the start are clamped silently.
/// Returns `None` when nothing can be drawn (no bars, or the pane cannot fit
/// a single bar); callers must skip rendering rather than treat this as an
/// error.
#[must_use]
pub fn visible_range(
    total_bars: usize,
    pane_width_px: f64,
    bar_width: f64,
    bar_spacing: f64,
    offset_bars: usize,
) -> Option<VisibleRange> {
    if total_bars == 0 {
        return None;
    }

    let candle_space = bar_width + bar_spacing;
    if !candle_space.is_finite() || candle_space <= 0.0 {
        return None;
    }
    if !pane_width_px.is_finite() || pane_width_px <= 0.0 {
        return None;
    }

    let max_visible = (pane_width_px / candle_space).floor() as usize;
    let visible_bars = total_bars.min(max_visible);
    if visible_bars == 0 {
        return None;
    }

    let clamped_offset = offset_bars.min(total_bars - 1);
    let rightmost = total_bars - 1 - clamped_offset;
    let start = rightmost.saturating_sub(visible_bars - 1);

    Some(VisibleRange {
        start,
        end: rightmost,
    })
}

/// [`visible_range`] with parameters taken from a [`Viewport`].
#[must_use]
pub fn visible_range_for(total_bars: usize, viewport: Viewport) -> Option<VisibleRange> {
    visible_range(
        total_bars,
        viewport.pane_width_px,
        viewport.bar_width,
        viewport.bar_spacing,
        viewport.offset_bars,
    )
}

#[cfg(test)]
mod tests {
    use super::visible_range;

    #[test]
    fn newest_bars_fill_the_pane() {
        // 700px / (5 + 2) = 100 bars max.
        let range = visible_range(1000, 700.0, 5.0, 2.0, 0).expect("visible range");
        assert_eq!(range.start, 900);
        assert_eq!(range.end, 999);
        assert_eq!(range.len(), 100);
    }

    #[test]
    fn short_series_is_fully_visible() {
        let range = visible_range(10, 700.0, 5.0, 2.0, 0).expect("visible range");
        assert_eq!(range.start, 0);
        assert_eq!(range.end, 9);
    }

    #[test]
    fn pane_narrower_than_one_bar_draws_nothing() {
        assert!(visible_range(1000, 5.0, 5.0, 2.0, 0).is_none());
        assert!(visible_range(0, 700.0, 5.0, 2.0, 0).is_none());
    }
}
