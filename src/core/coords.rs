use serde::{Deserialize, Serialize};

#[cfg(feature = "parallel-projection")]
use rayon::prelude::*;

use crate::core::price_range::PriceDomain;
use crate::core::types::{OhlcvBar, Viewport};
use crate::core::viewport::VisibleRange;
use crate::error::ChartResult;

/// Fraction of the pane height used for price mapping; the rest is split
/// into equal top/bottom margins.
pub const USABLE_HEIGHT_RATIO: f64 = 0.95;

/// Maps bar indices and prices to pixels (and back) for one pane.
///
/// Every pane sharing the same viewport parameters computes x identically,
/// so gridlines, candles, and axis ticks for the same bar align exactly
/// across independently-built scenes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateMapper {
    viewport: Viewport,
    range: VisibleRange,
    domain: PriceDomain,
}

impl CoordinateMapper {
    pub fn new(
        viewport: Viewport,
        range: VisibleRange,
        domain: PriceDomain,
    ) -> ChartResult<Self> {
        viewport.validate()?;
        Ok(Self {
            viewport,
            range,
            domain,
        })
    }

    #[must_use]
    pub fn viewport(self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn range(self) -> VisibleRange {
        self.range
    }

    #[must_use]
    pub fn domain(self) -> PriceDomain {
        self.domain
    }

    /// Left edge of the bar body at `index`.
    ///
    /// The rightmost visible bar sits at
    /// `pane_width - bar_width - right_offset`; each bar further left is one
    /// candle space further left. Indices outside the visible range map
    /// off-pane rather than clamping.
    #[must_use]
    pub fn x_left(self, index: usize) -> f64 {
        let rightmost_left = self.viewport.pane_width_px
            - self.viewport.bar_width
            - self.viewport.right_offset_px;
        let dist_bars = self.range.end as f64 - index as f64;
        rightmost_left - dist_bars * self.viewport.candle_space()
    }

    /// Horizontal center of the bar at `index`; gridlines and axis ticks for
    /// a bar are drawn at this x.
    #[must_use]
    pub fn x_center(self, index: usize) -> f64 {
        self.x_left(index) + self.viewport.bar_width * 0.5
    }

    /// Visible bar index nearest to pixel `x`, for crosshair hit-testing.
    #[must_use]
    pub fn bar_index_at_x(self, x: f64) -> usize {
        let rightmost_center = self.x_center(self.range.end);
        let dist_bars = ((rightmost_center - x) / self.viewport.candle_space()).round();
        let max_dist = (self.range.end - self.range.start) as f64;
        let clamped = dist_bars.clamp(0.0, max_dist);
        self.range.end - clamped as usize
    }

    /// Maps a price onto the inverted y axis inside the padded usable band.
    ///
    /// A degenerate domain maps every price to the vertical center, never to
    /// NaN.
    #[must_use]
    pub fn y_of(self, price: f64) -> f64 {
        let height = self.viewport.pane_height_px;
        if self.domain.is_degenerate() {
            return height / 2.0;
        }
        let usable = height * USABLE_HEIGHT_RATIO;
        let top_padding = (height - usable) / 2.0;
        top_padding + (self.domain.max - price) / self.domain.range() * usable
    }

    /// Inverse of [`Self::y_of`]; a degenerate domain reports its single value.
    #[must_use]
    pub fn price_at_y(self, y: f64) -> f64 {
        if self.domain.is_degenerate() {
            return self.domain.min;
        }
        let height = self.viewport.pane_height_px;
        let usable = height * USABLE_HEIGHT_RATIO;
        let top_padding = (height - usable) / 2.0;
        self.domain.max - (y - top_padding) / usable * self.domain.range()
    }

    /// `true` when `x` falls inside the pane's horizontal span.
    #[must_use]
    pub fn is_x_on_pane(self, x: f64) -> bool {
        x >= 0.0 && x <= self.viewport.pane_width_px
    }
}

/// Projected candle geometry in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandleGeometry {
    pub bar_index: usize,
    pub center_x: f64,
    pub body_left: f64,
    pub body_right: f64,
    pub body_top: f64,
    pub body_bottom: f64,
    pub wick_top: f64,
    pub wick_bottom: f64,
    pub is_bullish: bool,
}

/// Projects the visible bars into deterministic render geometry.
///
/// Pure and side-effect free so it can back both rendering and regression
/// tests.
#[must_use]
pub fn project_visible_candles(bars: &[OhlcvBar], mapper: CoordinateMapper) -> Vec<CandleGeometry> {
    let range = mapper.range();
    let Some(visible) = bars.get(range.start..=range.end) else {
        return Vec::new();
    };

    #[cfg(feature = "parallel-projection")]
    {
        visible
            .par_iter()
            .enumerate()
            .map(|(offset, bar)| project_single_candle(range.start + offset, *bar, mapper))
            .collect()
    }

    #[cfg(not(feature = "parallel-projection"))]
    {
        visible
            .iter()
            .enumerate()
            .map(|(offset, bar)| project_single_candle(range.start + offset, *bar, mapper))
            .collect()
    }
}

fn project_single_candle(index: usize, bar: OhlcvBar, mapper: CoordinateMapper) -> CandleGeometry {
    let body_left = mapper.x_left(index);
    let open_y = mapper.y_of(bar.open);
    let close_y = mapper.y_of(bar.close);

    CandleGeometry {
        bar_index: index,
        center_x: mapper.x_center(index),
        body_left,
        body_right: body_left + mapper.viewport().bar_width,
        body_top: open_y.min(close_y),
        body_bottom: open_y.max(close_y),
        wick_top: mapper.y_of(bar.high),
        wick_bottom: mapper.y_of(bar.low),
        is_bullish: bar.is_bullish(),
    }
}

#[cfg(test)]
mod tests {
    use super::CoordinateMapper;
    use crate::core::price_range::PriceDomain;
    use crate::core::types::Viewport;
    use crate::core::viewport::VisibleRange;

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(
            Viewport::new(700.0, 400.0),
            VisibleRange { start: 900, end: 999 },
            PriceDomain {
                min: 90.0,
                max: 110.0,
            },
        )
        .expect("valid mapper")
    }

    #[test]
    fn rightmost_bar_respects_right_margin() {
        let mapper = mapper();
        assert_eq!(mapper.x_left(999), 700.0 - 5.0);
        // One candle space (7px) further left per bar.
        assert_eq!(mapper.x_left(998), 700.0 - 5.0 - 7.0);
    }

    #[test]
    fn hit_test_snaps_to_nearest_visible_bar() {
        let mapper = mapper();
        let x = mapper.x_center(950);
        assert_eq!(mapper.bar_index_at_x(x), 950);
        assert_eq!(mapper.bar_index_at_x(x + 2.0), 950);
        // Far off the left edge clamps to the first visible bar.
        assert_eq!(mapper.bar_index_at_x(-10_000.0), 900);
        assert_eq!(mapper.bar_index_at_x(10_000.0), 999);
    }

    #[test]
    fn degenerate_domain_maps_to_vertical_center() {
        let flat = CoordinateMapper::new(
            Viewport::new(700.0, 400.0),
            VisibleRange { start: 0, end: 9 },
            PriceDomain {
                min: 50.0,
                max: 50.0,
            },
        )
        .expect("valid mapper");
        assert_eq!(flat.y_of(50.0), 200.0);
        assert_eq!(flat.y_of(123.0), 200.0);
        assert_eq!(flat.price_at_y(200.0), 50.0);
    }
}
