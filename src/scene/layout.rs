use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

pub const PRICE_AXIS_WIDTH_PX: f64 = 64.0;
pub const DATE_AXIS_HEIGHT_PX: f64 = 32.0;
pub const PANE_DIVIDER_PX: f64 = 1.0;

/// Pixel partition of the chart surface.
///
/// The value axis strip runs down the right edge, the date axis strip along
/// the bottom, and the remaining area is split into `pane_count` equal-height
/// data panes separated by 1px dividers. All panes share the same width, so a
/// single bar x is valid in every pane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    pub total_width_px: f64,
    pub total_height_px: f64,
    pub pane_count: usize,
    pub pane_width_px: f64,
    pub pane_height_px: f64,
}

impl ChartLayout {
    pub fn compute(
        total_width_px: f64,
        total_height_px: f64,
        pane_count: usize,
    ) -> ChartResult<Self> {
        if pane_count == 0 {
            return Err(ChartError::InvalidData(
                "layout needs at least one pane".to_owned(),
            ));
        }
        let pane_width_px = total_width_px - PRICE_AXIS_WIDTH_PX - PANE_DIVIDER_PX;
        let stacked = total_height_px - DATE_AXIS_HEIGHT_PX - pane_count as f64 * PANE_DIVIDER_PX;
        let pane_height_px = (stacked / pane_count as f64).floor();
        if !pane_width_px.is_finite()
            || !pane_height_px.is_finite()
            || pane_width_px <= 0.0
            || pane_height_px <= 0.0
        {
            return Err(ChartError::InvalidViewport {
                width: total_width_px,
                height: total_height_px,
            });
        }
        Ok(Self {
            total_width_px,
            total_height_px,
            pane_count,
            pane_width_px,
            pane_height_px,
        })
    }

    /// Top edge of data pane `index` (0 is the price pane).
    #[must_use]
    pub fn pane_top(&self, index: usize) -> f64 {
        index as f64 * (self.pane_height_px + PANE_DIVIDER_PX)
    }

    /// Left edge of the value axis strip.
    #[must_use]
    pub fn axis_left(&self) -> f64 {
        self.pane_width_px + PANE_DIVIDER_PX
    }

    /// Top edge of the date axis strip.
    #[must_use]
    pub fn date_axis_top(&self) -> f64 {
        self.total_height_px - DATE_AXIS_HEIGHT_PX
    }
}
