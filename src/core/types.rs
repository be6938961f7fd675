use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Normalizes an ambiguous integer timestamp to milliseconds.
///
/// Values inside the open interval `(1e9, 2e10)` are treated as unix seconds
/// and scaled by 1000; everything else is passed through as milliseconds.
/// The heuristic misreads dates before 2001 and after ~2255; such values
/// flow through unchanged rather than failing.
///
/// Every time-domain consumer in the crate goes through this one function so
/// panes can never disagree on the unit.
#[must_use]
pub const fn normalize_timestamp_ms(time: i64) -> i64 {
    if time > 1_000_000_000 && time < 20_000_000_000 {
        time * 1000
    } else {
        time
    }
}

/// Canonical OHLCV bar, ordered ascending by `time` within a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    /// Raw integer timestamp; seconds or milliseconds, see [`normalize_timestamp_ms`].
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl OhlcvBar {
    /// Builds a validated bar from raw values.
    ///
    /// Invariants:
    /// - all price values are finite
    /// - `low <= high`
    /// - `open` and `close` are within `[low, high]`
    pub fn new(
        time: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> ChartResult<Self> {
        if !open.is_finite() || !high.is_finite() || !low.is_finite() || !close.is_finite() {
            return Err(ChartError::InvalidData(
                "ohlc values must be finite".to_owned(),
            ));
        }

        if low > high {
            return Err(ChartError::InvalidData(
                "ohlc low must be <= high".to_owned(),
            ));
        }

        if open < low || open > high || close < low || close > high {
            return Err(ChartError::InvalidData(
                "ohlc open/close must be within low/high range".to_owned(),
            ));
        }

        Ok(Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// Converts strongly-typed temporal/decimal input into a validated bar.
    pub fn from_decimal(
        time: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: u64,
    ) -> ChartResult<Self> {
        Self::new(
            time.timestamp_millis(),
            decimal_to_f64(open, "open")?,
            decimal_to_f64(high, "high")?,
            decimal_to_f64(low, "low")?,
            decimal_to_f64(close, "close")?,
            volume,
        )
    }

    /// Bar time normalized to milliseconds.
    #[must_use]
    pub const fn time_ms(self) -> i64 {
        normalize_timestamp_ms(self.time)
    }

    /// Returns `true` when close price is greater than or equal to open price.
    #[must_use]
    pub fn is_bullish(self) -> bool {
        self.close >= self.open
    }
}

/// Pane pixel dimensions plus the bar geometry and scroll state that drive
/// the visible-range and coordinate mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub pane_width_px: f64,
    pub pane_height_px: f64,
    /// Candle body width in pixels.
    pub bar_width: f64,
    /// Gap between candle bodies in pixels.
    pub bar_spacing: f64,
    /// Count of bars the rightmost visible bar is shifted left from the
    /// newest bar. Out-of-range values are clamped, never rejected.
    pub offset_bars: usize,
    /// Fixed right margin between the newest bar and the pane edge.
    pub right_offset_px: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(pane_width_px: f64, pane_height_px: f64) -> Self {
        Self {
            pane_width_px,
            pane_height_px,
            bar_width: 5.0,
            bar_spacing: 2.0,
            offset_bars: 0,
            right_offset_px: 0.0,
        }
    }

    #[must_use]
    pub fn with_bar_geometry(mut self, bar_width: f64, bar_spacing: f64) -> Self {
        self.bar_width = bar_width;
        self.bar_spacing = bar_spacing;
        self
    }

    #[must_use]
    pub fn with_offset_bars(mut self, offset_bars: usize) -> Self {
        self.offset_bars = offset_bars;
        self
    }

    #[must_use]
    pub fn with_right_offset(mut self, right_offset_px: f64) -> Self {
        self.right_offset_px = right_offset_px;
        self
    }

    /// Horizontal pixel span occupied by one bar and its trailing gap.
    #[must_use]
    pub fn candle_space(self) -> f64 {
        self.bar_width + self.bar_spacing
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.pane_width_px.is_finite()
            && self.pane_height_px.is_finite()
            && self.pane_width_px > 0.0
            && self.pane_height_px > 0.0
            && self.bar_width.is_finite()
            && self.bar_width > 0.0
            && self.bar_spacing.is_finite()
            && self.bar_spacing >= 0.0
            && self.right_offset_px.is_finite()
            && self.right_offset_px >= 0.0
    }

    pub fn validate(self) -> ChartResult<()> {
        if !self.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.pane_width_px,
                height: self.pane_height_px,
            });
        }
        Ok(())
    }
}

fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

#[cfg(test)]
mod tests {
    use super::{OhlcvBar, normalize_timestamp_ms};

    #[test]
    fn seconds_window_is_scaled_to_milliseconds() {
        assert_eq!(normalize_timestamp_ms(1_700_000_000), 1_700_000_000_000);
        // Already milliseconds: outside the seconds window, passed through.
        assert_eq!(normalize_timestamp_ms(1_700_000_000_000), 1_700_000_000_000);
        // Boundary values are not scaled (open interval).
        assert_eq!(normalize_timestamp_ms(1_000_000_000), 1_000_000_000);
        assert_eq!(normalize_timestamp_ms(20_000_000_000), 20_000_000_000);
        assert_eq!(normalize_timestamp_ms(0), 0);
    }

    #[test]
    fn bar_validation_rejects_out_of_range_open() {
        let result = OhlcvBar::new(0, 12.0, 11.0, 9.0, 10.0, 0);
        assert!(result.is_err());
    }
}
