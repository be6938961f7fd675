use serde::{Deserialize, Serialize};

use crate::core::{CoordinateMapper, OhlcvBar, VisibleRange, format_price_label, series_min_max};
use crate::error::{ChartError, ChartResult};
use crate::indicators::{
    DataWindowEntry, Indicator, PriceSource, draw_axis_label, draw_series_line,
    last_visible_value,
};
use crate::render::{Color, RenderFrame};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmaConfig {
    pub length: usize,
    /// Bars the averaging window is displaced into the past; 0 means the
    /// window ends at the current bar.
    pub offset: usize,
    pub source: PriceSource,
    /// Overlay on the price pane's scale, or use an independent sub-pane.
    pub overlay: bool,
    pub color: Color,
}

impl Default for SmaConfig {
    fn default() -> Self {
        Self {
            length: 9,
            offset: 0,
            source: PriceSource::Close,
            overlay: true,
            color: Color::rgb(0.129, 0.588, 0.953),
        }
    }
}

impl SmaConfig {
    fn validate(self) -> ChartResult<Self> {
        if self.length == 0 {
            return Err(ChartError::InvalidData(
                "moving average length must be >= 1".to_owned(),
            ));
        }
        self.color.validate()?;
        Ok(self)
    }
}

/// Simple moving average with an O(1) rolling-sum append path.
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    config: SmaConfig,
    source_values: Vec<f64>,
    window_sum: f64,
    values: Vec<Option<f64>>,
}

impl SimpleMovingAverage {
    pub fn new(config: SmaConfig) -> ChartResult<Self> {
        Ok(Self {
            config: config.validate()?,
            source_values: Vec::new(),
            window_sum: 0.0,
            values: Vec::new(),
        })
    }

    #[must_use]
    pub fn config(&self) -> SmaConfig {
        self.config
    }

    /// Bar-aligned output; `None` while the window is warming up.
    #[must_use]
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    fn push(&mut self, source_value: f64) {
        self.source_values.push(source_value);
        let bar_index = self.source_values.len() - 1;

        // The window ends `offset` bars behind the bar being appended.
        let Some(window_end) = bar_index.checked_sub(self.config.offset) else {
            self.values.push(None);
            return;
        };

        self.window_sum += self.source_values[window_end];
        if window_end >= self.config.length {
            self.window_sum -= self.source_values[window_end - self.config.length];
        }

        if window_end + 1 >= self.config.length {
            self.values.push(Some(self.window_sum / self.config.length as f64));
        } else {
            self.values.push(None);
        }
    }
}

impl Indicator for SimpleMovingAverage {
    fn name(&self) -> &'static str {
        "Moving Average"
    }

    fn shares_price_scale(&self) -> bool {
        self.config.overlay
    }

    fn recompute(&mut self, bars: &[OhlcvBar]) {
        self.source_values.clear();
        self.values.clear();
        self.window_sum = 0.0;
        self.source_values.reserve(bars.len());
        self.values.reserve(bars.len());
        for bar in bars {
            self.push(self.config.source.of(bar));
        }
    }

    fn append_bar(&mut self, bar: &OhlcvBar) {
        self.push(self.config.source.of(bar));
    }

    fn data_range(&self, _bars: &[OhlcvBar], range: VisibleRange) -> Option<(f64, f64)> {
        series_min_max(&self.values, range)
    }

    fn paint(&self, _bars: &[OhlcvBar], mapper: CoordinateMapper, frame: &mut RenderFrame) {
        draw_series_line(&self.values, mapper, self.config.color, frame);
    }

    fn paint_axis_labels(&self, mapper: CoordinateMapper, frame: &mut RenderFrame) {
        if let Some(value) = last_visible_value(&self.values, mapper.range()) {
            draw_axis_label(value, self.config.color, mapper, frame);
        }
    }

    fn data_window(&self, _bars: &[OhlcvBar], index: usize) -> Vec<DataWindowEntry> {
        let Some(value) = self.values.get(index).copied().flatten() else {
            return Vec::new();
        };

        let mut label = format!("MA {}", self.config.length);
        if self.config.offset > 0 {
            label.push_str(&format!(" {}", self.config.offset));
        }
        vec![DataWindowEntry {
            label,
            value_text: format_price_label(value),
            color: Some(self.config.color),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::{SimpleMovingAverage, SmaConfig};
    use crate::core::OhlcvBar;
    use crate::indicators::Indicator;

    fn bars(closes: &[f64]) -> Vec<OhlcvBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar::new(i as i64, close, close, close, close, 0).unwrap())
            .collect()
    }

    #[test]
    fn warmup_then_rolling_mean() {
        let mut sma = SimpleMovingAverage::new(SmaConfig {
            length: 3,
            ..SmaConfig::default()
        })
        .unwrap();
        sma.recompute(&bars(&[1.0, 2.0, 3.0, 4.0, 5.0]));

        assert_eq!(sma.values()[0], None);
        assert_eq!(sma.values()[1], None);
        assert_eq!(sma.values()[2], Some(2.0));
        assert_eq!(sma.values()[3], Some(3.0));
        assert_eq!(sma.values()[4], Some(4.0));
    }

    #[test]
    fn offset_displaces_the_window() {
        let mut sma = SimpleMovingAverage::new(SmaConfig {
            length: 2,
            offset: 1,
            ..SmaConfig::default()
        })
        .unwrap();
        sma.recompute(&bars(&[1.0, 2.0, 3.0, 4.0]));

        // Window at bar i covers sources [i-2, i-1].
        assert_eq!(sma.values(), &[None, None, Some(1.5), Some(2.5)]);
    }

    #[test]
    fn zero_length_is_rejected() {
        let config = SmaConfig {
            length: 0,
            ..SmaConfig::default()
        };
        assert!(SimpleMovingAverage::new(config).is_err());
    }
}
