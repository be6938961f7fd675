use serde::{Deserialize, Serialize};

use crate::core::{CoordinateMapper, OhlcvBar, VisibleRange, format_price_label, series_min_max};
use crate::error::{ChartError, ChartResult};
use crate::indicators::{
    DataWindowEntry, Indicator, PriceSource, draw_axis_label, draw_series_line,
    last_visible_value, merge_ranges,
};
use crate::render::{Color, RenderFrame};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerConfig {
    pub length: usize,
    pub offset: usize,
    /// Standard deviations between the middle band and each outer band.
    pub stddev: f64,
    pub source: PriceSource,
    pub overlay: bool,
    pub upper_color: Color,
    pub middle_color: Color,
    pub lower_color: Color,
}

impl Default for BollingerConfig {
    fn default() -> Self {
        Self {
            length: 20,
            offset: 0,
            stddev: 2.0,
            source: PriceSource::Close,
            overlay: true,
            upper_color: Color::rgb(0.129, 0.588, 0.953),
            middle_color: Color::rgb(1.0, 0.596, 0.0),
            lower_color: Color::rgb(0.129, 0.588, 0.953),
        }
    }
}

impl BollingerConfig {
    fn validate(self) -> ChartResult<Self> {
        if self.length == 0 {
            return Err(ChartError::InvalidData(
                "bollinger length must be >= 1".to_owned(),
            ));
        }
        if !self.stddev.is_finite() || self.stddev <= 0.0 {
            return Err(ChartError::InvalidData(
                "bollinger stddev multiplier must be finite and > 0".to_owned(),
            ));
        }
        self.upper_color.validate()?;
        self.middle_color.validate()?;
        self.lower_color.validate()?;
        Ok(self)
    }
}

/// Bollinger Bands over a rolling sum + sum-of-squares window.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    config: BollingerConfig,
    source_values: Vec<f64>,
    window_sum: f64,
    window_sum_squares: f64,
    middle: Vec<Option<f64>>,
    upper: Vec<Option<f64>>,
    lower: Vec<Option<f64>>,
}

impl BollingerBands {
    pub fn new(config: BollingerConfig) -> ChartResult<Self> {
        Ok(Self {
            config: config.validate()?,
            source_values: Vec::new(),
            window_sum: 0.0,
            window_sum_squares: 0.0,
            middle: Vec::new(),
            upper: Vec::new(),
            lower: Vec::new(),
        })
    }

    #[must_use]
    pub fn middle_band(&self) -> &[Option<f64>] {
        &self.middle
    }

    #[must_use]
    pub fn upper_band(&self) -> &[Option<f64>] {
        &self.upper
    }

    #[must_use]
    pub fn lower_band(&self) -> &[Option<f64>] {
        &self.lower
    }

    fn push(&mut self, source_value: f64) {
        self.source_values.push(source_value);
        let bar_index = self.source_values.len() - 1;

        let Some(window_end) = bar_index.checked_sub(self.config.offset) else {
            self.push_warmup();
            return;
        };

        let entering = self.source_values[window_end];
        self.window_sum += entering;
        self.window_sum_squares += entering * entering;
        if window_end >= self.config.length {
            let leaving = self.source_values[window_end - self.config.length];
            self.window_sum -= leaving;
            self.window_sum_squares -= leaving * leaving;
        }

        if window_end + 1 < self.config.length {
            self.push_warmup();
            return;
        }

        let length = self.config.length as f64;
        let mean = self.window_sum / length;
        // Accumulated float error can push the variance fractionally negative.
        let variance = (self.window_sum_squares / length - mean * mean).max(0.0);
        let deviation = self.config.stddev * variance.sqrt();

        self.middle.push(Some(mean));
        self.upper.push(Some(mean + deviation));
        self.lower.push(Some(mean - deviation));
    }

    fn push_warmup(&mut self) {
        self.middle.push(None);
        self.upper.push(None);
        self.lower.push(None);
    }
}

impl Indicator for BollingerBands {
    fn name(&self) -> &'static str {
        "Bollinger Bands"
    }

    fn shares_price_scale(&self) -> bool {
        self.config.overlay
    }

    fn recompute(&mut self, bars: &[OhlcvBar]) {
        self.source_values.clear();
        self.middle.clear();
        self.upper.clear();
        self.lower.clear();
        self.window_sum = 0.0;
        self.window_sum_squares = 0.0;
        for bar in bars {
            self.push(self.config.source.of(bar));
        }
    }

    fn append_bar(&mut self, bar: &OhlcvBar) {
        self.push(self.config.source.of(bar));
    }

    fn data_range(&self, _bars: &[OhlcvBar], range: VisibleRange) -> Option<(f64, f64)> {
        // The outer bands bound the middle one by construction.
        let upper = series_min_max(&self.upper, range);
        let lower = series_min_max(&self.lower, range);
        merge_ranges(upper, lower)
    }

    fn paint(&self, _bars: &[OhlcvBar], mapper: CoordinateMapper, frame: &mut RenderFrame) {
        draw_series_line(&self.upper, mapper, self.config.upper_color, frame);
        draw_series_line(&self.lower, mapper, self.config.lower_color, frame);
        draw_series_line(&self.middle, mapper, self.config.middle_color, frame);
    }

    fn paint_axis_labels(&self, mapper: CoordinateMapper, frame: &mut RenderFrame) {
        let range = mapper.range();
        for (series, color) in [
            (&self.upper, self.config.upper_color),
            (&self.lower, self.config.lower_color),
            (&self.middle, self.config.middle_color),
        ] {
            if let Some(value) = last_visible_value(series, range) {
                draw_axis_label(value, color, mapper, frame);
            }
        }
    }

    fn data_window(&self, _bars: &[OhlcvBar], index: usize) -> Vec<DataWindowEntry> {
        let values = [
            (&self.upper, self.config.upper_color),
            (&self.middle, self.config.middle_color),
            (&self.lower, self.config.lower_color),
        ];

        let mut entries = vec![DataWindowEntry {
            label: format!("BB {} {}", self.config.length, self.config.stddev),
            value_text: String::new(),
            color: None,
        }];
        for (series, color) in values {
            let Some(value) = series.get(index).copied().flatten() else {
                return Vec::new();
            };
            entries.push(DataWindowEntry {
                label: String::new(),
                value_text: format_price_label(value),
                color: Some(color),
            });
        }
        entries
    }
}
