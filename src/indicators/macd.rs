use serde::{Deserialize, Serialize};

use crate::core::{CoordinateMapper, OhlcvBar, VisibleRange, format_price_label, series_min_max};
use crate::error::{ChartError, ChartResult};
use crate::indicators::{
    DataWindowEntry, Indicator, draw_axis_label, draw_histogram, draw_horizontal_line,
    draw_series_line, last_visible_value, merge_ranges,
};
use crate::render::{Color, RenderFrame};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdConfig {
    pub short_period: usize,
    pub long_period: usize,
    pub signal_period: usize,
    pub overlay: bool,
    pub macd_color: Color,
    pub signal_color: Color,
    pub histogram_color: Color,
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self {
            short_period: 12,
            long_period: 26,
            signal_period: 9,
            overlay: false,
            macd_color: Color::rgb(0.129, 0.588, 0.953),
            signal_color: Color::rgb(1.0, 0.596, 0.0),
            histogram_color: Color::rgba(0.5, 0.5, 0.5, 0.7),
        }
    }
}

impl MacdConfig {
    fn validate(self) -> ChartResult<Self> {
        if self.short_period == 0 || self.long_period == 0 || self.signal_period == 0 {
            return Err(ChartError::InvalidData(
                "macd periods must be >= 1".to_owned(),
            ));
        }
        self.macd_color.validate()?;
        self.signal_color.validate()?;
        self.histogram_color.validate()?;
        Ok(self)
    }

    fn short_multiplier(self) -> f64 {
        2.0 / (self.short_period as f64 + 1.0)
    }

    fn long_multiplier(self) -> f64 {
        2.0 / (self.long_period as f64 + 1.0)
    }

    fn signal_multiplier(self) -> f64 {
        2.0 / (self.signal_period as f64 + 1.0)
    }
}

/// MACD: short/long EMA difference, signal EMA, and their histogram.
///
/// EMAs are seeded from the first close, so outputs exist from the first
/// bar on; the rolling state is just the three previous EMA values.
#[derive(Debug, Clone)]
pub struct Macd {
    config: MacdConfig,
    ema_short: Option<f64>,
    ema_long: Option<f64>,
    ema_signal: Option<f64>,
    macd_line: Vec<Option<f64>>,
    signal_line: Vec<Option<f64>>,
    histogram: Vec<Option<f64>>,
}

impl Macd {
    pub fn new(config: MacdConfig) -> ChartResult<Self> {
        Ok(Self {
            config: config.validate()?,
            ema_short: None,
            ema_long: None,
            ema_signal: None,
            macd_line: Vec::new(),
            signal_line: Vec::new(),
            histogram: Vec::new(),
        })
    }

    #[must_use]
    pub fn macd_line(&self) -> &[Option<f64>] {
        &self.macd_line
    }

    #[must_use]
    pub fn signal_line(&self) -> &[Option<f64>] {
        &self.signal_line
    }

    #[must_use]
    pub fn histogram(&self) -> &[Option<f64>] {
        &self.histogram
    }

    fn push(&mut self, close: f64) {
        let short = match self.ema_short {
            Some(previous) => (close - previous) * self.config.short_multiplier() + previous,
            None => close,
        };
        let long = match self.ema_long {
            Some(previous) => (close - previous) * self.config.long_multiplier() + previous,
            None => close,
        };
        self.ema_short = Some(short);
        self.ema_long = Some(long);

        let macd = short - long;
        let signal = match self.ema_signal {
            Some(previous) => (macd - previous) * self.config.signal_multiplier() + previous,
            None => macd,
        };
        self.ema_signal = Some(signal);

        self.macd_line.push(Some(macd));
        self.signal_line.push(Some(signal));
        self.histogram.push(Some(macd - signal));
    }
}

impl Indicator for Macd {
    fn name(&self) -> &'static str {
        "MACD"
    }

    fn shares_price_scale(&self) -> bool {
        self.config.overlay
    }

    fn recompute(&mut self, bars: &[OhlcvBar]) {
        self.ema_short = None;
        self.ema_long = None;
        self.ema_signal = None;
        self.macd_line.clear();
        self.signal_line.clear();
        self.histogram.clear();
        for bar in bars {
            self.push(bar.close);
        }
    }

    fn append_bar(&mut self, bar: &OhlcvBar) {
        self.push(bar.close);
    }

    fn data_range(&self, _bars: &[OhlcvBar], range: VisibleRange) -> Option<(f64, f64)> {
        merge_ranges(
            series_min_max(&self.macd_line, range),
            series_min_max(&self.signal_line, range),
        )
    }

    fn paint(&self, _bars: &[OhlcvBar], mapper: CoordinateMapper, frame: &mut RenderFrame) {
        draw_horizontal_line(0.0, mapper, self.config.histogram_color, frame);
        draw_histogram(&self.histogram, mapper, self.config.histogram_color, frame);
        draw_series_line(&self.macd_line, mapper, self.config.macd_color, frame);
        draw_series_line(&self.signal_line, mapper, self.config.signal_color, frame);
    }

    fn paint_axis_labels(&self, mapper: CoordinateMapper, frame: &mut RenderFrame) {
        let range = mapper.range();
        if let Some(value) = last_visible_value(&self.macd_line, range) {
            draw_axis_label(value, self.config.macd_color, mapper, frame);
        }
        if let Some(value) = last_visible_value(&self.signal_line, range) {
            draw_axis_label(value, self.config.signal_color, mapper, frame);
        }
    }

    fn data_window(&self, _bars: &[OhlcvBar], index: usize) -> Vec<DataWindowEntry> {
        let macd = self.macd_line.get(index).copied().flatten();
        let signal = self.signal_line.get(index).copied().flatten();
        let (Some(macd), Some(signal)) = (macd, signal) else {
            return Vec::new();
        };

        vec![
            DataWindowEntry {
                label: format!(
                    "MACD {} {} {}",
                    self.config.short_period, self.config.signal_period, self.config.long_period
                ),
                value_text: String::new(),
                color: None,
            },
            DataWindowEntry {
                label: String::new(),
                value_text: format_price_label(macd),
                color: Some(self.config.macd_color),
            },
            DataWindowEntry {
                label: String::new(),
                value_text: format_price_label(signal),
                color: Some(self.config.signal_color),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::{Macd, MacdConfig};
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
    fn first_bar_seeds_all_series_to_zero() {
        let mut macd = Macd::new(MacdConfig::default()).unwrap();
        macd.recompute(&bars(&[100.0]));

        assert_eq!(macd.macd_line()[0], Some(0.0));
        assert_eq!(macd.signal_line()[0], Some(0.0));
        assert_eq!(macd.histogram()[0], Some(0.0));
    }

    #[test]
    fn histogram_is_macd_minus_signal() {
        let mut macd = Macd::new(MacdConfig {
            short_period: 3,
            long_period: 6,
            signal_period: 2,
            ..MacdConfig::default()
        })
        .unwrap();
        macd.recompute(&bars(&[10.0, 11.0, 12.0, 13.0, 12.0, 11.0, 10.0]));

        for index in 0..7 {
            let line = macd.macd_line()[index].unwrap();
            let signal = macd.signal_line()[index].unwrap();
            let histogram = macd.histogram()[index].unwrap();
            assert!((histogram - (line - signal)).abs() <= 1e-12);
        }
    }

    #[test]
    fn rising_closes_give_positive_macd() {
        let mut macd = Macd::new(MacdConfig {
            short_period: 3,
            long_period: 9,
            signal_period: 3,
            ..MacdConfig::default()
        })
        .unwrap();
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        macd.recompute(&bars(&closes));

        assert!(macd.macd_line()[29].unwrap() > 0.0);
    }
}
