use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::{CoordinateMapper, OhlcvBar, VisibleRange, format_price_label, series_min_max};
use crate::error::{ChartError, ChartResult};
use crate::indicators::{
    DataWindowEntry, Indicator, draw_axis_label, draw_horizontal_line, draw_series_line,
    last_visible_value, merge_ranges,
};
use crate::render::{Color, RenderFrame};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StochRsiConfig {
    pub rsi_length: usize,
    pub stoch_length: usize,
    pub k_smoothing: usize,
    pub d_smoothing: usize,
    pub overlay: bool,
    pub k_color: Color,
    pub d_color: Color,
}

impl Default for StochRsiConfig {
    fn default() -> Self {
        Self {
            rsi_length: 14,
            stoch_length: 14,
            k_smoothing: 3,
            d_smoothing: 3,
            overlay: false,
            k_color: Color::rgb(0.129, 0.588, 0.953),
            d_color: Color::rgb(1.0, 0.427, 0.0),
        }
    }
}

impl StochRsiConfig {
    fn validate(self) -> ChartResult<Self> {
        for (field, value) in [
            ("rsi_length", self.rsi_length),
            ("stoch_length", self.stoch_length),
            ("k_smoothing", self.k_smoothing),
            ("d_smoothing", self.d_smoothing),
        ] {
            if value == 0 {
                return Err(ChartError::InvalidData(format!(
                    "stoch rsi {field} must be >= 1"
                )));
            }
        }
        self.k_color.validate()?;
        self.d_color.validate()?;
        Ok(self)
    }
}

fn mean(window: &VecDeque<f64>) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}

fn push_capped(window: &mut VecDeque<f64>, value: f64, cap: usize) {
    if window.len() == cap {
        window.pop_front();
    }
    window.push_back(value);
}

/// Stochastic oscillator applied to a Wilder-smoothed RSI, with SMA-smoothed
/// %K and %D outputs on a 0..100 scale.
#[derive(Debug, Clone)]
pub struct StochasticRsi {
    config: StochRsiConfig,
    prev_close: Option<f64>,
    change_count: usize,
    init_gain_sum: f64,
    init_loss_sum: f64,
    avg_gain: Option<f64>,
    avg_loss: Option<f64>,
    rsi_window: VecDeque<f64>,
    stoch_window: VecDeque<f64>,
    k_window: VecDeque<f64>,
    k_line: Vec<Option<f64>>,
    d_line: Vec<Option<f64>>,
}

impl StochasticRsi {
    pub fn new(config: StochRsiConfig) -> ChartResult<Self> {
        Ok(Self {
            config: config.validate()?,
            prev_close: None,
            change_count: 0,
            init_gain_sum: 0.0,
            init_loss_sum: 0.0,
            avg_gain: None,
            avg_loss: None,
            rsi_window: VecDeque::new(),
            stoch_window: VecDeque::new(),
            k_window: VecDeque::new(),
            k_line: Vec::new(),
            d_line: Vec::new(),
        })
    }

    #[must_use]
    pub fn k_line(&self) -> &[Option<f64>] {
        &self.k_line
    }

    #[must_use]
    pub fn d_line(&self) -> &[Option<f64>] {
        &self.d_line
    }

    fn push(&mut self, bar: &OhlcvBar) {
        let Some(prev_close) = self.prev_close.replace(bar.close) else {
            self.k_line.push(None);
            self.d_line.push(None);
            return;
        };

        let change = bar.close - prev_close;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);
        self.change_count += 1;
        let length = self.config.rsi_length as f64;

        match (self.avg_gain, self.avg_loss) {
            (Some(avg_gain), Some(avg_loss)) => {
                self.avg_gain = Some((avg_gain * (length - 1.0) + gain) / length);
                self.avg_loss = Some((avg_loss * (length - 1.0) + loss) / length);
            }
            _ => {
                self.init_gain_sum += gain;
                self.init_loss_sum += loss;
                if self.change_count == self.config.rsi_length {
                    self.avg_gain = Some(self.init_gain_sum / length);
                    self.avg_loss = Some(self.init_loss_sum / length);
                }
            }
        }

        let (mut k, mut d) = (None, None);
        if let (Some(avg_gain), Some(avg_loss)) = (self.avg_gain, self.avg_loss) {
            let rsi = if avg_loss == 0.0 {
                100.0
            } else {
                100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
            };
            push_capped(&mut self.rsi_window, rsi, self.config.stoch_length);

            if self.rsi_window.len() == self.config.stoch_length {
                let mut low = f64::INFINITY;
                let mut high = f64::NEG_INFINITY;
                for value in &self.rsi_window {
                    low = low.min(*value);
                    high = high.max(*value);
                }
                // Flat RSI window pins the oscillator to zero.
                let stoch = if high > low {
                    (rsi - low) / (high - low) * 100.0
                } else {
                    0.0
                };
                push_capped(&mut self.stoch_window, stoch, self.config.k_smoothing);

                if self.stoch_window.len() == self.config.k_smoothing {
                    let k_value = mean(&self.stoch_window);
                    k = Some(k_value);
                    push_capped(&mut self.k_window, k_value, self.config.d_smoothing);
                    if self.k_window.len() == self.config.d_smoothing {
                        d = Some(mean(&self.k_window));
                    }
                }
            }
        }

        self.k_line.push(k);
        self.d_line.push(d);
    }
}

impl Indicator for StochasticRsi {
    fn name(&self) -> &'static str {
        "Stochastic RSI"
    }

    fn shares_price_scale(&self) -> bool {
        self.config.overlay
    }

    fn recompute(&mut self, bars: &[OhlcvBar]) {
        self.prev_close = None;
        self.change_count = 0;
        self.init_gain_sum = 0.0;
        self.init_loss_sum = 0.0;
        self.avg_gain = None;
        self.avg_loss = None;
        self.rsi_window.clear();
        self.stoch_window.clear();
        self.k_window.clear();
        self.k_line.clear();
        self.d_line.clear();
        for bar in bars {
            self.push(bar);
        }
    }

    fn append_bar(&mut self, bar: &OhlcvBar) {
        self.push(bar);
    }

    fn data_range(&self, _bars: &[OhlcvBar], range: VisibleRange) -> Option<(f64, f64)> {
        merge_ranges(
            series_min_max(&self.k_line, range),
            series_min_max(&self.d_line, range),
        )
    }

    fn paint(&self, _bars: &[OhlcvBar], mapper: CoordinateMapper, frame: &mut RenderFrame) {
        let guide = Color::rgba(1.0, 1.0, 1.0, 0.2);
        for level in [80.0, 50.0, 20.0] {
            draw_horizontal_line(level, mapper, guide, frame);
        }
        draw_series_line(&self.d_line, mapper, self.config.d_color, frame);
        draw_series_line(&self.k_line, mapper, self.config.k_color, frame);
    }

    fn paint_axis_labels(&self, mapper: CoordinateMapper, frame: &mut RenderFrame) {
        let range = mapper.range();
        if let Some(value) = last_visible_value(&self.d_line, range) {
            draw_axis_label(value, self.config.d_color, mapper, frame);
        }
        if let Some(value) = last_visible_value(&self.k_line, range) {
            draw_axis_label(value, self.config.k_color, mapper, frame);
        }
    }

    fn data_window(&self, _bars: &[OhlcvBar], index: usize) -> Vec<DataWindowEntry> {
        let k = self.k_line.get(index).copied().flatten();
        let d = self.d_line.get(index).copied().flatten();
        let (Some(k), Some(d)) = (k, d) else {
            return Vec::new();
        };

        vec![
            DataWindowEntry {
                label: format!(
                    "Stoch RSI {} {} {} {}",
                    self.config.k_smoothing,
                    self.config.d_smoothing,
                    self.config.rsi_length,
                    self.config.stoch_length,
                ),
                value_text: String::new(),
                color: None,
            },
            DataWindowEntry {
                label: String::new(),
                value_text: format_price_label(k),
                color: Some(self.config.k_color),
            },
            DataWindowEntry {
                label: String::new(),
                value_text: format_price_label(d),
                color: Some(self.config.d_color),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::{StochRsiConfig, StochasticRsi};
    use crate::core::OhlcvBar;
    use crate::indicators::Indicator;

    fn bar(index: usize, close: f64) -> OhlcvBar {
        OhlcvBar::new(index as i64, close, close + 1.0, close - 1.0, close, 0).unwrap()
    }

    fn zigzag_bars(count: usize) -> Vec<OhlcvBar> {
        (0..count)
            .map(|i| {
                let wobble = if i % 2 == 0 { 1.0 } else { -1.0 };
                bar(i, 100.0 + i as f64 * 0.25 + wobble)
            })
            .collect()
    }

    #[test]
    fn outputs_stay_in_percent_scale() {
        let config = StochRsiConfig {
            rsi_length: 5,
            stoch_length: 5,
            k_smoothing: 3,
            d_smoothing: 3,
            ..StochRsiConfig::default()
        };
        let mut stoch = StochasticRsi::new(config).unwrap();
        stoch.recompute(&zigzag_bars(60));

        let mut seen = 0;
        for value in stoch.k_line().iter().copied().flatten() {
            assert!((0.0..=100.0).contains(&value), "k out of scale: {value}");
            seen += 1;
        }
        assert!(seen > 0);
    }

    #[test]
    fn d_warms_up_after_k() {
        let config = StochRsiConfig {
            rsi_length: 4,
            stoch_length: 4,
            k_smoothing: 2,
            d_smoothing: 3,
            ..StochRsiConfig::default()
        };
        let mut stoch = StochasticRsi::new(config).unwrap();
        stoch.recompute(&zigzag_bars(40));

        let first_k = stoch.k_line().iter().position(Option::is_some).unwrap();
        let first_d = stoch.d_line().iter().position(Option::is_some).unwrap();
        assert_eq!(first_d, first_k + 2);
    }

    #[test]
    fn flat_closes_pin_oscillator_to_zero() {
        let config = StochRsiConfig {
            rsi_length: 3,
            stoch_length: 3,
            k_smoothing: 1,
            d_smoothing: 1,
            ..StochRsiConfig::default()
        };
        let mut stoch = StochasticRsi::new(config).unwrap();
        let bars: Vec<_> = (0..20).map(|i| bar(i, 50.0)).collect();
        stoch.recompute(&bars);

        let last = stoch.k_line().last().copied().flatten().unwrap();
        assert_eq!(last, 0.0);
    }
}
