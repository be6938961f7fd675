use serde::{Deserialize, Serialize};

use crate::core::{CoordinateMapper, OhlcvBar, VisibleRange, format_price_label, series_min_max};
use crate::error::{ChartError, ChartResult};
use crate::indicators::{
    DataWindowEntry, Indicator, draw_axis_label, draw_series_line, last_visible_value,
    merge_ranges,
};
use crate::render::{Color, RenderFrame};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdxConfig {
    pub length: usize,
    pub overlay: bool,
    pub plus_di_color: Color,
    pub minus_di_color: Color,
}

impl Default for AdxConfig {
    fn default() -> Self {
        Self {
            length: 14,
            overlay: false,
            plus_di_color: Color::rgb(0.149, 0.651, 0.604),
            minus_di_color: Color::rgb(0.937, 0.325, 0.314),
        }
    }
}

impl AdxConfig {
    fn validate(self) -> ChartResult<Self> {
        if self.length == 0 {
            return Err(ChartError::InvalidData(
                "adx length must be >= 1".to_owned(),
            ));
        }
        self.plus_di_color.validate()?;
        self.minus_di_color.validate()?;
        Ok(self)
    }
}

/// Wilder-smoothed running aggregates for true range and directional
/// movement.
#[derive(Debug, Clone, Copy, Default)]
struct WilderState {
    sample_count: usize,
    init_tr_sum: f64,
    init_plus_sum: f64,
    init_minus_sum: f64,
    smoothed: Option<(f64, f64, f64)>,
}

/// Directional movement index: +DI and -DI lines over Wilder smoothing.
///
/// Emits directional-indicator lines only; the derived ADX average was never
/// surfaced by the chart and is not produced here.
#[derive(Debug, Clone)]
pub struct AverageDirectionalIndex {
    config: AdxConfig,
    prev_bar: Option<OhlcvBar>,
    state: WilderState,
    plus_di: Vec<Option<f64>>,
    minus_di: Vec<Option<f64>>,
}

impl AverageDirectionalIndex {
    pub fn new(config: AdxConfig) -> ChartResult<Self> {
        Ok(Self {
            config: config.validate()?,
            prev_bar: None,
            state: WilderState::default(),
            plus_di: Vec::new(),
            minus_di: Vec::new(),
        })
    }

    #[must_use]
    pub fn plus_di(&self) -> &[Option<f64>] {
        &self.plus_di
    }

    #[must_use]
    pub fn minus_di(&self) -> &[Option<f64>] {
        &self.minus_di
    }

    fn push(&mut self, bar: &OhlcvBar) {
        let Some(prev) = self.prev_bar.replace(*bar) else {
            self.plus_di.push(None);
            self.minus_di.push(None);
            return;
        };

        let true_range = (bar.high - bar.low)
            .max((bar.high - prev.close).abs())
            .max((bar.low - prev.close).abs());
        let up_move = bar.high - prev.high;
        let down_move = prev.low - bar.low;
        let plus_dm = if up_move > down_move {
            up_move.max(0.0)
        } else {
            0.0
        };
        let minus_dm = if down_move > up_move {
            down_move.max(0.0)
        } else {
            0.0
        };

        self.state.sample_count += 1;
        let length = self.config.length as f64;
        match self.state.smoothed {
            None => {
                self.state.init_tr_sum += true_range;
                self.state.init_plus_sum += plus_dm;
                self.state.init_minus_sum += minus_dm;
                if self.state.sample_count == self.config.length {
                    self.state.smoothed = Some((
                        self.state.init_tr_sum / length,
                        self.state.init_plus_sum / length,
                        self.state.init_minus_sum / length,
                    ));
                }
            }
            Some((tr, plus, minus)) => {
                self.state.smoothed = Some((
                    tr - tr / length + true_range,
                    plus - plus / length + plus_dm,
                    minus - minus / length + minus_dm,
                ));
            }
        }

        match self.state.smoothed {
            Some((tr, plus, minus)) if tr > 0.0 => {
                self.plus_di.push(Some(100.0 * plus / tr));
                self.minus_di.push(Some(100.0 * minus / tr));
            }
            _ => {
                self.plus_di.push(None);
                self.minus_di.push(None);
            }
        }
    }
}

impl Indicator for AverageDirectionalIndex {
    fn name(&self) -> &'static str {
        "ADX"
    }

    fn shares_price_scale(&self) -> bool {
        self.config.overlay
    }

    fn recompute(&mut self, bars: &[OhlcvBar]) {
        self.prev_bar = None;
        self.state = WilderState::default();
        self.plus_di.clear();
        self.minus_di.clear();
        for bar in bars {
            self.push(bar);
        }
    }

    fn append_bar(&mut self, bar: &OhlcvBar) {
        self.push(bar);
    }

    fn data_range(&self, _bars: &[OhlcvBar], range: VisibleRange) -> Option<(f64, f64)> {
        merge_ranges(
            series_min_max(&self.plus_di, range),
            series_min_max(&self.minus_di, range),
        )
    }

    fn paint(&self, _bars: &[OhlcvBar], mapper: CoordinateMapper, frame: &mut RenderFrame) {
        draw_series_line(&self.plus_di, mapper, self.config.plus_di_color, frame);
        draw_series_line(&self.minus_di, mapper, self.config.minus_di_color, frame);
    }

    fn paint_axis_labels(&self, mapper: CoordinateMapper, frame: &mut RenderFrame) {
        let range = mapper.range();
        if let Some(value) = last_visible_value(&self.plus_di, range) {
            draw_axis_label(value, self.config.plus_di_color, mapper, frame);
        }
        if let Some(value) = last_visible_value(&self.minus_di, range) {
            draw_axis_label(value, self.config.minus_di_color, mapper, frame);
        }
    }

    fn data_window(&self, _bars: &[OhlcvBar], index: usize) -> Vec<DataWindowEntry> {
        let plus = self.plus_di.get(index).copied().flatten();
        let minus = self.minus_di.get(index).copied().flatten();
        let (Some(plus), Some(minus)) = (plus, minus) else {
            return Vec::new();
        };

        vec![
            DataWindowEntry {
                label: format!("ADX {}", self.config.length),
                value_text: String::new(),
                color: None,
            },
            DataWindowEntry {
                label: String::new(),
                value_text: format_price_label(plus),
                color: Some(self.config.plus_di_color),
            },
            DataWindowEntry {
                label: String::new(),
                value_text: format_price_label(minus),
                color: Some(self.config.minus_di_color),
            },
        ]
    }
}
