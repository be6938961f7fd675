use serde::{Deserialize, Serialize};

use crate::core::{
    CoordinateMapper, OhlcvBar, VisibleRange, format_price_label, project_visible_candles,
};
use crate::indicators::{DataWindowEntry, Indicator, draw_axis_label};
use crate::render::{Color, LinePrimitive, RectPrimitive, RenderFrame};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceConfig {
    pub body_up_color: Color,
    pub body_down_color: Color,
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            body_up_color: Color::rgb(0.149, 0.651, 0.604),
            body_down_color: Color::rgb(0.937, 0.325, 0.314),
        }
    }
}

/// The candlestick series itself, exposed through the same capability set as
/// the derived studies so the pane pipeline treats all of them uniformly.
///
/// Holds no rolling state: every output is read straight from the bars.
#[derive(Debug, Clone)]
pub struct Price {
    config: PriceConfig,
    last_close: Option<f64>,
}

impl Price {
    #[must_use]
    pub fn new(config: PriceConfig) -> Self {
        Self {
            config,
            last_close: None,
        }
    }

    fn body_color(&self, is_bullish: bool) -> Color {
        if is_bullish {
            self.config.body_up_color
        } else {
            self.config.body_down_color
        }
    }
}

impl Indicator for Price {
    fn name(&self) -> &'static str {
        "Price"
    }

    fn shares_price_scale(&self) -> bool {
        true
    }

    fn recompute(&mut self, bars: &[OhlcvBar]) {
        self.last_close = bars.last().map(|bar| bar.close);
    }

    fn append_bar(&mut self, bar: &OhlcvBar) {
        self.last_close = Some(bar.close);
    }

    fn data_range(&self, bars: &[OhlcvBar], range: VisibleRange) -> Option<(f64, f64)> {
        let visible = bars.get(range.start..=range.end)?;
        let mut bounds: Option<(f64, f64)> = None;
        for bar in visible {
            bounds = match bounds {
                Some((min, max)) => Some((min.min(bar.low), max.max(bar.high))),
                None => Some((bar.low, bar.high)),
            };
        }
        bounds
    }

    fn paint(&self, bars: &[OhlcvBar], mapper: CoordinateMapper, frame: &mut RenderFrame) {
        for candle in project_visible_candles(bars, mapper) {
            let color = self.body_color(candle.is_bullish);
            frame.push_line(LinePrimitive::new(
                candle.center_x,
                candle.wick_top,
                candle.center_x,
                candle.wick_bottom,
                1.0,
                color,
            ));
            frame.push_rect(RectPrimitive::new(
                candle.body_left,
                candle.body_top,
                (candle.body_right - candle.body_left).max(1.0),
                // Doji bodies still paint as a 1px sliver.
                (candle.body_bottom - candle.body_top).max(1.0),
                color,
            ));
        }
    }

    fn paint_axis_labels(&self, mapper: CoordinateMapper, frame: &mut RenderFrame) {
        if let Some(close) = self.last_close {
            draw_axis_label(close, Color::rgb(0.0, 0.0, 0.0), mapper, frame);
        }
    }

    fn data_window(&self, bars: &[OhlcvBar], index: usize) -> Vec<DataWindowEntry> {
        let Some(bar) = bars.get(index) else {
            return Vec::new();
        };
        let reference = index
            .checked_sub(1)
            .and_then(|prev| bars.get(prev))
            .map_or(bar.open, |prev| prev.close);
        let change = bar.close - reference;
        let percent = if reference != 0.0 {
            change / reference * 100.0
        } else {
            0.0
        };
        let change_color = Some(self.body_color(change >= 0.0));

        let mut entries = Vec::with_capacity(6);
        for (label, value) in [
            ("O", bar.open),
            ("H", bar.high),
            ("L", bar.low),
            ("C", bar.close),
        ] {
            entries.push(DataWindowEntry {
                label: label.to_owned(),
                value_text: format_price_label(value),
                color: Some(self.body_color(bar.is_bullish())),
            });
        }
        entries.push(DataWindowEntry {
            label: String::new(),
            value_text: format!("{change:+.2}"),
            color: change_color,
        });
        entries.push(DataWindowEntry {
            label: String::new(),
            value_text: format!("({percent:+.2}%)"),
            color: change_color,
        });
        entries
    }
}
