//! Indicator studies and their shared paint/range plumbing.
//!
//! Every indicator implements the same capability set: full recompute,
//! O(1)-amortized append, painting through a [`CoordinateMapper`], axis
//! labels, a visible-range data contribution, and crosshair data-window
//! entries. Rolling aggregates live in explicit owned state per instance and
//! all output series are bar-aligned (`None` during warmup).

pub mod adx;
pub mod bollinger;
pub mod macd;
pub mod price;
pub mod sma;
pub mod stoch_rsi;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{CoordinateMapper, OhlcvBar, VisibleRange};
use crate::error::{ChartError, ChartResult};
use crate::render::{Color, LinePrimitive, RectPrimitive, RenderFrame, TextHAlign, TextPrimitive};

pub use adx::{AdxConfig, AverageDirectionalIndex};
pub use bollinger::{BollingerBands, BollingerConfig};
pub use macd::{Macd, MacdConfig};
pub use price::{Price, PriceConfig};
pub use sma::{SimpleMovingAverage, SmaConfig};
pub use stoch_rsi::{StochRsiConfig, StochasticRsi};

/// Which bar field an indicator reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Open,
    High,
    Low,
    #[default]
    Close,
}

impl PriceSource {
    #[must_use]
    pub fn of(self, bar: &OhlcvBar) -> f64 {
        match self {
            Self::Open => bar.open,
            Self::High => bar.high,
            Self::Low => bar.low,
            Self::Close => bar.close,
        }
    }
}

/// One labeled value in the crosshair data window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataWindowEntry {
    pub label: String,
    pub value_text: String,
    pub color: Option<Color>,
}

/// Capability set shared by all studies.
///
/// `shares_price_scale` is the "yscale" flag: overlays contribute their
/// `data_range` to the price pane's padded domain; non-overlays get an
/// independent sub-pane domain.
pub trait Indicator {
    fn name(&self) -> &'static str;

    fn shares_price_scale(&self) -> bool;

    /// Rebuilds all output series from scratch.
    fn recompute(&mut self, bars: &[OhlcvBar]);

    /// Extends output series by one bar, mutating rolling aggregates in
    /// place. Amortized O(1).
    fn append_bar(&mut self, bar: &OhlcvBar);

    /// Unpadded min/max of this indicator's visible output, fed into the
    /// shared padded-domain reducer.
    fn data_range(&self, bars: &[OhlcvBar], range: VisibleRange) -> Option<(f64, f64)>;

    fn paint(&self, bars: &[OhlcvBar], mapper: CoordinateMapper, frame: &mut RenderFrame);

    fn paint_axis_labels(&self, mapper: CoordinateMapper, frame: &mut RenderFrame);

    fn data_window(&self, bars: &[OhlcvBar], index: usize) -> Vec<DataWindowEntry>;
}

/// Known indicator kinds, the tagged form behind registry lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorKind {
    Price,
    SimpleMovingAverage,
    BollingerBands,
    Macd,
    AverageDirectionalIndex,
    StochasticRsi,
}

/// Name → kind lookup with insertion order preserved for stable menus.
#[derive(Debug, Clone)]
pub struct IndicatorRegistry {
    kinds: IndexMap<String, IndicatorKind>,
}

impl Default for IndicatorRegistry {
    fn default() -> Self {
        let mut kinds = IndexMap::new();
        kinds.insert("Price".to_owned(), IndicatorKind::Price);
        kinds.insert("Moving Average".to_owned(), IndicatorKind::SimpleMovingAverage);
        kinds.insert("Bollinger Bands".to_owned(), IndicatorKind::BollingerBands);
        kinds.insert("MACD".to_owned(), IndicatorKind::Macd);
        kinds.insert("ADX".to_owned(), IndicatorKind::AverageDirectionalIndex);
        kinds.insert("Stochastic RSI".to_owned(), IndicatorKind::StochasticRsi);
        Self { kinds }
    }
}

impl IndicatorRegistry {
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.kinds.keys().map(String::as_str)
    }

    #[must_use]
    pub fn kind_of(&self, name: &str) -> Option<IndicatorKind> {
        self.kinds.get(name).copied()
    }

    /// Instantiates an indicator by registered name with a JSON config
    /// payload; `null` selects the kind's defaults.
    pub fn create(
        &self,
        name: &str,
        config: serde_json::Value,
    ) -> ChartResult<Box<dyn Indicator>> {
        let kind = self
            .kind_of(name)
            .ok_or_else(|| ChartError::InvalidData(format!("unknown indicator `{name}`")))?;
        create_indicator(kind, config)
    }

    pub fn create_default(&self, name: &str) -> ChartResult<Box<dyn Indicator>> {
        self.create(name, serde_json::Value::Null)
    }
}

fn create_indicator(
    kind: IndicatorKind,
    config: serde_json::Value,
) -> ChartResult<Box<dyn Indicator>> {
    match kind {
        IndicatorKind::Price => Ok(Box::new(Price::new(parse_config(config)?))),
        IndicatorKind::SimpleMovingAverage => {
            Ok(Box::new(SimpleMovingAverage::new(parse_config(config)?)?))
        }
        IndicatorKind::BollingerBands => Ok(Box::new(BollingerBands::new(parse_config(config)?)?)),
        IndicatorKind::Macd => Ok(Box::new(Macd::new(parse_config(config)?)?)),
        IndicatorKind::AverageDirectionalIndex => {
            Ok(Box::new(AverageDirectionalIndex::new(parse_config(config)?)?))
        }
        IndicatorKind::StochasticRsi => Ok(Box::new(StochasticRsi::new(parse_config(config)?)?)),
    }
}

fn parse_config<C>(config: serde_json::Value) -> ChartResult<C>
where
    C: Default + serde::de::DeserializeOwned,
{
    if config.is_null() {
        return Ok(C::default());
    }
    serde_json::from_value(config)
        .map_err(|err| ChartError::InvalidData(format!("invalid indicator config: {err}")))
}

// ---------------------------------------------------------------------------
// Shared paint helpers used by the concrete studies.
// ---------------------------------------------------------------------------

pub(crate) const AXIS_LABEL_HEIGHT_PX: f64 = 18.0;
pub(crate) const SERIES_STROKE_WIDTH: f64 = 2.0;

/// Polyline over the visible samples; warmup gaps (`None`) break the line.
pub(crate) fn draw_series_line(
    series: &[Option<f64>],
    mapper: CoordinateMapper,
    color: Color,
    frame: &mut RenderFrame,
) {
    let range = mapper.range();
    let mut previous: Option<(f64, f64)> = None;
    for index in range.start..=range.end {
        let Some(value) = series.get(index).copied().flatten() else {
            previous = None;
            continue;
        };

        let x = mapper.x_center(index);
        let y = mapper.y_of(value);
        if let Some((prev_x, prev_y)) = previous {
            frame.push_line(LinePrimitive::new(
                prev_x,
                prev_y,
                x,
                y,
                SERIES_STROKE_WIDTH,
                color,
            ));
        }
        previous = Some((x, y));
    }
}

/// One bar-width column per sample, anchored at the value-zero baseline.
pub(crate) fn draw_histogram(
    series: &[Option<f64>],
    mapper: CoordinateMapper,
    color: Color,
    frame: &mut RenderFrame,
) {
    let range = mapper.range();
    let baseline = mapper.y_of(0.0);
    let bar_width = mapper.viewport().bar_width;
    for index in range.start..=range.end {
        let Some(value) = series.get(index).copied().flatten() else {
            continue;
        };
        let y = mapper.y_of(value);
        frame.push_rect(RectPrimitive::new(
            mapper.x_left(index),
            baseline.min(y),
            bar_width,
            (baseline - y).abs().max(1.0),
            color,
        ));
    }
}

/// Full-width horizontal reference line at `value`.
pub(crate) fn draw_horizontal_line(
    value: f64,
    mapper: CoordinateMapper,
    color: Color,
    frame: &mut RenderFrame,
) {
    let y = mapper.y_of(value);
    frame.push_line(LinePrimitive::new(
        0.0,
        y,
        mapper.viewport().pane_width_px,
        y,
        1.0,
        color,
    ));
}

/// Colored value box on the axis strip: background rectangle, contrasting
/// centered text, and a short leader line.
pub(crate) fn draw_axis_label(
    value: f64,
    color: Color,
    mapper: CoordinateMapper,
    frame: &mut RenderFrame,
) {
    let axis_width = mapper.viewport().pane_width_px;
    let center_y = mapper.y_of(value);
    let top = center_y - AXIS_LABEL_HEIGHT_PX / 2.0;

    frame.push_rect(RectPrimitive::new(
        0.0,
        top,
        axis_width,
        AXIS_LABEL_HEIGHT_PX,
        color,
    ));
    frame.push_text(TextPrimitive::new(
        crate::core::format_price_label(value),
        axis_width / 2.0,
        center_y,
        TextHAlign::Center,
        contrasting_color(color),
    ));
    frame.push_line(LinePrimitive::new(
        0.0,
        center_y,
        4.0,
        center_y,
        1.0,
        contrasting_color(color),
    ));
}

/// Black or white, whichever reads better on `background`.
#[must_use]
pub(crate) fn contrasting_color(background: Color) -> Color {
    let brightness =
        background.red * 0.299 + background.green * 0.587 + background.blue * 0.114;
    if brightness > 0.5 {
        Color::rgb(0.0, 0.0, 0.0)
    } else {
        Color::rgb(1.0, 1.0, 1.0)
    }
}

/// Union of two optional min/max contributions.
#[must_use]
pub(crate) fn merge_ranges(
    a: Option<(f64, f64)>,
    b: Option<(f64, f64)>,
) -> Option<(f64, f64)> {
    match (a, b) {
        (Some((a_min, a_max)), Some((b_min, b_max))) => Some((a_min.min(b_min), a_max.max(b_max))),
        (Some(range), None) | (None, Some(range)) => Some(range),
        (None, None) => None,
    }
}

/// Newest non-warmup sample inside the visible range, the value axis labels
/// and data windows report.
#[must_use]
pub(crate) fn last_visible_value(series: &[Option<f64>], range: VisibleRange) -> Option<f64> {
    let visible = series.get(range.start..=range.end)?;
    visible.iter().rev().copied().flatten().next()
}
