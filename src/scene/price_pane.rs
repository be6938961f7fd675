use crate::core::{CoordinateMapper, OhlcvBar};
use crate::indicators::Indicator;
use crate::render::{LinePrimitive, RenderFrame};
use crate::scene::GRIDLINE_COLOR;

/// Dashed gridlines shared by every data pane: one horizontal line per value
/// tick, one vertical line per positioned time tick.
pub(crate) fn paint_gridlines(
    mapper: CoordinateMapper,
    value_ticks: &[f64],
    time_tick_xs: &[f64],
    frame: &mut RenderFrame,
) {
    let width = mapper.viewport().pane_width_px;
    let height = mapper.viewport().pane_height_px;
    for &tick in value_ticks {
        let y = mapper.y_of(tick);
        frame.push_line(LinePrimitive::new(0.0, y, width, y, 1.0, GRIDLINE_COLOR).dashed());
    }
    for &x in time_tick_xs {
        frame.push_line(LinePrimitive::new(x, 0.0, x, height, 1.0, GRIDLINE_COLOR).dashed());
    }
}

/// Pane-local frame for the main price pane: gridlines below, then every
/// price-scale indicator in registration order (candles included, since the
/// price series is itself an indicator).
#[must_use]
pub fn build_price_pane(
    bars: &[OhlcvBar],
    mapper: CoordinateMapper,
    indicators: &[&dyn Indicator],
    value_ticks: &[f64],
    time_tick_xs: &[f64],
) -> RenderFrame {
    let mut frame = RenderFrame::new();
    paint_gridlines(mapper, value_ticks, time_tick_xs, &mut frame);
    for indicator in indicators {
        indicator.paint(bars, mapper, &mut frame);
    }
    frame
}
