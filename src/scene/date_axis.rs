use crate::core::{CoordinateMapper, OhlcvBar, TimeTick, find_closest_bar_index};
use crate::render::{LinePrimitive, RenderFrame, TextHAlign, TextPrimitive};
use crate::scene::{AXIS_TEXT_COLOR, DATE_AXIS_HEIGHT_PX, TICK_MARK_COLOR, TICK_MARK_LENGTH_PX};

/// A time tick resolved to the pixel center of its closest visible bar.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedTimeTick {
    pub x_px: f64,
    pub label: String,
}

/// Snaps generated time ticks onto bar centers and drops the ones that land
/// off the pane. The same positions feed the date axis labels and the
/// vertical gridlines of every data pane.
#[must_use]
pub fn position_time_ticks(
    bars: &[OhlcvBar],
    mapper: CoordinateMapper,
    ticks: &[TimeTick],
) -> Vec<PositionedTimeTick> {
    if bars.is_empty() {
        return Vec::new();
    }
    let range = mapper.range();
    ticks
        .iter()
        .filter_map(|tick| {
            let index = find_closest_bar_index(bars, tick.time_ms, range);
            let x_px = mapper.x_center(index);
            mapper.is_x_on_pane(x_px).then(|| PositionedTimeTick {
                x_px,
                label: tick.label.clone(),
            })
        })
        .collect()
}

/// Axis-local frame for the date strip: a tick mark and a centered label per
/// positioned tick.
#[must_use]
pub fn build_date_axis(ticks: &[PositionedTimeTick]) -> RenderFrame {
    let mut frame = RenderFrame::new();
    for tick in ticks {
        frame.push_line(LinePrimitive::new(
            tick.x_px,
            0.0,
            tick.x_px,
            TICK_MARK_LENGTH_PX,
            1.0,
            TICK_MARK_COLOR,
        ));
        frame.push_text(TextPrimitive::new(
            tick.label.clone(),
            tick.x_px,
            DATE_AXIS_HEIGHT_PX / 2.0,
            TextHAlign::Center,
            AXIS_TEXT_COLOR,
        ));
    }
    frame
}
