use crate::core::{CoordinateMapper, format_price_label};
use crate::indicators::Indicator;
use crate::render::{LinePrimitive, RenderFrame, TextHAlign, TextPrimitive};
use crate::scene::{AXIS_TEXT_COLOR, TICK_MARK_COLOR, TICK_MARK_LENGTH_PX};

/// Axis-local frame for one value axis strip.
///
/// `mapper` is an axis-local mapper: same visible range, domain, and pane
/// height as the data pane it annotates, but with the strip's own width, so
/// tick ys line up with the pane's gridlines. Indicator value labels paint on
/// top of the plain ticks.
#[must_use]
pub fn build_price_axis(
    mapper: CoordinateMapper,
    value_ticks: &[f64],
    indicators: &[&dyn Indicator],
) -> RenderFrame {
    let mut frame = RenderFrame::new();
    for &tick in value_ticks {
        let y = mapper.y_of(tick);
        frame.push_line(LinePrimitive::new(
            0.0,
            y,
            TICK_MARK_LENGTH_PX,
            y,
            1.0,
            TICK_MARK_COLOR,
        ));
        frame.push_text(TextPrimitive::new(
            format_price_label(tick),
            TICK_MARK_LENGTH_PX + 4.0,
            y,
            TextHAlign::Left,
            AXIS_TEXT_COLOR,
        ));
    }
    for indicator in indicators {
        indicator.paint_axis_labels(mapper, &mut frame);
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::build_price_axis;
    use crate::core::{CoordinateMapper, PriceDomain, Viewport, VisibleRange};
    use crate::scene::PRICE_AXIS_WIDTH_PX;

    #[test]
    fn each_tick_gets_a_mark_and_a_label() {
        let mapper = CoordinateMapper::new(
            Viewport::new(PRICE_AXIS_WIDTH_PX, 400.0),
            VisibleRange { start: 0, end: 9 },
            PriceDomain {
                min: 0.0,
                max: 100.0,
            },
        )
        .unwrap();

        let frame = build_price_axis(mapper, &[0.0, 50.0, 100.0], &[]);
        assert_eq!(frame.lines.len(), 3);
        assert_eq!(frame.texts.len(), 3);
        assert_eq!(frame.texts[1].text, "50.00");
    }
}
