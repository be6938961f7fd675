use crate::core::Viewport;
use crate::interaction::CrosshairSnap;
use crate::render::{LinePrimitive, RenderFrame};
use crate::scene::CROSSHAIR_COLOR;

/// Pane-local dashed crosshair: a full-height vertical line at the snapped
/// bar center and a full-width horizontal line at the cursor y.
///
/// The vertical line is valid in every data pane (shared x geometry); the
/// horizontal line only means anything in the pane the cursor is over.
#[must_use]
pub fn build_crosshair(snap: CrosshairSnap, viewport: Viewport) -> RenderFrame {
    let mut frame = RenderFrame::new();
    frame.push_line(
        LinePrimitive::new(
            snap.x_px,
            0.0,
            snap.x_px,
            viewport.pane_height_px,
            1.0,
            CROSSHAIR_COLOR,
        )
        .dashed(),
    );
    frame.push_line(
        LinePrimitive::new(
            0.0,
            snap.y_px,
            viewport.pane_width_px,
            snap.y_px,
            1.0,
            CROSSHAIR_COLOR,
        )
        .dashed(),
    );
    frame
}

#[cfg(test)]
mod tests {
    use super::build_crosshair;
    use crate::core::Viewport;
    use crate::interaction::CrosshairSnap;
    use crate::render::LineStrokeStyle;

    #[test]
    fn crosshair_spans_the_full_pane() {
        let snap = CrosshairSnap {
            bar_index: 10,
            x_px: 350.0,
            y_px: 120.0,
            price: 101.5,
        };
        let frame = build_crosshair(snap, Viewport::new(700.0, 400.0));

        assert_eq!(frame.lines.len(), 2);
        assert_eq!(frame.lines[0].stroke_style, LineStrokeStyle::Dashed);
        assert_eq!(frame.lines[0].x1, 350.0);
        assert_eq!(frame.lines[0].y2, 400.0);
        assert_eq!(frame.lines[1].y1, 120.0);
        assert_eq!(frame.lines[1].x2, 700.0);
    }
}
