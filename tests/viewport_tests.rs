use flexchart::core::{Viewport, visible_range, visible_range_for};
use flexchart::interaction::{scroll_back, zoom_out};

#[test]
fn pane_width_bounds_the_visible_count() {
    // 700 / (5 + 2) = 100 bars fit.
    let range = visible_range(1000, 700.0, 5.0, 2.0, 0).unwrap();
    assert_eq!((range.start, range.end), (900, 999));

    // A wider pane shows more history.
    let range = visible_range(1000, 1400.0, 5.0, 2.0, 0).unwrap();
    assert_eq!((range.start, range.end), (800, 999));
}

#[test]
fn offset_walks_back_and_clamps_silently() {
    let range = visible_range(1000, 700.0, 5.0, 2.0, 50).unwrap();
    assert_eq!((range.start, range.end), (850, 949));

    // Scrolling past the oldest bar pins the view to the start.
    let range = visible_range(1000, 700.0, 5.0, 2.0, 5000).unwrap();
    assert_eq!((range.start, range.end), (0, 0));

    let range = visible_range(50, 700.0, 5.0, 2.0, 49).unwrap();
    assert_eq!((range.start, range.end), (0, 0));
}

#[test]
fn overscroll_equals_max_offset() {
    let capped = visible_range(1000, 700.0, 5.0, 2.0, 999);
    for offset in [1_000, 5_000, usize::MAX] {
        assert_eq!(visible_range(1000, 700.0, 5.0, 2.0, offset), capped);
    }
}

#[test]
fn zooming_out_reveals_more_bars() {
    let mut viewport = Viewport::new(700.0, 400.0);
    let before = visible_range_for(1000, viewport).unwrap().len();

    zoom_out(&mut viewport);
    let after = visible_range_for(1000, viewport).unwrap().len();
    assert!(after > before, "{after} <= {before}");
}

#[test]
fn scrolled_view_still_fills_the_pane() {
    let mut viewport = Viewport::new(700.0, 400.0);
    scroll_back(&mut viewport, 120);
    let range = visible_range_for(1000, viewport).unwrap();
    assert_eq!(range.len(), 100);
    assert_eq!(range.end, 999 - 120);
}
