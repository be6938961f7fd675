use approx::assert_relative_eq;
use flexchart::core::{
    CoordinateMapper, OhlcvBar, PriceDomain, Viewport, VisibleRange, project_visible_candles,
};

fn bars(count: usize) -> Vec<OhlcvBar> {
    (0..count)
        .map(|i| {
            let base = 100.0 + (i as f64 * 0.3).sin() * 4.0;
            OhlcvBar::new(
                i as i64 * 60_000,
                base,
                base + 2.0,
                base - 2.0,
                base + 1.0,
                10,
            )
            .unwrap()
        })
        .collect()
}

#[test]
fn panes_with_different_domains_share_x_positions() {
    let viewport = Viewport::new(700.0, 400.0);
    let range = VisibleRange { start: 100, end: 199 };
    let price_pane = CoordinateMapper::new(
        viewport,
        range,
        PriceDomain {
            min: 94.0,
            max: 107.0,
        },
    )
    .unwrap();
    let macd_pane = CoordinateMapper::new(
        Viewport {
            pane_height_px: 150.0,
            ..viewport
        },
        range,
        PriceDomain {
            min: -2.5,
            max: 2.5,
        },
    )
    .unwrap();

    for index in [100, 137, 199] {
        assert_eq!(price_pane.x_center(index), macd_pane.x_center(index));
    }
}

#[test]
fn y_round_trips_through_price() {
    let mapper = CoordinateMapper::new(
        Viewport::new(700.0, 400.0),
        VisibleRange { start: 0, end: 99 },
        PriceDomain {
            min: 90.0,
            max: 110.0,
        },
    )
    .unwrap();

    for price in [90.0, 95.5, 100.0, 109.99] {
        assert_relative_eq!(mapper.price_at_y(mapper.y_of(price)), price, epsilon = 1e-9);
    }

    // The usable band is 95% of the pane, centered.
    assert_relative_eq!(mapper.y_of(110.0), 10.0);
    assert_relative_eq!(mapper.y_of(90.0), 390.0);
}

#[test]
fn projection_covers_exactly_the_visible_range() {
    let bars = bars(300);
    let range = VisibleRange { start: 200, end: 299 };
    let mapper = CoordinateMapper::new(
        Viewport::new(700.0, 400.0),
        range,
        PriceDomain {
            min: 94.0,
            max: 107.0,
        },
    )
    .unwrap();

    let candles = project_visible_candles(&bars, mapper);
    assert_eq!(candles.len(), 100);
    assert_eq!(candles[0].bar_index, 200);
    assert_eq!(candles[99].bar_index, 299);

    for candle in &candles {
        assert!(candle.body_top <= candle.body_bottom);
        assert!(candle.wick_top <= candle.body_top + 1e-9);
        assert!(candle.wick_bottom >= candle.body_bottom - 1e-9);
        assert_relative_eq!(
            candle.center_x,
            (candle.body_left + candle.body_right) / 2.0,
            epsilon = 1e-9
        );
    }

    // Rightmost candle honors the right margin.
    assert_relative_eq!(candles[99].body_right, 700.0);
}

#[test]
fn right_offset_shifts_every_bar_left() {
    let range = VisibleRange { start: 0, end: 49 };
    let domain = PriceDomain {
        min: 0.0,
        max: 10.0,
    };
    let flush = CoordinateMapper::new(Viewport::new(700.0, 400.0), range, domain).unwrap();
    let margined = CoordinateMapper::new(
        Viewport::new(700.0, 400.0).with_right_offset(12.0),
        range,
        domain,
    )
    .unwrap();

    for index in [0, 25, 49] {
        assert_relative_eq!(margined.x_center(index), flush.x_center(index) - 12.0);
    }
}
