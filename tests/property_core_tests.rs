use flexchart::core::{
    CoordinateMapper, OhlcvBar, PriceDomain, Viewport, VisibleRange, find_closest_bar_index,
    nice_price_step, visible_range,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn visible_range_is_always_in_bounds(
        total_bars in 1usize..5_000,
        pane_width in 10.0f64..4_000.0,
        bar_width in 1.0f64..100.0,
        bar_spacing in 0.0f64..50.0,
        offset in 0usize..10_000,
    ) {
        if let Some(range) = visible_range(total_bars, pane_width, bar_width, bar_spacing, offset) {
            prop_assert!(range.start <= range.end);
            prop_assert!(range.end < total_bars);

            let candle_space = bar_width + bar_spacing;
            let max_visible = (pane_width / candle_space).floor() as usize;
            prop_assert!(range.len() <= max_visible.max(1));
        }
    }

    #[test]
    fn nice_step_is_one_two_five_or_ten(raw in 1e-6f64..1e9) {
        let step = nice_price_step(raw);
        let magnitude = 10f64.powf(step.log10().floor());
        let multiplier = (step / magnitude).round();
        prop_assert!(
            [1.0, 2.0, 5.0, 10.0].iter().any(|m| (multiplier - m).abs() < 1e-6),
            "step {step} has multiplier {multiplier}"
        );
    }

    #[test]
    fn price_round_trip_is_within_one_pixel(
        price in -1_000.0f64..1_000.0,
        span in 0.01f64..2_000.0,
        height in 50.0f64..2_000.0,
    ) {
        let min = price - span / 2.0;
        let max = price + span / 2.0;
        let mapper = CoordinateMapper::new(
            Viewport::new(700.0, height),
            VisibleRange { start: 0, end: 9 },
            PriceDomain { min, max },
        ).unwrap();

        let recovered = mapper.price_at_y(mapper.y_of(price));
        // One vertical pixel's worth of price on this scale.
        let price_per_px = (max - min) / (height * 0.95);
        prop_assert!((recovered - price).abs() <= price_per_px);
    }

    #[test]
    fn closest_bar_search_agrees_with_linear_scan(
        gaps in prop::collection::vec(1i64..500_000, 2..300),
        target_frac in 0.0f64..1.2,
    ) {
        let mut time = 1_700_000_000_000i64;
        let bars: Vec<OhlcvBar> = gaps
            .iter()
            .map(|gap| {
                time += gap;
                OhlcvBar::new(time, 1.0, 2.0, 0.5, 1.5, 1).unwrap()
            })
            .collect();
        let range = VisibleRange { start: 0, end: bars.len() - 1 };

        let first = bars[0].time_ms();
        let last = bars[bars.len() - 1].time_ms();
        let target = first + ((last - first) as f64 * target_frac) as i64;

        let found = find_closest_bar_index(&bars, target, range);
        let found_dist = (bars[found].time_ms() - target).abs();
        for (index, bar) in bars.iter().enumerate() {
            let dist = (bar.time_ms() - target).abs();
            prop_assert!(
                found_dist <= dist,
                "bar {index} at distance {dist} beats chosen {found} at {found_dist}"
            );
        }
    }
}
