use flexchart::core::{
    TIME_STEPS_MS, nice_price_step, price_ticks, select_time_step_ms, time_ticks,
};

#[test]
fn price_ticks_land_on_round_values() {
    let ticks = price_ticks(0.0, 97.0, 5);
    assert_eq!(ticks.as_slice(), &[0.0, 20.0, 40.0, 60.0, 80.0]);

    let ticks = price_ticks(99.1, 101.3, 5);
    for tick in &ticks {
        // Step is 0.5 here; every tick is a clean multiple.
        let remainder = (tick / 0.5).round() - tick / 0.5;
        assert!(remainder.abs() < 1e-9, "tick {tick} off-grid");
    }
    assert!(ticks.first().copied().unwrap() >= 99.1 - 1e-9);
    assert!(ticks.last().copied().unwrap() <= 101.3 + 1e-9);
}

#[test]
fn negative_domains_tick_through_zero() {
    let ticks = price_ticks(-1.2, 1.2, 5);
    assert!(ticks.contains(&0.0));
    assert!(ticks.iter().any(|&t| t < 0.0));
    assert!(ticks.iter().any(|&t| t > 0.0));
}

#[test]
fn step_selection_minimizes_tick_count_error() {
    // 7 days at 5 desired ticks: exhaustive argmin over the catalog.
    let range_ms = 7 * 86_400_000_i64;
    let chosen = select_time_step_ms(range_ms, 5);
    assert_eq!(chosen, 172_800_000);

    let chosen_diff = (range_ms / chosen + 1 - 5).abs();
    for interval in TIME_STEPS_MS {
        let diff = (range_ms / interval + 1 - 5).abs();
        assert!(chosen_diff <= diff, "{interval} beats chosen {chosen}");
    }
}

#[test]
fn time_ticks_are_aligned_and_labeled() {
    // 2021-03-01 00:10 UTC, spanning 26 hours.
    let start = 1_614_557_400_000_i64;
    let end = start + 26 * 3_600_000;
    let ticks = time_ticks(start, end, 6);
    assert!(!ticks.is_empty());

    let step = select_time_step_ms(end - start, 6);
    for tick in &ticks {
        assert_eq!(tick.time_ms.rem_euclid(step), 0);
        assert!(!tick.label.is_empty());
    }

    // Consecutive ticks are exactly one step apart.
    for pair in ticks.windows(2) {
        assert_eq!(pair[1].time_ms - pair[0].time_ms, step);
    }
}

#[test]
fn nice_step_handles_sub_unit_magnitudes() {
    assert_eq!(nice_price_step(0.004), 0.005);
    assert_eq!(nice_price_step(0.11), 0.1);
    assert_eq!(nice_price_step(147.0), 100.0);
}
