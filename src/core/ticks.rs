use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::types::OhlcvBar;
use crate::core::viewport::VisibleRange;

/// Tolerance used when testing tick values against domain bounds.
pub const TICK_EPSILON: f64 = 1e-9;

/// Fixed catalog of time-axis step sizes in milliseconds.
///
/// 1/5/15/20/30 min, 1/2/3/4 hr, 1/2/3 day, 1/2 wk, 1/2/3/6/12 mo
/// (30-day months), 1 yr (365 days). The month/year entries are coarse ms
/// constants, not calendar-aware.
pub const TIME_STEPS_MS: [i64; 19] = [
    60_000,
    300_000,
    900_000,
    1_200_000,
    1_800_000,
    3_600_000,
    7_200_000,
    10_800_000,
    14_400_000,
    86_400_000,
    172_800_000,
    259_200_000,
    604_800_000,
    1_209_600_000,
    2_592_000_000,
    5_184_000_000,
    7_776_000_000,
    15_552_000_000,
    31_536_000_000,
];

const ONE_DAY_MS: i64 = 86_400_000;
const ONE_MONTH_MS: i64 = 2_592_000_000;
const ONE_YEAR_MS: i64 = 31_536_000_000;

/// One time-axis tick: calendar-aligned value plus its formatted label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeTick {
    pub time_ms: i64,
    pub label: String,
}

/// Rounds a raw step to a human-friendly one: {1, 2, 5, 10} × 10^k.
///
/// Thresholds are fixed: scaled < 1.5 → 1, < 3 → 2, < 7 → 5, else 10.
#[must_use]
pub fn nice_price_step(raw_step: f64) -> f64 {
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let scaled = raw_step / magnitude;

    let multiplier = if scaled < 1.5 {
        1.0
    } else if scaled < 3.0 {
        2.0
    } else if scaled < 7.0 {
        5.0
    } else {
        10.0
    };
    multiplier * magnitude
}

/// Evenly spaced round price values inside `[min, max]`.
///
/// A degenerate domain (`max <= min`) yields the single value `min`; callers
/// draw one centered line for it.
#[must_use]
pub fn price_ticks(min: f64, max: f64, desired_count: usize) -> SmallVec<[f64; 8]> {
    let mut ticks = SmallVec::new();
    if !min.is_finite() || !max.is_finite() {
        return ticks;
    }
    if max <= min {
        ticks.push(min);
        return ticks;
    }

    let desired = desired_count.max(2);
    let raw_step = (max - min) / (desired - 1) as f64;
    let step = nice_price_step(raw_step);

    let first = (min / step).floor() as i64;
    let last = (max / step).ceil() as i64;
    for k in first..=last {
        let value = k as f64 * step;
        if value >= min - TICK_EPSILON && value <= max + TICK_EPSILON {
            ticks.push(value);
        }
    }
    ticks
}

/// Picks the catalog step whose resulting tick count is closest to
/// `desired_count`. Non-positive ranges fall back to the smallest step.
#[must_use]
pub fn select_time_step_ms(range_ms: i64, desired_count: usize) -> i64 {
    if range_ms <= 0 {
        return TIME_STEPS_MS[0];
    }

    let desired = desired_count as i64;
    let mut best = TIME_STEPS_MS[0];
    let mut best_diff = i64::MAX;
    for interval in TIME_STEPS_MS {
        let tick_count = range_ms / interval + 1;
        let diff = (tick_count - desired).abs();
        if diff < best_diff {
            best_diff = diff;
            best = interval;
        }
    }
    best
}

/// Calendar-aligned time ticks inside `[start_ms, end_ms]`, labeled per the
/// chosen step size.
///
/// Start is rounded down and end rounded up to multiples of the step;
/// multiples outside the original range are skipped. An empty result is a
/// valid "nothing to draw" state.
#[must_use]
pub fn time_ticks(start_ms: i64, end_ms: i64, desired_count: usize) -> Vec<TimeTick> {
    if start_ms >= end_ms {
        return Vec::new();
    }

    let step = select_time_step_ms(end_ms - start_ms, desired_count);
    let nice_start = start_ms.div_euclid(step) * step;
    let nice_end = end_ms.div_euclid(step) * step
        + if end_ms.rem_euclid(step) > 0 { step } else { 0 };

    let mut ticks = Vec::new();
    let mut t = nice_start;
    while t <= nice_end {
        if t >= start_ms && t <= end_ms {
            ticks.push(TimeTick {
                time_ms: t,
                label: format_time_label(t, step),
            });
        }
        t += step;
    }
    ticks
}

/// Formats a tick timestamp according to the step that produced it (UTC).
///
/// Step under a day → `HH:MM`; under ~a month → 2-digit day of month; under
/// ~a year → short month name; else 4-digit year.
#[must_use]
pub fn format_time_label(time_ms: i64, step_ms: i64) -> String {
    let Some(datetime) = datetime_utc(time_ms) else {
        return String::new();
    };

    let pattern = if step_ms < ONE_DAY_MS {
        "%H:%M"
    } else if step_ms < ONE_MONTH_MS {
        "%d"
    } else if step_ms < ONE_YEAR_MS {
        "%b"
    } else {
        "%Y"
    };
    datetime.format(pattern).to_string()
}

/// Two-decimal price label shared by the price axis and crosshair.
#[must_use]
pub fn format_price_label(price: f64) -> String {
    format!("{price:.2}")
}

/// Binary search for the bar whose (normalized) time is closest to
/// `target_ms`, restricted to `range`.
///
/// Narrows `[left, right]` until they meet, then compares the bar
/// immediately before the landing index; ties go to the earlier bar.
#[must_use]
pub fn find_closest_bar_index(bars: &[OhlcvBar], target_ms: i64, range: VisibleRange) -> usize {
    let mut left = range.start;
    let mut right = range.end.min(bars.len().saturating_sub(1));
    if left >= right {
        return left;
    }

    while left < right {
        let mid = (left + right) / 2;
        let mid_time = bars[mid].time_ms();
        if mid_time == target_ms {
            return mid;
        } else if mid_time < target_ms {
            left = mid + 1;
        } else {
            right = mid;
        }
    }

    let left_time = bars[left].time_ms();
    if left > range.start {
        let prev_time = bars[left - 1].time_ms();
        if (prev_time - target_ms).abs() <= (left_time - target_ms).abs() {
            return left - 1;
        }
    }
    left
}

fn datetime_utc(time_ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(time_ms).single()
}

#[cfg(test)]
mod tests {
    use super::{
        TIME_STEPS_MS, format_time_label, nice_price_step, price_ticks, select_time_step_ms,
        time_ticks,
    };

    #[test]
    fn raw_step_snaps_to_catalog_multipliers() {
        assert_eq!(nice_price_step(1.2), 1.0);
        assert_eq!(nice_price_step(2.3), 2.0);
        assert_eq!(nice_price_step(5.2), 5.0);
        assert_eq!(nice_price_step(8.0), 10.0);
        assert_eq!(nice_price_step(0.023), 0.02);
        assert_eq!(nice_price_step(24.25), 20.0);
    }

    #[test]
    fn spec_example_zero_to_ninety_seven() {
        let ticks = price_ticks(0.0, 97.0, 5);
        assert_eq!(ticks.as_slice(), &[0.0, 20.0, 40.0, 60.0, 80.0]);
    }

    #[test]
    fn degenerate_domain_yields_single_tick() {
        let ticks = price_ticks(42.0, 42.0, 5);
        assert_eq!(ticks.as_slice(), &[42.0]);
    }

    #[test]
    fn non_positive_range_falls_back_to_smallest_step() {
        assert_eq!(select_time_step_ms(0, 5), TIME_STEPS_MS[0]);
        assert_eq!(select_time_step_ms(-10, 5), TIME_STEPS_MS[0]);
    }

    #[test]
    fn ticks_land_on_step_multiples_inside_range() {
        // 6 hours starting 10 minutes past a whole hour.
        let start = 1_700_000_000_000_i64;
        let end = start + 6 * 3_600_000;
        let ticks = time_ticks(start, end, 5);
        assert!(!ticks.is_empty());
        let step = select_time_step_ms(end - start, 5);
        for tick in &ticks {
            assert_eq!(tick.time_ms.rem_euclid(step), 0);
            assert!(tick.time_ms >= start && tick.time_ms <= end);
        }
    }

    #[test]
    fn label_pattern_follows_step_size() {
        // 2021-03-04 05:06:00 UTC.
        let ms = 1_614_834_360_000_i64;
        assert_eq!(format_time_label(ms, 3_600_000), "05:06");
        assert_eq!(format_time_label(ms, 86_400_000), "04");
        assert_eq!(format_time_label(ms, 2_592_000_000), "Mar");
        assert_eq!(format_time_label(ms, 31_536_000_000), "2021");
    }
}
