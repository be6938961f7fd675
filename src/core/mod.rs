pub mod coords;
pub mod price_range;
pub mod ticks;
pub mod types;
pub mod viewport;

pub use coords::{CandleGeometry, CoordinateMapper, USABLE_HEIGHT_RATIO, project_visible_candles};
pub use price_range::{
    DOMAIN_PADDING_RATIO, PriceDomain, price_domain, series_domain, series_min_max,
};
pub use ticks::{
    TICK_EPSILON, TIME_STEPS_MS, TimeTick, find_closest_bar_index, format_price_label,
    format_time_label, nice_price_step, price_ticks, select_time_step_ms, time_ticks,
};
pub use types::{OhlcvBar, Viewport, normalize_timestamp_ms};
pub use viewport::{VisibleRange, visible_range, visible_range_for};
