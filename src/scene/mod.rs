//! Pane scene builders.
//!
//! Each builder produces a pane-local [`RenderFrame`]; the engine translates
//! the frames into chart coordinates and merges them into one draw pass.

pub mod crosshair;
pub mod date_axis;
pub mod indicator_pane;
pub mod layout;
pub mod price_axis;
pub mod price_pane;

pub use crosshair::build_crosshair;
pub use date_axis::{PositionedTimeTick, build_date_axis, position_time_ticks};
pub use indicator_pane::{IndicatorPaneScene, build_indicator_pane};
pub use layout::{ChartLayout, DATE_AXIS_HEIGHT_PX, PANE_DIVIDER_PX, PRICE_AXIS_WIDTH_PX};
pub use price_axis::build_price_axis;
pub use price_pane::build_price_pane;

use crate::render::Color;

pub(crate) const BACKGROUND_COLOR: Color = Color::rgb(0.075, 0.09, 0.133);
pub(crate) const GRIDLINE_COLOR: Color = Color::rgba(1.0, 1.0, 1.0, 0.1);
pub(crate) const AXIS_TEXT_COLOR: Color = Color::rgb(0.8, 0.8, 0.8);
pub(crate) const TICK_MARK_COLOR: Color = Color::rgb(0.4, 0.4, 0.4);
pub(crate) const DIVIDER_COLOR: Color = Color::rgb(0.3, 0.3, 0.3);
pub(crate) const CROSSHAIR_COLOR: Color = Color::rgba(0.6, 0.6, 0.6, 0.9);

pub(crate) const TICK_MARK_LENGTH_PX: f64 = 4.0;
