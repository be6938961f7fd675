//! flexchart: bar-indexed charting core for candlestick panes.
//!
//! The crate computes visible ranges, nice axis ticks, pixel coordinates,
//! candle geometry, and indicator series, and emits backend-agnostic drawing
//! primitives through a [`render::Renderer`] port. It owns no drawing
//! surface; hosts supply pane dimensions and consume render frames.

pub mod api;
pub mod core;
pub mod error;
pub mod indicators;
pub mod interaction;
pub mod render;
pub mod scene;
pub mod telemetry;

pub use api::{ChartEngine, ChartEngineConfig};
pub use error::{ChartError, ChartResult};
