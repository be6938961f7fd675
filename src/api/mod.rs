//! Public engine facade: owns the bars, indicator instances, and view state,
//! and assembles the per-draw scene.

mod engine;
mod snapshot;

pub use engine::{ChartEngine, ChartEngineConfig};
pub use snapshot::ChartSnapshot;
