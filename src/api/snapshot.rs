use serde::{Deserialize, Serialize};

use crate::core::{PriceDomain, Viewport, VisibleRange};
use crate::error::{ChartError, ChartResult};

/// Serializable view of the chart's current derived state, for debugging
/// and regression capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSnapshot {
    pub bar_count: usize,
    pub viewport: Viewport,
    pub visible_range: Option<VisibleRange>,
    pub price_domain: Option<PriceDomain>,
    pub price_ticks: Vec<f64>,
    pub time_tick_labels: Vec<String>,
}

impl ChartSnapshot {
    pub fn to_json(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|err| ChartError::InvalidData(format!("snapshot serialization: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::ChartSnapshot;
    use crate::core::{PriceDomain, Viewport, VisibleRange};

    #[test]
    fn snapshot_round_trips_through_json() {
        let snapshot = ChartSnapshot {
            bar_count: 120,
            viewport: Viewport::new(700.0, 400.0),
            visible_range: Some(VisibleRange { start: 20, end: 119 }),
            price_domain: Some(PriceDomain {
                min: 95.0,
                max: 105.0,
            }),
            price_ticks: vec![96.0, 98.0, 100.0, 102.0, 104.0],
            time_tick_labels: vec!["05:00".to_owned(), "06:00".to_owned()],
        };

        let json = snapshot.to_json().unwrap();
        let parsed: ChartSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
