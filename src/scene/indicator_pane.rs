use crate::core::{
    CoordinateMapper, OhlcvBar, PriceDomain, Viewport, VisibleRange, price_ticks,
};
use crate::error::ChartResult;
use crate::indicators::Indicator;
use crate::render::RenderFrame;
use crate::scene::price_pane::paint_gridlines;

/// A built indicator sub-pane plus the mapper it was projected through, so
/// the caller can reuse the same scale for the pane's value axis and for
/// crosshair readouts.
#[derive(Debug, Clone)]
pub struct IndicatorPaneScene {
    pub frame: RenderFrame,
    pub mapper: CoordinateMapper,
    pub value_ticks: Vec<f64>,
}

/// Pane-local frame for one non-overlay indicator.
///
/// The sub-pane derives its own padded value domain from the indicator's
/// visible output, independent of the price pane, while x positions stay
/// shared through the common viewport geometry.
pub fn build_indicator_pane(
    bars: &[OhlcvBar],
    indicator: &dyn Indicator,
    viewport: Viewport,
    range: VisibleRange,
    time_tick_xs: &[f64],
    desired_value_ticks: usize,
) -> ChartResult<IndicatorPaneScene> {
    let domain = indicator
        .data_range(bars, range)
        .map_or(PriceDomain { min: 0.0, max: 0.0 }, |(min, max)| {
            PriceDomain::padded(min, max)
        });
    let mapper = CoordinateMapper::new(viewport, range, domain)?;
    let value_ticks: Vec<f64> = price_ticks(domain.min, domain.max, desired_value_ticks)
        .into_iter()
        .collect();

    let mut frame = RenderFrame::new();
    paint_gridlines(mapper, &value_ticks, time_tick_xs, &mut frame);
    indicator.paint(bars, mapper, &mut frame);

    Ok(IndicatorPaneScene {
        frame,
        mapper,
        value_ticks,
    })
}

#[cfg(test)]
mod tests {
    use super::build_indicator_pane;
    use crate::core::{OhlcvBar, Viewport, VisibleRange};
    use crate::indicators::{Indicator, Macd, MacdConfig};

    #[test]
    fn sub_pane_scales_to_its_own_data() {
        let bars: Vec<OhlcvBar> = (0..60)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.7).sin() * 5.0;
                OhlcvBar::new(i as i64 * 60_000, close, close + 1.0, close - 1.0, close, 1)
                    .unwrap()
            })
            .collect();
        let mut macd = Macd::new(MacdConfig::default()).unwrap();
        macd.recompute(&bars);

        let range = VisibleRange { start: 0, end: 59 };
        let scene = build_indicator_pane(
            &bars,
            &macd,
            Viewport::new(700.0, 150.0),
            range,
            &[],
            4,
        )
        .unwrap();

        // MACD values live near zero, far from the 100-ish price domain.
        let domain = scene.mapper.domain();
        assert!(domain.min < 0.0 || domain.max < 10.0);
        assert!(!scene.frame.is_empty());
    }
}
