use serde::{Deserialize, Serialize};

use crate::core::types::OhlcvBar;
use crate::core::viewport::VisibleRange;

/// Symmetric padding applied after scanning visible highs/lows.
pub const DOMAIN_PADDING_RATIO: f64 = 0.05;

/// Vertical value range an axis currently represents, after padding.
///
/// `min == max` is a valid degenerate state (flat visible series); callers
/// must check [`PriceDomain::is_degenerate`] before dividing by the range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceDomain {
    pub min: f64,
    pub max: f64,
}

impl PriceDomain {
    /// Pads a raw min/max pair by [`DOMAIN_PADDING_RATIO`] on both sides.
    ///
    /// A flat input (`max == min`) yields a zero buffer and a degenerate
    /// domain rather than an error.
    #[must_use]
    pub fn padded(min: f64, max: f64) -> Self {
        let buffer = (max - min) * DOMAIN_PADDING_RATIO;
        Self {
            min: min - buffer,
            max: max + buffer,
        }
    }

    #[must_use]
    pub fn range(self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn is_degenerate(self) -> bool {
        self.range() == 0.0
    }

    /// Smallest domain covering `self` and `other`.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// Scans visible bars' lows/highs and produces the padded price domain.
///
/// Returns `None` when the range selects no finite values; callers skip
/// drawing instead of dividing by zero.
#[must_use]
pub fn price_domain(bars: &[OhlcvBar], range: VisibleRange) -> Option<PriceDomain> {
    let visible = bars.get(range.start..=range.end)?;
    raw_min_max(visible.iter().flat_map(|bar| [bar.low, bar.high]))
        .map(|(min, max)| PriceDomain::padded(min, max))
}

/// Padded domain over an indicator's visible output samples.
///
/// `None` samples (warmup gaps) and non-finite values are skipped; if
/// nothing remains the contribution is `None`.
#[must_use]
pub fn series_domain(series: &[Option<f64>], range: VisibleRange) -> Option<PriceDomain> {
    let visible = series.get(range.start..=range.end)?;
    raw_min_max(visible.iter().copied().flatten())
        .map(|(min, max)| PriceDomain::padded(min, max))
}

/// Unpadded min/max over visible samples, the raw form indicators report
/// through `data_range` before the shared reducer pads it.
#[must_use]
pub fn series_min_max(series: &[Option<f64>], range: VisibleRange) -> Option<(f64, f64)> {
    let visible = series.get(range.start..=range.end)?;
    raw_min_max(visible.iter().copied().flatten())
}

fn raw_min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for value in values {
        if !value.is_finite() {
            continue;
        }
        min = min.min(value);
        max = max.max(value);
    }

    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{PriceDomain, price_domain};
    use crate::core::types::OhlcvBar;
    use crate::core::viewport::VisibleRange;

    fn bar(low: f64, high: f64) -> OhlcvBar {
        OhlcvBar::new(0, low, high, low, high, 0).expect("valid bar")
    }

    #[test]
    fn domain_is_padded_five_percent() {
        let bars = vec![bar(10.0, 20.0), bar(12.0, 30.0)];
        let domain =
            price_domain(&bars, VisibleRange { start: 0, end: 1 }).expect("non-empty domain");
        // Raw range 10..30, buffer = 20 * 0.05 = 1.
        assert!((domain.min - 9.0).abs() <= 1e-12);
        assert!((domain.max - 31.0).abs() <= 1e-12);
    }

    #[test]
    fn flat_series_yields_degenerate_domain() {
        let bars = vec![bar(15.0, 15.0); 3];
        let domain =
            price_domain(&bars, VisibleRange { start: 0, end: 2 }).expect("non-empty domain");
        assert!(domain.is_degenerate());
        assert_eq!(domain.min, 15.0);
        assert_eq!(domain.max, 15.0);
    }

    #[test]
    fn out_of_bounds_range_produces_no_domain() {
        let bars = vec![bar(1.0, 2.0)];
        assert!(price_domain(&bars, VisibleRange { start: 0, end: 5 }).is_none());
    }

    #[test]
    fn merge_covers_both_domains() {
        let merged = PriceDomain { min: 1.0, max: 5.0 }.merge(PriceDomain { min: 0.0, max: 3.0 });
        assert_eq!(merged.min, 0.0);
        assert_eq!(merged.max, 5.0);
    }
}
