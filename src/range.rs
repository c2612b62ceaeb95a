// SPDX: CC0-1.0

use crate::Number;
use core::fmt;

/// Range used when there is nothing to look at.
pub const DEFAULT_RANGE: AxisRange = AxisRange {
    min: -1.0,
    max: 1.0,
};

/// Half width of the window around a single value.
pub const MIN_HALF_WIDTH: Number = 0.5;

// window around large values has to stay wider than their spacing
const RELATIVE_MARGIN: Number = 1e-6;

const LOW_PERCENTILE: Number = 1.0;
const HIGH_PERCENTILE: Number = 99.0;

/// Visible bounds of one axis. Always finite with `min < max`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisRange {
    pub min: Number,
    pub max: Number,
}

impl AxisRange {
    /// Window of half width `half` around `center`, widened when it would
    /// collapse and clamped to finite bounds.
    pub fn around(center: Number, half: Number) -> Self {
        let range = Self::clamped(center, half);
        // a half width below the spacing of floats around `center` collapses
        if half > 0.0 && range.min < range.max {
            range
        } else {
            Self::clamped(center, MIN_HALF_WIDTH.max(center.abs() * RELATIVE_MARGIN))
        }
    }

    fn clamped(center: Number, half: Number) -> Self {
        Self {
            min: (center - half).max(-Number::MAX),
            max: (center + half).min(Number::MAX),
        }
    }

    pub fn width(&self) -> Number {
        self.max - self.min
    }

    pub fn center(&self) -> Number {
        self.min / 2.0 + self.max / 2.0
    }

    pub fn contains(&self, val: Number) -> bool {
        self.min <= val && val <= self.max
    }
}

impl Default for AxisRange {
    fn default() -> Self {
        DEFAULT_RANGE
    }
}

impl fmt::Display for AxisRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Linear interpolation between the closest ranks of an ascending slice.
pub fn percentile(sorted: &[Number], p: Number) -> Option<Number> {
    let last = sorted.len().checked_sub(1)?;
    let rank = (p / 100.0).clamp(0.0, 1.0) * last as Number;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as Number;
    // weighted sum rather than a difference, which overflows on extreme values
    Some(sorted[lo] * (1.0 - frac) + sorted[hi] * frac)
}

/// Robust display range of the finite entries in `values`, trimmed to the
/// 1st..99th percentile and scaled around its center by `zoom`.
pub fn normalize_axis<I>(values: I, zoom: Number) -> AxisRange
where
    I: IntoIterator<Item = Number>,
{
    let mut finite: Vec<Number> = values.into_iter().filter(|val| val.is_finite()).collect();
    finite.sort_unstable_by(Number::total_cmp);

    match finite.as_slice() {
        [] => DEFAULT_RANGE,
        [only] => AxisRange::around(*only, MIN_HALF_WIDTH),
        sorted => {
            let (low, high) = match (
                percentile(sorted, LOW_PERCENTILE),
                percentile(sorted, HIGH_PERCENTILE),
            ) {
                (Some(low), Some(high)) => (low, high),
                _ => return DEFAULT_RANGE,
            };
            // halve first so extreme values cannot overflow
            let center = low / 2.0 + high / 2.0;
            let half = (high / 2.0 - low / 2.0) * zoom;
            AxisRange::around(center, half)
        }
    }
}

/// Range of the x axis: the declared bounds multiplied by `zoom`.
pub fn scale_domain(min: Number, max: Number, zoom: Number) -> AxisRange {
    let (a, b) = (min * zoom, max * zoom);
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if !(lo.is_finite() && hi.is_finite()) {
        return DEFAULT_RANGE;
    }
    let center = lo / 2.0 + hi / 2.0;
    AxisRange::around(center, hi / 2.0 - lo / 2.0)
}
