#![forbid(unsafe_code)]

//! Axis ranges and value scales.

/// Headroom multiplier above the largest drawn value.
pub const HEADROOM: f64 = 1.1;

/// `[0, 1.1 × max]` over the values being drawn.
///
/// Empty, all-zero, or non-finite input yields `[0, 1]` so the axis never
/// collapses to a point.
#[must_use]
pub fn value_range<I>(values: I) -> [f64; 2]
where
    I: IntoIterator<Item = f64>,
{
    let max = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    if max <= 0.0 { [0.0, 1.0] } else { [0.0, max * HEADROOM] }
}

/// [`value_range`] for integer counts.
#[must_use]
pub fn count_range(values: &[u64]) -> [f64; 2] {
    value_range(values.iter().map(|v| *v as f64))
}

/// X range for a year axis: first year through `max(last year, cap)`.
#[must_use]
pub fn year_range(years: &[i64], cap: Option<i64>) -> Option<[f64; 2]> {
    let first = *years.first()?;
    let last = *years.last()?;
    let end = cap.map_or(last, |cap| cap.max(last));
    Some([first as f64, end as f64])
}

/// Linear map from a value domain onto an output range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    #[must_use]
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Map a value. A degenerate domain maps everything to the range midpoint.
    #[must_use]
    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span.abs() < f64::EPSILON {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / span * (r1 - r0)
    }
}
