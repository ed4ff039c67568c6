use serde::{Deserialize, Serialize};

/// Smallest domain span used when a range collapses to a single value.
pub const MIN_SPAN: f64 = 1e-9;

/// Visible window on one axis, in domain units. Always `min <= max`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Default for Range {
    fn default() -> Self {
        Self { min: 0.0, max: 0.0 }
    }
}

impl Range {
    /// Builds a range from two endpoints in any order.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    /// Builds a range from untrusted input (e.g. an editable field or a stored view).
    ///
    /// Non-finite endpoints are replaced by the matching endpoint of `fallback`,
    /// inverted endpoints are swapped.
    pub fn sanitized(min: f64, max: f64, fallback: Range) -> Self {
        let min = if min.is_finite() { min } else { fallback.min };
        let max = if max.is_finite() { max } else { fallback.max };
        Self::new(min, max)
    }

    /// Range over `0..=len-1`, or `None` for an empty axis.
    pub fn of_len(len: usize) -> Option<Self> {
        if len == 0 {
            None
        } else {
            Some(Self::new(0.0, (len - 1) as f64))
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Span guarded against zero, for use as a divisor.
    pub fn safe_span(&self) -> f64 {
        self.span().max(MIN_SPAN)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// `true` when `other` lies entirely inside `self`.
    pub fn contains_range(&self, other: &Range) -> bool {
        other.min >= self.min && other.max <= self.max
    }

    pub fn clamp_value(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Narrows `candidate` so it cannot escape `self`.
    ///
    /// A candidate lying completely outside collapses onto the nearest edge.
    pub fn intersect(&self, candidate: &Range) -> Range {
        let min = candidate.min.max(self.min).min(self.max);
        let max = candidate.max.min(self.max).max(min);
        Range { min, max }
    }

    /// Rounds both endpoints to the nearest index, for index-domain axes.
    pub fn to_index_bounds(&self) -> (usize, usize) {
        let lo = self.min.round().max(0.0) as usize;
        let hi = self.max.round().max(0.0) as usize;
        (lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_orders_endpoints() {
        let r = Range::new(9.0, 2.0);
        assert_eq!(r.min, 2.0);
        assert_eq!(r.max, 9.0);
    }

    #[test]
    fn test_sanitized_replaces_non_finite() {
        let fallback = Range::new(0.0, 11.0);
        let r = Range::sanitized(f64::NAN, 4.0, fallback);
        assert_eq!(r, Range::new(0.0, 4.0));
        let r = Range::sanitized(7.0, f64::INFINITY, fallback);
        assert_eq!(r, Range::new(7.0, 11.0));
        let r = Range::sanitized(8.0, 3.0, fallback);
        assert_eq!(r, Range::new(3.0, 8.0));
    }

    #[test]
    fn test_intersect_never_escapes() {
        let outer = Range::new(20.0, 29.0);
        assert_eq!(outer.intersect(&Range::new(22.0, 25.0)), Range::new(22.0, 25.0));
        assert_eq!(outer.intersect(&Range::new(10.0, 35.0)), outer);
        let r = outer.intersect(&Range::new(40.0, 50.0));
        assert!(outer.contains_range(&r));
        assert_eq!(r.min, r.max);
    }

    #[test]
    fn test_of_len() {
        assert!(Range::of_len(0).is_none());
        assert_eq!(Range::of_len(30), Some(Range::new(0.0, 29.0)));
    }
}
