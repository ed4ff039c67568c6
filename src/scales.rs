use crate::data_types::{Range, MIN_SPAN};

/// Affine map from a data domain onto a pixel range.
///
/// The pixel range may be inverted (`range.0 > range.1`) for axes that grow
/// downward on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: Range, range: (f64, f64)) -> Self {
        Self {
            domain: (domain.min, domain.max),
            range,
        }
    }

    fn domain_span(&self) -> f64 {
        let span = self.domain.1 - self.domain.0;
        if span.abs() < MIN_SPAN {
            MIN_SPAN
        } else {
            span
        }
    }

    pub fn map(&self, value: f64) -> f64 {
        let t = (value - self.domain.0) / self.domain_span();
        let res = self.range.0 + t * (self.range.1 - self.range.0);
        if res.is_finite() {
            res
        } else {
            self.range.0
        }
    }

    pub fn invert(&self, pixel: f64) -> f64 {
        let extent = self.range.1 - self.range.0;
        if extent.abs() < f64::EPSILON {
            return self.domain.0;
        }
        let t = (pixel - self.range.0) / extent;
        self.domain.0 + t * self.domain_span()
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Returns (m, c) such that pixel = value * m + c
    pub fn linear_coeffs(&self) -> (f64, f64) {
        let m = (self.range.1 - self.range.0) / self.domain_span();
        let c = self.range.0 - m * self.domain.0;
        (m, c)
    }
}
