use std::f64::consts::LN_10;

use crate::{RatingDifference, RatingScalar};

/// Mapping between the human-facing rating scale and the internal Glicko-2
/// scale, on which `mu` and `phi` are measured.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Scale {
    median: f64,
    factor: f64,
}

impl Default for Scale {
    fn default() -> Scale {
        Scale::new(1500.0, 400.0)
    }
}

impl Scale {
    /// `median` is the rating corresponding to `mu = 0`. A rating difference
    /// of `factor` corresponds to 10:1 odds.
    pub fn new(median: f64, factor: f64) -> Scale {
        assert!(factor > 0.0);
        Scale { median, factor }
    }

    pub fn median(&self) -> f64 {
        self.median
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Rating points per internal unit, `173.7178` for the default scale.
    #[inline]
    fn points_per_unit(&self) -> f64 {
        self.factor / LN_10
    }

    #[inline]
    pub fn to_mu(&self, RatingScalar(rating): RatingScalar) -> f64 {
        (rating - self.median) / self.points_per_unit()
    }

    #[inline]
    pub fn to_phi(&self, RatingDifference(deviation): RatingDifference) -> f64 {
        deviation / self.points_per_unit()
    }

    #[inline]
    pub fn from_mu(&self, mu: f64) -> RatingScalar {
        RatingScalar(self.median) + self.from_phi(mu)
    }

    #[inline]
    pub fn from_phi(&self, phi: f64) -> RatingDifference {
        RatingDifference(self.points_per_unit()) * phi
    }
}
