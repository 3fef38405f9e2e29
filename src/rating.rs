use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Number representing strength on the human-facing scale, such that the
/// difference between two ratings can be used to predict an expected score.
/// Higher is better.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct RatingScalar(pub f64);

impl From<RatingScalar> for f64 {
    #[inline]
    fn from(RatingScalar(rating): RatingScalar) -> f64 {
        rating
    }
}

impl From<f64> for RatingScalar {
    #[inline]
    fn from(rating: f64) -> RatingScalar {
        RatingScalar(rating)
    }
}

impl Sub<RatingScalar> for RatingScalar {
    type Output = RatingDifference;

    #[inline]
    fn sub(self, rhs: RatingScalar) -> RatingDifference {
        RatingDifference(self.0 - rhs.0)
    }
}

impl Add<RatingDifference> for RatingScalar {
    type Output = RatingScalar;

    #[inline]
    fn add(self, RatingDifference(difference): RatingDifference) -> RatingScalar {
        RatingScalar(self.0 + difference)
    }
}

/// A difference between two ratings, or a deviation, on the human-facing
/// scale.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct RatingDifference(pub f64);

impl From<RatingDifference> for f64 {
    #[inline]
    fn from(RatingDifference(difference): RatingDifference) -> f64 {
        difference
    }
}

impl From<f64> for RatingDifference {
    #[inline]
    fn from(difference: f64) -> RatingDifference {
        RatingDifference(difference)
    }
}

impl Mul<f64> for RatingDifference {
    type Output = RatingDifference;

    #[inline]
    fn mul(self, scalar: f64) -> RatingDifference {
        RatingDifference(self.0 * scalar)
    }
}

/// Number indicating the degree of expected fluctuation in a rating.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Volatility(pub f64);

impl Default for Volatility {
    fn default() -> Volatility {
        Volatility::DEFAULT
    }
}

impl Volatility {
    pub const DEFAULT: Volatility = Volatility(0.06);
}

impl From<Volatility> for f64 {
    #[inline]
    fn from(Volatility(volatility): Volatility) -> f64 {
        volatility
    }
}

impl From<f64> for Volatility {
    #[inline]
    fn from(volatility: f64) -> Volatility {
        Volatility(volatility)
    }
}

/// A rating and its deviation on the human-facing scale.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Number indicating strength. Higher is better.
    pub rating: RatingScalar,
    /// Uncertainty in the rating. A range from rating minus twice the deviation
    /// to rating plus twice the deviation approximately represents a 95%
    /// confidence interval.
    pub deviation: RatingDifference,
}

impl Rating {
    pub fn new(rating: f64, deviation: f64) -> Rating {
        Rating {
            rating: RatingScalar(rating),
            deviation: RatingDifference(deviation),
        }
    }
}
