use serde::{Deserialize, Serialize};

use crate::Error;

/// A score or expectation value in the range `0.0..=1.0`, where `0.0` is a
/// loss and `1.0` is a win.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Score(f64);

impl From<Score> for f64 {
    #[inline]
    fn from(Score(score): Score) -> f64 {
        score
    }
}

impl TryFrom<f64> for Score {
    type Error = Error;

    fn try_from(score: f64) -> Result<Score, Error> {
        Score::new(score)
    }
}

impl Score {
    pub const LOSS: Score = Score(0.0);
    pub const DRAW: Score = Score(0.5);
    pub const WIN: Score = Score(1.0);

    /// Validates that `score` lies in `0.0..=1.0`. NaN is rejected as well.
    pub fn new(score: f64) -> Result<Score, Error> {
        if (0.0..=1.0).contains(&score) {
            Ok(Score(score))
        } else {
            Err(Error::OutOfRange { score })
        }
    }

    #[must_use]
    #[inline]
    pub fn opposite(self) -> Score {
        Score(1.0 - self.0)
    }

    #[inline]
    pub fn value(self) -> f64 {
        self.0
    }
}
