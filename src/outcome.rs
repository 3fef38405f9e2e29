use crate::{Error, Instant, RatingEntity, Score};

/// A result of `subject` against `opponent`, from the perspective of
/// `subject`.
///
/// The entities carried by an outcome are copies. Rating state lives in the
/// [`RatingEngine`](crate::RatingEngine), keyed by [`RatingEntity::key()`].
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    subject: RatingEntity,
    opponent: RatingEntity,
    score: Score,
    occurred_at: Instant,
}

impl Outcome {
    /// Fails with [`Error::OutOfRange`] unless `score` is in `0.0..=1.0`.
    pub fn new(
        subject: RatingEntity,
        opponent: RatingEntity,
        score: f64,
        occurred_at: Instant,
    ) -> Result<Outcome, Error> {
        Ok(Outcome::with_score(subject, opponent, Score::new(score)?, occurred_at))
    }

    pub fn with_score(
        subject: RatingEntity,
        opponent: RatingEntity,
        score: Score,
        occurred_at: Instant,
    ) -> Outcome {
        Outcome {
            subject,
            opponent,
            score,
            occurred_at,
        }
    }

    pub fn subject(&self) -> &RatingEntity {
        &self.subject
    }

    pub fn opponent(&self) -> &RatingEntity {
        &self.opponent
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn occurred_at(&self) -> Instant {
        self.occurred_at
    }
}
