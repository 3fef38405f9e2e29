use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Error, Instant, Outcome, Rating, Scale, Volatility};

/// Rating state on the internal Glicko-2 scale.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glicko {
    /// Strength. Higher is better.
    pub mu: f64,
    /// Uncertainty in `mu`.
    pub phi: f64,
    /// Volatility, the expected magnitude of fluctuations in `mu`.
    pub sigma: f64,
}

impl Default for Glicko {
    fn default() -> Glicko {
        Glicko {
            mu: 0.0,
            phi: 2.0,
            sigma: Volatility::DEFAULT.0,
        }
    }
}

/// A competitor with mutable rating state and the immutable initial state it
/// was created with.
///
/// Each rating run starts over from the initial state, so the same entity can
/// be rated again and again as the history grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingEntity {
    key: Arc<str>,
    current: Glicko,
    initial: Glicko,
}

impl RatingEntity {
    pub fn new(key: impl Into<Arc<str>>, initial: Glicko) -> RatingEntity {
        RatingEntity {
            key: key.into(),
            current: initial,
            initial,
        }
    }

    /// An entity with `mu = 0`, `phi = 2` and `sigma = 0.06`.
    pub fn with_key(key: impl Into<Arc<str>>) -> RatingEntity {
        RatingEntity::new(key, Glicko::default())
    }

    /// Creates an entity from a rating on the default scale (median 1500,
    /// factor 400) with the default volatility.
    pub fn from_rating(key: impl Into<Arc<str>>, rating: Rating) -> RatingEntity {
        RatingEntity::scale_from_rating(key, rating, Scale::default(), Volatility::DEFAULT)
    }

    pub fn scale_from_rating(
        key: impl Into<Arc<str>>,
        rating: Rating,
        scale: Scale,
        sigma: Volatility,
    ) -> RatingEntity {
        RatingEntity::new(
            key,
            Glicko {
                mu: scale.to_mu(rating.rating),
                phi: scale.to_phi(rating.deviation),
                sigma: sigma.into(),
            },
        )
    }

    /// The current state on the default scale.
    pub fn to_rating(&self) -> Rating {
        self.scale_to_rating(Scale::default())
    }

    pub fn scale_to_rating(&self, scale: Scale) -> Rating {
        Rating {
            rating: scale.from_mu(self.current.mu),
            deviation: scale.from_phi(self.current.phi),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn shared_key(&self) -> &Arc<str> {
        &self.key
    }

    pub fn glicko(&self) -> Glicko {
        self.current
    }

    pub fn initial(&self) -> Glicko {
        self.initial
    }

    pub fn mu(&self) -> f64 {
        self.current.mu
    }

    pub fn phi(&self) -> f64 {
        self.current.phi
    }

    pub fn sigma(&self) -> f64 {
        self.current.sigma
    }

    pub fn initial_mu(&self) -> f64 {
        self.initial.mu
    }

    pub fn initial_phi(&self) -> f64 {
        self.initial.phi
    }

    pub fn initial_sigma(&self) -> f64 {
        self.initial.sigma
    }

    pub fn diff_mu(&self) -> f64 {
        self.current.mu - self.initial.mu
    }

    pub fn diff_phi(&self) -> f64 {
        self.current.phi - self.initial.phi
    }

    pub fn diff_sigma(&self) -> f64 {
        self.current.sigma - self.initial.sigma
    }

    pub fn revert_to_initial(&mut self) -> &mut RatingEntity {
        self.current = self.initial;
        self
    }

    /// Overwrites the current state. `sigma` is kept if `sigma_prime` is
    /// `None`.
    pub fn update(
        &mut self,
        mu_prime: f64,
        phi_prime: f64,
        sigma_prime: Option<f64>,
    ) -> &mut RatingEntity {
        self.current = Glicko {
            mu: mu_prime,
            phi: phi_prime,
            sigma: sigma_prime.unwrap_or(self.current.sigma),
        };
        self
    }

    /// Records a result of `self` against `opponent`, from the perspective of
    /// `self`.
    pub fn vs(
        &self,
        opponent: &RatingEntity,
        score: f64,
        occurred_at: Instant,
    ) -> Result<Outcome, Error> {
        Outcome::new(self.clone(), opponent.clone(), score, occurred_at)
    }
}
