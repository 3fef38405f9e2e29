use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfigBuilder {
    decay_monotonically: bool,
    monotonic_decay_velocity: f64,

    min_sigma: f64,
    max_sigma: f64,

    tau: f64,
    epsilon: f64,
}

impl Default for EngineConfigBuilder {
    fn default() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }
}

impl EngineConfigBuilder {
    pub fn new() -> EngineConfigBuilder {
        EngineConfigBuilder {
            decay_monotonically: true,
            monotonic_decay_velocity: 1.0,

            min_sigma: 0.0,
            max_sigma: 0.12,

            tau: 0.06,
            epsilon: 1e-6,
        }
    }

    /// If set, an inactive entity loses rating as its deviation grows.
    pub fn decay_monotonically(&mut self, decay_monotonically: bool) -> &mut Self {
        self.decay_monotonically = decay_monotonically;
        self
    }

    pub fn monotonic_decay_velocity(&mut self, monotonic_decay_velocity: f64) -> &mut Self {
        assert!(monotonic_decay_velocity >= 0.0);
        self.monotonic_decay_velocity = monotonic_decay_velocity;
        self
    }

    pub fn min_sigma(&mut self, min_sigma: f64) -> &mut Self {
        assert!(min_sigma >= 0.0);
        self.min_sigma = min_sigma;
        self
    }

    pub fn max_sigma(&mut self, max_sigma: f64) -> &mut Self {
        assert!(!max_sigma.is_nan());
        self.max_sigma = max_sigma;
        self
    }

    /// Constrains the change in volatility over time.
    pub fn tau(&mut self, tau: f64) -> &mut Self {
        assert!(tau > 0.0);
        self.tau = tau;
        self
    }

    /// Convergence tolerance of the volatility solver.
    pub fn epsilon(&mut self, epsilon: f64) -> &mut Self {
        assert!(epsilon > 0.0);
        self.epsilon = epsilon;
        self
    }

    pub fn build(&self) -> EngineConfig {
        match EngineConfig::try_from(self.clone()) {
            Ok(config) => config,
            Err(err) => panic!("{err}"),
        }
    }
}

/// Parameters of a [`RatingEngine`](crate::RatingEngine), fixed for its
/// lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EngineConfigBuilder")]
pub struct EngineConfig {
    decay_monotonically: bool,
    monotonic_decay_velocity: f64,

    min_sigma: f64,
    max_sigma: f64,

    tau: f64,
    epsilon: f64,
}

impl TryFrom<EngineConfigBuilder> for EngineConfig {
    type Error = Error;

    fn try_from(builder: EngineConfigBuilder) -> Result<EngineConfig, Error> {
        if !(builder.monotonic_decay_velocity >= 0.0) {
            return Err(Error::invalid_argument("monotonic_decay_velocity must be non-negative"));
        }
        if !(builder.min_sigma >= 0.0 && builder.min_sigma <= builder.max_sigma) {
            return Err(Error::invalid_argument("expected 0 <= min_sigma <= max_sigma"));
        }
        if !(builder.tau > 0.0) {
            return Err(Error::invalid_argument("tau must be positive"));
        }
        if !(builder.epsilon > 0.0) {
            return Err(Error::invalid_argument("epsilon must be positive"));
        }

        Ok(EngineConfig {
            decay_monotonically: builder.decay_monotonically,
            monotonic_decay_velocity: builder.monotonic_decay_velocity,

            min_sigma: builder.min_sigma,
            max_sigma: builder.max_sigma,

            tau: builder.tau,
            epsilon: builder.epsilon,
        })
    }
}

impl Default for EngineConfig {
    fn default() -> EngineConfig {
        EngineConfig::new()
    }
}

impl EngineConfig {
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    pub fn new() -> EngineConfig {
        EngineConfig::builder().build()
    }

    pub fn decay_monotonically(&self) -> bool {
        self.decay_monotonically
    }

    pub fn monotonic_decay_velocity(&self) -> f64 {
        self.monotonic_decay_velocity
    }

    pub fn min_sigma(&self) -> f64 {
        self.min_sigma
    }

    pub fn max_sigma(&self) -> f64 {
        self.max_sigma
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}
