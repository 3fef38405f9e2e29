//! Glicko-2 ratings computed over calendar rating periods.
//!
//! Outcomes between entities are collected in a [`RatingEngine`]. Each call
//! to [`RatingEngine::rate()`] partitions the complete history into
//! consecutive periods of days, weeks or months, and applies one Glicko-2
//! update per entity and period. Entities without outcomes in a period become
//! less certain and, optionally, decay in rating.
//!
//! ```
//! use glicko2_periods::{Instant, Rating, RatingEngine, RatingEntity, Step};
//!
//! let alice = RatingEntity::from_rating("alice", Rating::new(1500.0, 200.0));
//! let bob = RatingEntity::from_rating("bob", Rating::new(1400.0, 30.0));
//!
//! let mut engine = RatingEngine::new();
//! engine.add_outcome(alice.vs(&bob, 1.0, Instant::now())?);
//! let periods = engine.rate(1, Step::Week, None)?;
//!
//! assert_eq!(periods.len(), 1);
//! assert!(engine.entity("alice").unwrap().mu() > alice.mu());
//! # Ok::<_, glicko2_periods::Error>(())
//! ```

mod batch;
mod collection;
mod config;
mod engine;
mod entity;
mod error;
pub mod glicko;
mod instant;
mod outcome;
mod rating;
mod roster;
mod scale;
mod score;

pub use batch::{BatchEntry, OutcomeBatch};
pub use collection::OutcomeCollection;
pub use config::{EngineConfig, EngineConfigBuilder};
pub use engine::RatingEngine;
pub use entity::{Glicko, RatingEntity};
pub use error::Error;
pub use instant::{Instant, Step};
pub use outcome::Outcome;
pub use rating::{Rating, RatingDifference, RatingScalar, Volatility};
pub use roster::{EntityId, Roster};
pub use scale::Scale;
pub use score::Score;
