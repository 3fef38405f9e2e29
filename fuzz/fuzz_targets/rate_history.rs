#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use chrono::{DateTime, Duration, Utc};
use glicko2_periods::{EngineConfig, Instant, Rating, RatingEngine, RatingEntity, Step};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary)]
struct ArbitraryEntity {
    rating: f64,
    deviation: f64,
}

impl ArbitraryEntity {
    fn into_clamped(self, key: usize) -> Option<RatingEntity> {
        if self.rating.is_nan() || self.deviation.is_nan() {
            None
        } else {
            Some(RatingEntity::from_rating(
                key.to_string(),
                Rating::new(self.rating.clamp(-1000.0, 4000.0), self.deviation.clamp(1.0, 500.0)),
            ))
        }
    }
}

#[derive(Arbitrary)]
struct ArbitraryOutcome {
    subject: u8,
    opponent: u8,
    score: f64,
    minutes: u16,
}

#[derive(Arbitrary)]
struct History {
    entities: Vec<ArbitraryEntity>,
    outcomes: Vec<ArbitraryOutcome>,
    decay_monotonically: bool,
    tau: f64,
    step: u8,
    step_size: u8,
}

fn assert_entity(entity: &RatingEntity, config: &EngineConfig) {
    assert!(!entity.mu().is_nan());
    assert!(!entity.phi().is_nan());
    assert!(entity.sigma() >= config.min_sigma());
    assert!(entity.sigma() <= config.max_sigma());
}

fuzz_target!(|data: &[u8]| {
    let mut u = Unstructured::new(data);
    let Ok(history) = History::arbitrary(&mut u) else {
        return;
    };
    let Some(entities) = history
        .entities
        .into_iter()
        .enumerate()
        .map(|(key, entity)| entity.into_clamped(key))
        .collect::<Option<Vec<_>>>()
    else {
        return;
    };
    if entities.is_empty() || history.tau.is_nan() {
        return;
    }

    let config = EngineConfig::builder()
        .decay_monotonically(history.decay_monotonically)
        .tau(history.tau.clamp(0.2, 1.2))
        .build();
    let step = match history.step % 3 {
        0 => Step::Day,
        1 => Step::Week,
        _ => Step::Month,
    };
    let origin = Instant(DateTime::<Utc>::from_timestamp(0, 0).unwrap_or_default());

    let mut engine = RatingEngine::with_config(config.clone());
    for outcome in history.outcomes {
        let subject = &entities[usize::from(outcome.subject) % entities.len()];
        let opponent = &entities[usize::from(outcome.opponent) % entities.len()];
        let occurred_at = Instant(origin.0 + Duration::minutes(i64::from(outcome.minutes) * 37));
        if let Ok(outcome) = subject.vs(opponent, outcome.score, occurred_at) {
            engine.add_outcome(outcome);
        }
    }

    let step_size = u32::from(history.step_size.max(1));
    let Ok(batches) = engine.rate(step_size, step, None) else {
        return;
    };
    for batch in &batches {
        for entry in batch.entries() {
            if let Some(after) = entry.after() {
                assert_entity(after, &config);
            }
        }
    }
    for entity in engine.roster().iter() {
        assert_entity(entity, &config);
    }
});
