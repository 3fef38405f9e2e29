use tracing::{debug, trace};

use crate::{
    glicko, EngineConfig, EntityId, Error, Glicko, Instant, Outcome, OutcomeBatch,
    OutcomeCollection, RatingEntity, Roster, Score, Step,
};

/// Outcome of rating one entity for one period, before it is committed.
enum Update {
    Active(EntityId, Glicko),
    Inactive(EntityId, Glicko),
}

/// Computes Glicko-2 ratings from the complete history of outcomes.
///
/// The engine owns the canonical instance of every entity it has seen. Every
/// call to [`RatingEngine::rate()`] starts over from the initial state of each
/// entity, so rating the same history twice gives the same result.
#[derive(Debug, Clone, Default)]
pub struct RatingEngine {
    config: EngineConfig,
    roster: Roster,
    outcomes: OutcomeCollection,
}

impl RatingEngine {
    pub fn new() -> RatingEngine {
        RatingEngine::default()
    }

    pub fn with_config(config: EngineConfig) -> RatingEngine {
        RatingEngine {
            config,
            ..RatingEngine::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Records an outcome. Its subject and opponent are registered unless
    /// entities with the same keys are already known.
    pub fn add_outcome(&mut self, outcome: Outcome) -> &mut RatingEngine {
        self.roster.get_or_insert(outcome.subject());
        self.roster.get_or_insert(outcome.opponent());
        self.outcomes.push(outcome);
        self
    }

    pub fn add_outcomes<I>(&mut self, outcomes: I) -> &mut RatingEngine
    where
        I: IntoIterator<Item = Outcome>,
    {
        for outcome in outcomes {
            self.add_outcome(outcome);
        }
        self
    }

    /// The canonical entity with the given key.
    pub fn entity(&self, key: &str) -> Option<&RatingEntity> {
        self.roster.by_key(key)
    }

    /// The canonical instance of `entity`, which may be a copy.
    pub fn entity_of(&self, entity: &RatingEntity) -> Option<&RatingEntity> {
        self.entity(entity.key())
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn outcomes(&self) -> &OutcomeCollection {
        &self.outcomes
    }

    /// Rates all entities from scratch, one period of `step_size` steps at a
    /// time. See [`OutcomeCollection::make_batches()`] for how periods are
    /// formed.
    ///
    /// Returns the periods in ascending order, with the state of each
    /// participating entity before and after the period.
    pub fn rate(
        &mut self,
        step_size: u32,
        step: Step,
        anchor: Option<Instant>,
    ) -> Result<Vec<OutcomeBatch>, Error> {
        let mut batches = self.outcomes.make_batches(step_size, step, anchor)?;

        self.roster.revert_all();

        for batch in &mut batches {
            self.rate_batch(batch);
        }

        debug!(
            entities = self.roster.len(),
            outcomes = self.outcomes.len(),
            batches = batches.len(),
            "rated outcome history"
        );

        Ok(batches)
    }

    fn rate_batch(&mut self, batch: &mut OutcomeBatch) {
        batch.snapshot_befores(&self.roster);

        // All entities of a period are rated simultaneously: every update is
        // computed from the state at the start of the period before any is
        // committed.
        let updates: Vec<Update> = batch
            .entries()
            .iter()
            .filter_map(|entry| {
                let id = self.roster.id(entry.key())?;
                let player = self.roster.get(id)?.glicko();
                Some(if entry.is_active() {
                    let results = entry
                        .outcomes()
                        .iter()
                        .map(|outcome| {
                            let opponent = self.roster.by_key(outcome.opponent().key())?;
                            Some((opponent.glicko(), outcome.score()))
                        })
                        .collect::<Option<Vec<(Glicko, Score)>>>()?;
                    Update::Active(id, glicko::rate_active(player, &results, &self.config))
                } else {
                    Update::Inactive(id, glicko::rate_inactive(player, &self.config))
                })
            })
            .collect();

        for update in updates {
            match update {
                Update::Active(id, rated) => {
                    if let Some(entity) = self.roster.get_mut(id) {
                        entity.update(rated.mu, rated.phi, Some(rated.sigma));
                    }
                }
                Update::Inactive(id, rated) => {
                    if let Some(entity) = self.roster.get_mut(id) {
                        entity.update(rated.mu, rated.phi, None);
                    }
                }
            }
        }

        batch.snapshot_afters(&self.roster);

        trace!(
            at_gte = %batch.at_gte(),
            entities = batch.len(),
            active = batch.entries().iter().filter(|entry| entry.is_active()).count(),
            "rated period"
        );
    }
}
