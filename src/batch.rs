use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::{Instant, Outcome, RatingEntity, Roster};

/// Everything a rating period knows about one entity.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    key: Arc<str>,
    before: Option<RatingEntity>,
    after: Option<RatingEntity>,
    outcomes: Vec<Outcome>,
}

impl BatchEntry {
    fn new(key: Arc<str>) -> BatchEntry {
        BatchEntry {
            key,
            before: None,
            after: None,
            outcomes: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Copy of the entity taken when the period started.
    pub fn before(&self) -> Option<&RatingEntity> {
        self.before.as_ref()
    }

    /// Copy of the entity taken when the period ended.
    pub fn after(&self) -> Option<&RatingEntity> {
        self.after.as_ref()
    }

    /// Outcomes in this period where the entity is the subject.
    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn is_active(&self) -> bool {
        !self.outcomes.is_empty()
    }
}

/// A rating period: the half-open interval `at_gte..at_lt`, with an entry for
/// every entity that takes part in it.
///
/// Entries refer to entities by key. Their current state is looked up in a
/// [`Roster`]; only the before and after snapshots are owned copies.
#[derive(Debug, Clone)]
pub struct OutcomeBatch {
    at_gte: Instant,
    at_lt: Instant,
    index: FxHashMap<Arc<str>, usize>,
    entries: Vec<BatchEntry>,
}

impl OutcomeBatch {
    pub fn new(at_gte: Instant, at_lt: Instant) -> OutcomeBatch {
        OutcomeBatch {
            at_gte,
            at_lt,
            index: FxHashMap::default(),
            entries: Vec::new(),
        }
    }

    pub fn at_gte(&self) -> Instant {
        self.at_gte
    }

    pub fn at_lt(&self) -> Instant {
        self.at_lt
    }

    pub fn contains_instant(&self, at: Instant) -> bool {
        self.at_gte <= at && at < self.at_lt
    }

    /// Adds `outcome` to the entry of its subject, if it occurred within this
    /// period. Returns whether it was added.
    pub fn push(&mut self, outcome: &Outcome) -> bool {
        if !self.contains_instant(outcome.occurred_at()) {
            return false;
        }
        let index = self.entry_index(outcome.subject().shared_key());
        self.entries[index].outcomes.push(outcome.clone());
        true
    }

    /// Adds an empty entry for each key that is not yet part of this period.
    pub fn load_context<'a, I>(&mut self, keys: I)
    where
        I: IntoIterator<Item = &'a Arc<str>>,
    {
        for key in keys {
            self.entry_index(key);
        }
    }

    fn entry_index(&mut self, key: &Arc<str>) -> usize {
        let next_index = self.entries.len();
        let index = *self.index.entry(Arc::clone(key)).or_insert(next_index);
        if index == next_index {
            self.entries.push(BatchEntry::new(Arc::clone(key)));
        }
        index
    }

    pub fn snapshot_befores(&mut self, roster: &Roster) {
        for entry in &mut self.entries {
            entry.before = roster.by_key(&entry.key).cloned();
        }
    }

    pub fn snapshot_afters(&mut self, roster: &Roster) {
        for entry in &mut self.entries {
            entry.after = roster.by_key(&entry.key).cloned();
        }
    }

    pub fn get(&self, key: &str) -> Option<&BatchEntry> {
        self.index.get(key).map(|&index| &self.entries[index])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// The live entity for `key`, if it takes part in this period.
    pub fn entity<'r>(&self, roster: &'r Roster, key: &str) -> Option<&'r RatingEntity> {
        self.get(key).and_then(|entry| roster.by_key(&entry.key))
    }

    pub fn before(&self, key: &str) -> Option<&RatingEntity> {
        self.get(key).and_then(BatchEntry::before)
    }

    pub fn after(&self, key: &str) -> Option<&RatingEntity> {
        self.get(key).and_then(BatchEntry::after)
    }

    /// Outcomes in this period where `key` is the subject.
    pub fn outcomes(&self, key: &str) -> &[Outcome] {
        match self.get(key) {
            Some(entry) => entry.outcomes(),
            None => &[],
        }
    }

    /// All outcomes in this period.
    pub fn all_outcomes(&self) -> impl Iterator<Item = &Outcome> {
        self.entries.iter().flat_map(|entry| entry.outcomes.iter())
    }

    /// Entries in the order the entities joined this period.
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(BatchEntry::key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn outcome(at: Instant) -> Outcome {
        RatingEntity::with_key("A")
            .vs(&RatingEntity::with_key("B"), 0.5, at)
            .unwrap()
    }

    #[test]
    fn test_push_ok() {
        let now = Instant::now();
        let mut batch = OutcomeBatch::new(
            Instant(now.0 - Duration::days(1)),
            Instant(now.0 + Duration::days(1)),
        );
        assert!(batch.push(&outcome(now)));
        assert_eq!(batch.all_outcomes().count(), 1);
        assert_eq!(batch.outcomes("A").len(), 1);
        assert_eq!(batch.outcomes("B").len(), 0);
        assert_eq!(batch.len(), 1);
        assert!(batch.contains("A"));
        assert!(!batch.contains("B"));
    }

    #[test]
    fn test_push_out_of_bounds() {
        let now = Instant::now();
        let mut batch = OutcomeBatch::new(
            Instant(now.0 - Duration::days(2)),
            Instant(now.0 - Duration::days(1)),
        );
        assert!(!batch.push(&outcome(now)));
        assert_eq!(batch.all_outcomes().count(), 0);
        assert!(batch.is_empty());

        // The upper bound is exclusive.
        assert!(!batch.push(&outcome(batch.at_lt())));
        assert!(batch.push(&outcome(batch.at_gte())));
    }

    #[test]
    fn test_load_context_and_snapshots() {
        let now = Instant::now();
        let mut roster = Roster::default();
        let a = roster.get_or_insert(&RatingEntity::with_key("A"));
        roster.get_or_insert(&RatingEntity::with_key("B"));

        let mut batch = OutcomeBatch::new(now, Instant(now.0 + Duration::days(1)));
        assert!(batch.push(&outcome(now)));

        let keys: Vec<Arc<str>> = vec!["A".into(), "B".into()];
        batch.load_context(&keys);
        assert_eq!(batch.keys().collect::<Vec<_>>(), ["A", "B"]);
        assert_eq!(batch.outcomes("A").len(), 1);
        assert!(!batch.get("B").unwrap().is_active());
        assert!(batch.before("A").is_none());

        batch.snapshot_befores(&roster);
        roster.get_mut(a).unwrap().update(1.0, 1.0, None);
        batch.snapshot_afters(&roster);

        assert_eq!(batch.before("A").unwrap().mu(), 0.0);
        assert_eq!(batch.after("A").unwrap().mu(), 1.0);
        assert_eq!(batch.entity(&roster, "A").unwrap().mu(), 1.0);
        assert_eq!(batch.after("B").unwrap().mu(), 0.0);
        assert!(batch.entity(&roster, "C").is_none());
    }
}
