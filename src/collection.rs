use std::{mem, sync::Arc};

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::{Error, Instant, Outcome, OutcomeBatch, Step};

/// Every outcome ever recorded, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct OutcomeCollection {
    outcomes: Vec<Outcome>,
    min_occurred_at: Option<Instant>,
}

impl OutcomeCollection {
    pub fn new() -> OutcomeCollection {
        OutcomeCollection::default()
    }

    pub fn push(&mut self, outcome: Outcome) {
        let at = outcome.occurred_at();
        if self.min_occurred_at.map_or(true, |min| at < min) {
            self.min_occurred_at = Some(at);
        }
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn min_occurred_at(&self) -> Option<Instant> {
        self.min_occurred_at
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Partitions all outcomes into consecutive rating periods of
    /// `step_size` steps each, in ascending order.
    ///
    /// The first period starts at `anchor`, or at the start of the step
    /// containing the earliest outcome. The last period is the one containing
    /// the latest outcome. Periods in between are never skipped, even if
    /// nothing happened in them, and every entity that was the subject of an
    /// earlier outcome is carried into each later period.
    ///
    /// Returns an empty list if there are neither outcomes nor an anchor.
    pub fn make_batches(
        &self,
        step_size: u32,
        step: Step,
        anchor: Option<Instant>,
    ) -> Result<Vec<OutcomeBatch>, Error> {
        if step_size == 0 {
            return Err(Error::invalid_argument("step size must be positive"));
        }

        let Some(anchor) = anchor.or_else(|| self.min_occurred_at.map(|min| min.start_of(step)))
        else {
            return Ok(Vec::new());
        };

        if let Some(min) = self.min_occurred_at {
            if min < anchor {
                return Err(Error::invalid_argument(format!(
                    "anchor {anchor} is later than the earliest outcome at {min}"
                )));
            }
        }

        let period_after = |at_gte: Instant| {
            at_gte.checked_add(step_size, step).ok_or_else(|| {
                Error::invalid_argument(format!("{at_gte} plus {step_size} {step} is out of range"))
            })
        };

        let mut replay: Vec<&Outcome> = self.outcomes.iter().collect();
        replay.sort_by_key(|outcome| outcome.occurred_at());

        let mut seen: FxHashSet<Arc<str>> = FxHashSet::default();
        let mut context: Vec<Arc<str>> = Vec::new();

        let mut batches = Vec::new();
        let mut current = OutcomeBatch::new(anchor, period_after(anchor)?);

        for outcome in replay {
            // The subject is seen before advancing, so it is also part of any
            // gap periods leading up to its outcome.
            let key = outcome.subject().shared_key();
            if seen.insert(Arc::clone(key)) {
                context.push(Arc::clone(key));
            }

            while !current.push(outcome) {
                let at_gte = current.at_lt();
                let mut next = OutcomeBatch::new(at_gte, period_after(at_gte)?);
                next.load_context(&context);
                batches.push(mem::replace(&mut current, next));
            }
        }

        batches.push(current);

        trace!(
            outcomes = self.outcomes.len(),
            batches = batches.len(),
            %step,
            step_size,
            "built rating periods"
        );

        Ok(batches)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDateTime, TimeZone as _, Utc};
    use proptest::prelude::*;

    use super::*;
    use crate::RatingEntity;

    fn at(s: &str) -> Instant {
        Instant(
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .unwrap()
                .and_utc(),
        )
    }

    fn outcome(subject: &str, occurred_at: Instant) -> Outcome {
        RatingEntity::with_key(subject)
            .vs(&RatingEntity::with_key("opponent"), 0.5, occurred_at)
            .unwrap()
    }

    fn sample() -> OutcomeCollection {
        let mut collection = OutcomeCollection::new();
        for (subject, occurred_at) in [
            ("a", "2000-01-01 01:23:45"),
            ("b", "2000-01-03 02:34:27"),
            ("c", "2000-01-07 03:45:41"),
            ("d", "2000-01-11 17:31:22"),
            ("e", "2000-01-11 19:29:51"),
            ("f", "2000-02-01 23:59:59"),
        ] {
            collection.push(outcome(subject, at(occurred_at)));
        }
        collection
    }

    #[test]
    fn test_make_batches_by_day() {
        let batches = sample().make_batches(1, Step::Day, None).unwrap();
        assert_eq!(batches.len(), 32);
        assert_eq!(batches[0].at_gte(), at("2000-01-01 00:00:00"));
        assert_eq!(batches[0].len(), 1);
        assert_eq!(batches[2].len(), 2);
        assert_eq!(batches[6].len(), 3);
        assert_eq!(batches[10].len(), 5);
        assert_eq!(batches[31].len(), 6);
    }

    #[test]
    fn test_make_batches_by_week() {
        let batches = sample().make_batches(1, Step::Week, None).unwrap();
        assert_eq!(batches.len(), 6);
        assert_eq!(batches[0].at_gte(), at("1999-12-27 00:00:00"));
        assert_eq!(batches[0].len(), 1);
        assert_eq!(batches[1].len(), 3);
        assert_eq!(batches[2].len(), 5);
        assert_eq!(batches[5].len(), 6);
    }

    #[test]
    fn test_make_batches_by_month() {
        let batches = sample().make_batches(1, Step::Month, None).unwrap();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].len(), 5);
        assert_eq!(batches[1].len(), 6);
        assert_eq!(batches[1].at_lt(), at("2000-03-01 00:00:00"));
    }

    #[test]
    fn test_make_batches_with_step_size() {
        let batches = sample().make_batches(10, Step::Day, None).unwrap();
        assert_eq!(batches.len(), 4);
        assert_eq!(batches[1].at_gte(), at("2000-01-11 00:00:00"));
        assert_eq!(batches[1].outcomes("d").len(), 1);
        assert_eq!(batches[1].outcomes("e").len(), 1);
    }

    #[test]
    fn test_out_of_order_insertion() {
        let mut collection = OutcomeCollection::new();
        collection.push(outcome("late", at("2000-01-05 12:00:00")));
        collection.push(outcome("early", at("2000-01-01 12:00:00")));
        assert_eq!(collection.min_occurred_at(), Some(at("2000-01-01 12:00:00")));

        let batches = collection.make_batches(1, Step::Day, None).unwrap();
        assert_eq!(batches.len(), 5);
        assert_eq!(batches[0].keys().collect::<Vec<_>>(), ["early"]);
        assert_eq!(batches[1].keys().collect::<Vec<_>>(), ["early", "late"]);
        assert!(batches[3].outcomes("late").is_empty());
        assert_eq!(batches[4].keys().collect::<Vec<_>>(), ["early", "late"]);
        assert_eq!(batches[4].outcomes("late").len(), 1);
    }

    #[test]
    fn test_gap_periods_include_later_subjects() {
        let mut collection = OutcomeCollection::new();
        collection.push(outcome("a", at("2000-01-01 10:00:00")));
        collection.push(outcome("b", at("2000-01-03 10:00:00")));

        let batches = collection.make_batches(1, Step::Day, None).unwrap();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].keys().collect::<Vec<_>>(), ["a"]);
        assert_eq!(batches[1].keys().collect::<Vec<_>>(), ["a", "b"]);
        assert!(!batches[1].get("b").unwrap().is_active());
        assert!(batches[2].get("b").unwrap().is_active());
    }

    #[test]
    fn test_empty() {
        let collection = OutcomeCollection::new();
        assert!(collection.make_batches(1, Step::Week, None).unwrap().is_empty());

        let anchor = at("2000-01-01 00:00:00");
        let batches = collection.make_batches(1, Step::Week, Some(anchor)).unwrap();
        assert_eq!(batches.len(), 1);
        assert!(batches[0].is_empty());
        assert_eq!(batches[0].at_lt(), at("2000-01-08 00:00:00"));
    }

    #[test]
    fn test_invalid_arguments() {
        let collection = sample();
        assert!(matches!(
            collection.make_batches(0, Step::Day, None),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            collection.make_batches(1, Step::Day, Some(at("2000-01-02 00:00:00"))),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_explicit_anchor() {
        let batches = sample()
            .make_batches(1, Step::Week, Some(at("1999-12-31 12:00:00")))
            .unwrap();
        assert_eq!(batches[0].at_gte(), at("1999-12-31 12:00:00"));
        assert_eq!(batches[0].at_lt(), at("2000-01-07 12:00:00"));
        assert_eq!(batches[0].keys().collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    fn history() -> impl Strategy<Value = Vec<(u8, i64)>> {
        prop::collection::vec((0u8..6, 0i64..(90 * 24 * 3600)), 1..40)
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![Just(Step::Day), Just(Step::Week), Just(Step::Month)]
    }

    fn collect(history: &[(u8, i64)]) -> OutcomeCollection {
        let origin = Utc.with_ymd_and_hms(2020, 1, 15, 0, 0, 0).unwrap();
        let mut collection = OutcomeCollection::new();
        for &(subject, seconds) in history {
            let occurred_at = Instant(origin + chrono::Duration::seconds(seconds));
            collection.push(outcome(&subject.to_string(), occurred_at));
        }
        collection
    }

    proptest! {
        #[test]
        fn every_outcome_in_exactly_one_batch(
            history in history(),
            step in step(),
            step_size in 1u32..4,
        ) {
            let collection = collect(&history);
            let batches = collection.make_batches(step_size, step, None).unwrap();

            let total: usize = batches.iter().map(|batch| batch.all_outcomes().count()).sum();
            prop_assert_eq!(total, collection.len());
            for batch in &batches {
                for outcome in batch.all_outcomes() {
                    prop_assert!(batch.contains_instant(outcome.occurred_at()));
                }
            }
        }

        #[test]
        fn batches_are_contiguous(history in history(), step in step(), step_size in 1u32..4) {
            let batches = collect(&history).make_batches(step_size, step, None).unwrap();
            for pair in batches.windows(2) {
                prop_assert_eq!(pair[0].at_lt(), pair[1].at_gte());
            }
        }

        #[test]
        fn entities_never_leave(history in history(), step in step(), step_size in 1u32..4) {
            let batches = collect(&history).make_batches(step_size, step, None).unwrap();
            for pair in batches.windows(2) {
                for key in pair[0].keys() {
                    prop_assert!(pair[1].contains(key));
                }
            }
        }
    }
}
