use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::RatingEntity;

/// Index of an entity in a [`Roster`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct EntityId(usize);

/// Owning registry holding the one canonical instance of every entity,
/// keyed by [`RatingEntity::key()`].
#[derive(Debug, Default, Clone)]
pub struct Roster {
    ids: FxHashMap<Arc<str>, EntityId>,
    entities: Vec<RatingEntity>,
}

impl Roster {
    /// Registers a copy of `entity` unless an entity with the same key is
    /// already known. The first registration of a key wins.
    pub fn get_or_insert(&mut self, entity: &RatingEntity) -> EntityId {
        let next_id = EntityId(self.entities.len());
        let id = *self
            .ids
            .entry(Arc::clone(entity.shared_key()))
            .or_insert(next_id);
        if id == next_id {
            self.entities.push(entity.clone());
        }
        id
    }

    pub fn id(&self, key: &str) -> Option<EntityId> {
        self.ids.get(key).copied()
    }

    pub fn get(&self, EntityId(id): EntityId) -> Option<&RatingEntity> {
        self.entities.get(id)
    }

    pub fn get_mut(&mut self, EntityId(id): EntityId) -> Option<&mut RatingEntity> {
        self.entities.get_mut(id)
    }

    pub fn by_key(&self, key: &str) -> Option<&RatingEntity> {
        self.id(key).and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in order of registration.
    pub fn iter(&self) -> impl Iterator<Item = &RatingEntity> {
        self.entities.iter()
    }

    pub fn revert_all(&mut self) {
        for entity in &mut self.entities {
            entity.revert_to_initial();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Glicko;

    #[test]
    fn test_first_registration_wins() {
        let mut roster = Roster::default();
        let a = RatingEntity::with_key("A");
        let b = RatingEntity::with_key("B");
        let other_a = RatingEntity::new("A", Glicko { mu: 1.0, phi: 1.0, sigma: 0.05 });

        let id_a = roster.get_or_insert(&a);
        let id_b = roster.get_or_insert(&b);
        assert_ne!(id_a, id_b);
        assert_eq!(roster.get_or_insert(&other_a), id_a);
        assert_eq!(roster.len(), 2);
        assert_eq!(roster.by_key("A"), Some(&a));
        assert_eq!(roster.id("B"), Some(id_b));
        assert_eq!(roster.id("C"), None);
    }

    #[test]
    fn test_revert_all() {
        let mut roster = Roster::default();
        let id = roster.get_or_insert(&RatingEntity::with_key("A"));
        roster.get_mut(id).unwrap().update(1.0, 1.0, Some(0.1));
        assert_eq!(roster.get(id).unwrap().mu(), 1.0);

        roster.revert_all();
        assert_eq!(roster.get(id).unwrap().glicko(), Glicko::default());
    }
}
