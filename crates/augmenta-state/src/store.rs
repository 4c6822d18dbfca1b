//! Live object tables
//!
//! Per id: Absent -> (enter) -> Present -> (update)* -> Present -> (leave) -> Absent.
//! Enter and update share one upsert; a repeated enter is a valid upsert.
//! Absence of a key means the object is not present, never "unknown".

use std::collections::HashMap;

use augmenta_core::{AuxData, Entity, ObjectId};

/// Record stored in a [`LiveTable`]
pub trait Keyed: Copy + Default {
    fn key(&self) -> ObjectId;
    fn set_key(&mut self, id: ObjectId);
}

impl Keyed for Entity {
    fn key(&self) -> ObjectId {
        self.pid
    }

    fn set_key(&mut self, id: ObjectId) {
        self.pid = id;
    }
}

impl Keyed for AuxData {
    fn key(&self) -> ObjectId {
        self.pid
    }

    fn set_key(&mut self, id: ObjectId) {
        self.pid = id;
    }
}

/// Result of an upsert
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Upserted<T> {
    /// Stored record after the upsert
    pub record: T,
    /// Whether the id was absent before
    pub created: bool,
}

/// Keyed table of present records, at most one per id
#[derive(Debug, Clone)]
pub struct LiveTable<T> {
    entries: HashMap<ObjectId, T>,
}

/// Primary object table
pub type EntityStore = LiveTable<Entity>;

/// Auxiliary data table, independent of [`EntityStore`]
pub type AuxDataStore = LiveTable<AuxData>;

impl<T> Default for LiveTable<T> {
    fn default() -> Self {
        LiveTable {
            entries: HashMap::new(),
        }
    }
}

impl<T: Keyed> LiveTable<T> {
    pub fn new() -> Self {
        LiveTable::default()
    }

    /// Fetch or create the record for `id`, let `apply` mutate it, write
    /// the id, and store it
    pub fn upsert<F>(&mut self, id: ObjectId, apply: F) -> Upserted<T>
    where
        F: FnOnce(&mut T),
    {
        let existing = self.entries.get(&id).copied();
        let created = existing.is_none();

        let mut record = existing.unwrap_or_default();
        apply(&mut record);
        record.set_key(id);

        self.entries.insert(id, record);
        Upserted { record, created }
    }

    /// Remove `id`, returning its last record. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: ObjectId) -> Option<T> {
        self.entries.remove(&id)
    }

    /// Copy of the record for `id`
    pub fn get(&self, id: ObjectId) -> Option<T> {
        self.entries.get(&id).copied()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies of all present records, unordered
    pub fn snapshot(&self) -> Vec<T> {
        self.entries.values().copied().collect()
    }

    /// Present ids, sorted
    pub fn ids(&self) -> Vec<ObjectId> {
        let mut ids: Vec<ObjectId> = self.entries.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl LiveTable<Entity> {
    /// Present object with the lowest age, `None` when empty
    pub fn newest(&self) -> Option<Entity> {
        self.entries
            .values()
            .min_by(|a, b| a.age.total_cmp(&b.age))
            .copied()
    }

    /// Present object with the highest age, `None` when empty
    pub fn oldest(&self) -> Option<Entity> {
        self.entries
            .values()
            .max_by(|a, b| a.age.total_cmp(&b.age))
            .copied()
    }

    /// Newest object, or a default record with `age == f32::MAX` when empty
    #[deprecated(note = "the sentinel is ambiguous; use `newest`")]
    pub fn newest_or_sentinel(&self) -> Entity {
        let sentinel = Entity {
            age: f32::MAX,
            ..Default::default()
        };
        self.entries
            .values()
            .fold(sentinel, |best, e| if e.age < best.age { *e } else { best })
    }

    /// Oldest object, or a default record when empty. Objects whose age is
    /// not above the default are never selected.
    #[deprecated(note = "the default record is indistinguishable from a real object; use `oldest`")]
    pub fn oldest_or_default(&self) -> Entity {
        self.entries
            .values()
            .fold(Entity::default(), |best, e| if e.age > best.age { *e } else { best })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn enter(store: &mut EntityStore, pid: i32, age: f32) -> Upserted<Entity> {
        store.upsert(ObjectId::new(pid), |e| e.age = age)
    }

    #[test]
    fn test_upsert_creates_then_updates() {
        let mut store = EntityStore::new();

        let first = enter(&mut store, 5, 0.1);
        assert!(first.created);
        assert_eq!(first.record.pid, ObjectId::new(5));

        let second = store.upsert(ObjectId::new(5), |e| e.oid = 3);
        assert!(!second.created);
        assert_eq!(second.record.age, 0.1);
        assert_eq!(second.record.oid, 3);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_upsert_writes_id_after_apply() {
        let mut store = AuxDataStore::new();
        let upserted = store.upsert(ObjectId::new(9), |a| a.pid = ObjectId::new(1));
        assert_eq!(upserted.record.pid, ObjectId::new(9));
        assert!(store.contains(ObjectId::new(9)));
        assert!(!store.contains(ObjectId::new(1)));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut store = EntityStore::new();
        assert!(store.remove(ObjectId::new(7)).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut store = EntityStore::new();
        enter(&mut store, 1, 2.0);

        let mut snapshot = store.snapshot();
        snapshot[0].age = 99.0;

        assert_eq!(store.get(ObjectId::new(1)).unwrap().age, 2.0);
    }

    #[test]
    fn test_newest_and_oldest() {
        let mut store = EntityStore::new();
        assert!(store.newest().is_none());
        assert!(store.oldest().is_none());

        enter(&mut store, 1, 3.0);
        enter(&mut store, 2, 0.5);
        enter(&mut store, 3, 7.25);

        assert_eq!(store.newest().unwrap().pid, ObjectId::new(2));
        assert_eq!(store.oldest().unwrap().pid, ObjectId::new(3));
        assert_eq!(store.ids(), vec![ObjectId::new(1), ObjectId::new(2), ObjectId::new(3)]);
    }

    #[test]
    #[allow(deprecated)]
    fn test_legacy_sentinels() {
        let mut store = EntityStore::new();
        assert_eq!(store.newest_or_sentinel().age, f32::MAX);
        assert_eq!(store.oldest_or_default(), Entity::default());

        enter(&mut store, 4, 1.5);
        enter(&mut store, 6, 0.0);
        assert_eq!(store.newest_or_sentinel().pid, ObjectId::new(6));
        assert_eq!(store.oldest_or_default().pid, ObjectId::new(4));
    }

    proptest! {
        #[test]
        fn prop_newest_oldest_are_extremes(
            ages in proptest::collection::hash_map(0i32..64, 0.0f32..1000.0, 1..32)
        ) {
            let mut store = EntityStore::new();
            for (&pid, &age) in &ages {
                enter(&mut store, pid, age);
            }

            let min = ages.values().copied().fold(f32::INFINITY, f32::min);
            let max = ages.values().copied().fold(f32::NEG_INFINITY, f32::max);

            prop_assert_eq!(store.newest().unwrap().age, min);
            prop_assert_eq!(store.oldest().unwrap().age, max);
        }

        #[test]
        fn prop_remove_always_clears_id(
            present in proptest::collection::vec(0i32..16, 0..16),
            leaving in 0i32..16,
        ) {
            let mut store = EntityStore::new();
            for pid in present {
                enter(&mut store, pid, 1.0);
            }

            store.remove(ObjectId::new(leaving));
            prop_assert!(!store.contains(ObjectId::new(leaving)));
            prop_assert!(store.snapshot().iter().all(|e| e.pid != ObjectId::new(leaving)));
        }
    }
}
