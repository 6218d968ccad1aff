//! Insertion-ordered, duplicate-free id sets.
//!
//! The relationship index stores the children of every link entry in an
//! [`IdSet`]: membership checks are O(1) via a persistent hash set, while a
//! persistent vector preserves the order in which ids were first inserted.
//! All update operations return a new set and share structure with the
//! original, so cloning and snapshotting stay cheap.

use std::fmt;
use std::hash::{Hash, Hasher};

use crate::id::EntityId;

/// An ordered set of entity ids.
///
/// Ids keep their first-insertion order; inserting an id that is already a
/// member leaves the set unchanged. Equality and hashing are order-sensitive.
#[derive(Clone, Default)]
pub struct IdSet {
    order: im::Vector<EntityId>,
    seen: im::HashSet<EntityId>,
}

impl IdSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of ids in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns true if the id is a member.
    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.seen.contains(id)
    }

    /// Returns the id at the given position in insertion order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&EntityId> {
        self.order.get(index)
    }

    /// Returns the first id in insertion order.
    #[must_use]
    pub fn first(&self) -> Option<&EntityId> {
        self.order.front()
    }

    /// Returns a new set with the id appended.
    ///
    /// If the id is already a member the set is returned unchanged and the
    /// id keeps its original position.
    #[must_use]
    pub fn insert(&self, id: EntityId) -> Self {
        if self.seen.contains(&id) {
            return self.clone();
        }
        let mut order = self.order.clone();
        let mut seen = self.seen.clone();
        order.push_back(id.clone());
        seen.insert(id);
        Self { order, seen }
    }

    /// Returns a new set with the id removed.
    ///
    /// Removing a non-member returns the set unchanged.
    #[must_use]
    pub fn remove(&self, id: &EntityId) -> Self {
        if !self.seen.contains(id) {
            return self.clone();
        }
        let mut order = self.order.clone();
        let mut seen = self.seen.clone();
        if let Some(index) = order.iter().position(|member| member == id) {
            order.remove(index);
        }
        seen.remove(id);
        Self { order, seen }
    }

    /// Returns the union of two sets.
    ///
    /// Members of `self` keep their positions; ids only present in `other`
    /// are appended in `other`'s order.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for id in other.iter() {
            merged = merged.insert(id.clone());
        }
        merged
    }

    /// Returns the difference of two sets, preserving `self`'s order.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        self.iter()
            .filter(|id| !other.contains(id))
            .cloned()
            .collect()
    }

    /// Iterates over the ids in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &EntityId> {
        self.order.iter()
    }

    /// Collects the ids into a vector in insertion order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<EntityId> {
        self.order.iter().cloned().collect()
    }
}

impl fmt::Debug for IdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.order.iter()).finish()
    }
}

impl PartialEq for IdSet {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
    }
}

impl Eq for IdSet {}

impl Hash for IdSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for id in &self.order {
            id.hash(state);
        }
    }
}

impl FromIterator<EntityId> for IdSet {
    fn from_iter<I: IntoIterator<Item = EntityId>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set = set.insert(id);
        }
        set
    }
}

impl<'a> IntoIterator for &'a IdSet {
    type Item = &'a EntityId;
    type IntoIter = im::vector::Iter<'a, EntityId>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.iter()
    }
}

impl IntoIterator for IdSet {
    type Item = EntityId;
    type IntoIter = im::vector::ConsumingIter<EntityId>;

    fn into_iter(self) -> Self::IntoIter {
        self.order.into_iter()
    }
}

#[cfg(feature = "serde")]
mod serde_support {
    use super::IdSet;
    use crate::id::EntityId;
    use serde::de::{Deserialize, Deserializer};
    use serde::ser::{Serialize, SerializeSeq, Serializer};

    impl Serialize for IdSet {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(self.len()))?;
            for id in self.iter() {
                seq.serialize_element(id)?;
            }
            seq.end()
        }
    }

    impl<'de> Deserialize<'de> for IdSet {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let ids = Vec::<EntityId>::deserialize(deserializer)?;
            Ok(ids.into_iter().collect())
        }
    }
}
