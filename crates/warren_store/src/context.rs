//! The context: a persistent snapshot of the object graph.
//!
//! A context packages the entity table and the relationship index behind a
//! single façade. Reads are plain lookups against the snapshot. Mutations
//! come in two tiers: snapshot operations take `&self`, run the entity's
//! hooks against a draft clone, and return the draft as a new context,
//! leaving the receiver untouched; draft primitives take `&mut self` and
//! are what the hooks themselves are written against. Consumers that need
//! serial writes keep a single current context and swap it on publication;
//! readers hold on to whatever snapshot they were given.

use warren_foundation::{EntityId, EntityKey, Error, IdSet, RelationName, Result};

use crate::descriptor::Links;
use crate::entity::{EntityModel, MergeStrategy};
use crate::index::{InverseLink, RelationIndex};
use crate::table::EntityTable;

/// A persistent snapshot of the object graph.
///
/// Cloning is O(1); clones share structure and never observe each other's
/// mutations.
#[derive(Clone, Debug, Default)]
pub struct Context {
    entities: EntityTable,
    relations: RelationIndex,
}

impl Context {
    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Reads ---

    /// Returns a clone of the canonical value stored under the id.
    #[must_use]
    pub fn find<T: EntityModel>(&self, id: &T::Id) -> Option<T> {
        self.entities.find::<T>(id)
    }

    /// Looks up many ids, preserving order, with `None` for misses.
    #[must_use]
    pub fn find_all<T: EntityModel>(&self, ids: &[T::Id]) -> Vec<Option<T>> {
        self.entities.find_all::<T>(ids)
    }

    /// Looks up many ids, dropping misses and preserving order.
    #[must_use]
    pub fn find_all_existing<T: EntityModel>(&self, ids: &[T::Id]) -> Vec<T> {
        self.entities.find_all_existing::<T>(ids)
    }

    /// Returns every stored entity of type `T`, in no particular order.
    #[must_use]
    pub fn all<T: EntityModel>(&self) -> Vec<T> {
        self.entities.all::<T>()
    }

    /// True when an entity of type `T` is stored under the id.
    #[must_use]
    pub fn contains<T: EntityModel>(&self, id: &T::Id) -> bool {
        self.entities.contains::<T>(id)
    }

    /// Total number of stored entities across all types.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of link entries in the relationship index.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.relations.len()
    }

    /// Returns the stored value under the id, or an error naming it.
    ///
    /// # Errors
    /// Returns an entity-missing error when nothing is stored under the id.
    pub fn expect<T: EntityModel>(&self, id: &T::Id) -> Result<T> {
        self.find::<T>(id)
            .ok_or_else(|| Error::entity_missing(T::entity_name(), id.to_string()))
    }

    /// Ordered children of one relation entry, for a typed parent id.
    #[must_use]
    pub fn children<T: EntityModel>(&self, relation: RelationName, id: &T::Id) -> IdSet {
        self.children_of(&EntityKey::new(T::entity_name(), EntityId::of(id)), relation)
    }

    /// Ordered children of one link entry, by raw coordinates.
    #[must_use]
    pub fn children_of(&self, source: &EntityKey, relation: RelationName) -> IdSet {
        self.relations.children(source, relation)
    }

    // --- Snapshot mutations ---

    /// Saves an entity, returning a new context.
    ///
    /// Runs the entity's save hook against a draft: the hook inserts the
    /// normalized value, saves any resolved related entities, and registers
    /// the relation links. The receiver is never modified; on error the
    /// draft is discarded.
    ///
    /// # Errors
    /// Propagates errors from the save hooks involved.
    pub fn save<T: EntityModel>(&self, entity: &T) -> Result<Context> {
        let mut draft = self.clone();
        entity.save(&mut draft)?;
        Ok(draft)
    }

    /// Saves many entities into one new context.
    ///
    /// # Errors
    /// Propagates the first hook error; the receiver is never modified.
    pub fn save_all<T: EntityModel>(&self, entities: &[T]) -> Result<Context> {
        let mut draft = self.clone();
        for entity in entities {
            entity.save(&mut draft)?;
        }
        Ok(draft)
    }

    /// Removes an entity, returning a new context and the prior value.
    ///
    /// Runs the type's delete hook against a draft. The default hook
    /// detaches the entity's links and drops the stored value; owning types
    /// override it to delete their children as well. Removing an absent id
    /// is a no-op that returns `None`.
    ///
    /// # Errors
    /// Propagates errors from the delete hooks involved.
    pub fn remove<T: EntityModel>(&self, id: &T::Id) -> Result<(Context, Option<T>)> {
        let prior = self.find::<T>(id);
        let mut draft = self.clone();
        T::delete(&mut draft, id)?;
        Ok((draft, prior))
    }

    /// Removes many entities, returning a new context and the prior values
    /// in call order.
    ///
    /// Deletes run sequentially against the draft, so an entity already
    /// removed by an earlier cascade reports `None`.
    ///
    /// # Errors
    /// Propagates the first hook error; the receiver is never modified.
    pub fn remove_all<T: EntityModel>(&self, ids: &[T::Id]) -> Result<(Context, Vec<Option<T>>)> {
        let mut draft = self.clone();
        let mut priors = Vec::with_capacity(ids.len());
        for id in ids {
            priors.push(draft.find::<T>(id));
            T::delete(&mut draft, id)?;
        }
        Ok((draft, priors))
    }

    /// Registers a batch of links, returning a new context.
    ///
    /// Links are independent of entity payloads: ids with no stored value
    /// may be linked, and readers treat them as soft faults.
    #[must_use]
    pub fn link<P: EntityModel, C: EntityModel>(&self, links: Links<P, C>) -> Context {
        let mut draft = self.clone();
        draft.save_links(links);
        draft
    }

    /// Removes a batch of links, returning a new context.
    ///
    /// Mutual entries lose both sides; ids absent from the entry are
    /// ignored.
    #[must_use]
    pub fn unlink<P: EntityModel, C: EntityModel>(&self, links: Links<P, C>) -> Context {
        let mut draft = self.clone();
        draft.detach_links(links);
        draft
    }

    // --- Draft primitives ---

    /// Inserts a normalized copy of the entity, using the type's merge
    /// strategy on collision.
    pub fn insert<T: EntityModel>(&mut self, entity: &T) {
        self.entities.save(entity, &T::merge_strategy());
    }

    /// Inserts a normalized copy of the entity with an explicit merge
    /// strategy.
    pub fn insert_with<T: EntityModel>(&mut self, entity: &T, strategy: &MergeStrategy<T>) {
        self.entities.save(entity, strategy);
    }

    /// Writes a batch of links into the relationship index.
    ///
    /// Mutual batches also insert the parent id into each child's
    /// counterpart entry, honoring the counterpart's cardinality.
    pub fn save_links<P: EntityModel, C: EntityModel>(&mut self, links: Links<P, C>) {
        let source = EntityKey::new(P::entity_name(), EntityId::of(&links.parent));
        let children: IdSet = links.children.iter().map(|id| EntityId::of(id)).collect();
        let inverse = links.inverse.map(|inverse| InverseLink {
            entity: C::entity_name(),
            relation: inverse.name,
            mode: inverse.link_mode(),
        });
        self.relations
            .save(&source, links.relation, &children, links.mode, inverse);
    }

    /// Removes a batch of links from the relationship index.
    pub fn detach_links<P: EntityModel, C: EntityModel>(&mut self, links: Links<P, C>) {
        let source = EntityKey::new(P::entity_name(), EntityId::of(&links.parent));
        let children: IdSet = links.children.iter().map(|id| EntityId::of(id)).collect();
        self.relations.detach(&source, links.relation, &children);
    }

    /// Removes an entity from the table and clears its link entries.
    ///
    /// Mutual entries referencing the entity lose the reference on both
    /// sides; one-way references held by other entities stay behind as soft
    /// faults. Returns the prior stored value.
    pub fn remove_entity<T: EntityModel>(&mut self, id: &T::Id) -> Option<T> {
        let prior = self.entities.remove::<T>(id);
        let key = EntityKey::new(T::entity_name(), EntityId::of(id));
        self.relations.clear_source(&key);
        prior
    }
}
