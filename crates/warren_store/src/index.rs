//! The relationship index.
//!
//! Link entries are keyed by source coordinates (entity name, id) and
//! relation name; each entry holds an insertion-ordered, duplicate-free set
//! of child ids. Mutual relations tag their entries with the counterpart
//! coordinates, so every later write or removal can repair the other side
//! of the link without consulting descriptors.
//!
//! The index never looks at entity payloads. Ids with no stored value may
//! be linked freely; readers treat them as soft faults.

use warren_foundation::{EntityId, EntityKey, EntityName, IdSet, RelationName};

use crate::descriptor::LinkMode;

/// Coordinates of the counterpart side of a mutual link entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Counterpart {
    /// Type name of the entities on the other side.
    pub entity: EntityName,
    /// Name of the counterpart relation field.
    pub relation: RelationName,
}

/// A lowered write instruction for the inverse side of a mutual relation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InverseLink {
    /// Type name of the child entities.
    pub entity: EntityName,
    /// Name of the counterpart field on the children.
    pub relation: RelationName,
    /// How source ids combine into the children's entries.
    pub mode: LinkMode,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Entry {
    children: IdSet,
    counterpart: Option<Counterpart>,
}

/// The relationship index.
///
/// Empty entries are pruned as they drain, so `len` counts live entries
/// only, and a missing entry always reads as an empty child set.
#[derive(Clone, Debug, Default)]
pub struct RelationIndex {
    entries: im::HashMap<EntityKey, im::HashMap<RelationName, Entry>>,
}

impl RelationIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of link entries across all sources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(im::HashMap::len).sum()
    }

    /// True when the index holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the ordered children of one link entry.
    ///
    /// A missing entry reads as empty.
    #[must_use]
    pub fn children(&self, source: &EntityKey, relation: RelationName) -> IdSet {
        self.entries
            .get(source)
            .and_then(|relations| relations.get(&relation))
            .map(|entry| entry.children.clone())
            .unwrap_or_default()
    }

    /// True when the entry contains the child id.
    #[must_use]
    pub fn contains(&self, source: &EntityKey, relation: RelationName, child: &EntityId) -> bool {
        self.entries
            .get(source)
            .and_then(|relations| relations.get(&relation))
            .is_some_and(|entry| entry.children.contains(child))
    }

    /// Relation names that currently have an entry for the source.
    #[must_use]
    pub fn relations_of(&self, source: &EntityKey) -> Vec<RelationName> {
        self.entries
            .get(source)
            .map(|relations| relations.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Writes a batch of links for one source entry.
    ///
    /// `Replace` makes the children the entry's full list and withdraws the
    /// source from the counterpart entries of any child that dropped out;
    /// `Append` unions after the existing children. When `inverse` is given,
    /// the source id is also inserted into each child's counterpart entry.
    /// A to-one counterpart replaces its content, and any parent it
    /// displaces loses the child from its own forward entry, keeping both
    /// sides of every link in step.
    pub fn save(
        &mut self,
        source: &EntityKey,
        relation: RelationName,
        children: &IdSet,
        mode: LinkMode,
        inverse: Option<InverseLink>,
    ) {
        let current = self.children(source, relation);
        let merged = match mode {
            LinkMode::Replace => children.clone(),
            LinkMode::Append => current.union(children),
        };

        if let Some(inverse) = inverse {
            if mode == LinkMode::Replace {
                let displaced = current.difference(&merged);
                for child_id in displaced.iter() {
                    let child = EntityKey::new(inverse.entity, child_id.clone());
                    self.withdraw(&child, inverse.relation, &source.id);
                }
            }
            for child_id in children.iter() {
                self.attach_inverse(source, relation, child_id, inverse);
            }
        }

        let counterpart = inverse.map(|inverse| Counterpart {
            entity: inverse.entity,
            relation: inverse.relation,
        });
        self.write(source.clone(), relation, merged, counterpart);
    }

    /// Removes specific children from one entry.
    ///
    /// When the entry is tagged mutual, the source is withdrawn from each
    /// removed child's counterpart entry too. Ids absent from the entry are
    /// ignored.
    pub fn detach(&mut self, source: &EntityKey, relation: RelationName, children: &IdSet) {
        let tag = self.counterpart_of(source, relation);
        for child_id in children.iter() {
            self.withdraw(source, relation, child_id);
            if let Some(tag) = tag {
                let child = EntityKey::new(tag.entity, child_id.clone());
                self.withdraw(&child, tag.relation, &source.id);
            }
        }
    }

    /// Removes every entry sourced at the entity.
    ///
    /// Mutual entries also withdraw the source id from each child's
    /// counterpart entry, so the other side never keeps a reference to the
    /// removed entity. Forward entries of other sources that reference the
    /// entity through one-way relations are left alone; readers skip those
    /// ids as soft faults.
    pub fn clear_source(&mut self, source: &EntityKey) {
        let Some(relations) = self.entries.remove(source) else {
            return;
        };
        for (_, entry) in relations {
            let Some(tag) = entry.counterpart else {
                continue;
            };
            for child_id in entry.children.iter() {
                let child = EntityKey::new(tag.entity, child_id.clone());
                self.withdraw(&child, tag.relation, &source.id);
            }
        }
    }

    fn counterpart_of(&self, source: &EntityKey, relation: RelationName) -> Option<Counterpart> {
        self.entries
            .get(source)
            .and_then(|relations| relations.get(&relation))
            .and_then(|entry| entry.counterpart)
    }

    // Inserts the source id into one child's counterpart entry. A to-one
    // counterpart ends up holding exactly the source; parents it displaces
    // lose the child from their own forward entries.
    fn attach_inverse(
        &mut self,
        source: &EntityKey,
        relation: RelationName,
        child_id: &EntityId,
        inverse: InverseLink,
    ) {
        let child = EntityKey::new(inverse.entity, child_id.clone());
        let back = Counterpart {
            entity: source.name,
            relation,
        };
        match inverse.mode {
            LinkMode::Replace => {
                let prior = self.children(&child, inverse.relation);
                let prior_tag = self.counterpart_of(&child, inverse.relation);
                for parent_id in prior.iter() {
                    if parent_id == &source.id {
                        continue;
                    }
                    if let Some(tag) = prior_tag {
                        let parent = EntityKey::new(tag.entity, parent_id.clone());
                        self.withdraw(&parent, tag.relation, child_id);
                    }
                }
                let children = IdSet::new().insert(source.id.clone());
                self.write(child, inverse.relation, children, Some(back));
            }
            LinkMode::Append => {
                let children = self
                    .children(&child, inverse.relation)
                    .insert(source.id.clone());
                self.write(child, inverse.relation, children, Some(back));
            }
        }
    }

    // Removes one child id from one entry, pruning entries and sources
    // that drain empty.
    fn withdraw(&mut self, source: &EntityKey, relation: RelationName, child: &EntityId) {
        let Some(relations) = self.entries.get(source) else {
            return;
        };
        let Some(entry) = relations.get(&relation) else {
            return;
        };
        if !entry.children.contains(child) {
            return;
        }
        let next = Entry {
            children: entry.children.remove(child),
            counterpart: entry.counterpart,
        };
        let mut relations = relations.clone();
        if next.children.is_empty() {
            relations.remove(&relation);
        } else {
            relations.insert(relation, next);
        }
        if relations.is_empty() {
            self.entries.remove(source);
        } else {
            self.entries.insert(source.clone(), relations);
        }
    }

    fn write(
        &mut self,
        source: EntityKey,
        relation: RelationName,
        children: IdSet,
        counterpart: Option<Counterpart>,
    ) {
        let mut relations = self.entries.get(&source).cloned().unwrap_or_default();
        if children.is_empty() {
            relations.remove(&relation);
        } else {
            relations.insert(
                relation,
                Entry {
                    children,
                    counterpart,
                },
            );
        }
        if relations.is_empty() {
            self.entries.remove(&source);
        } else {
            self.entries.insert(source, relations);
        }
    }
}
