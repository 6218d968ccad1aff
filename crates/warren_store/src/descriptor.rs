//! Relation-field descriptors.
//!
//! Entity types declare each relation field as an associated constant: a
//! stable name, a pair of accessor function pointers, and an optional
//! inverse. Descriptors are the only bridge between field values and the
//! relationship index: the save path walks them to project fields into link
//! batches, and the query layer walks them to write hydrated values back.

use std::fmt;

use warren_foundation::{RelationName, Result};

use crate::context::Context;
use crate::entity::EntityModel;
use crate::relation::{ToMany, ToOne};

/// How a batch of links combines with the links already in the index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LinkMode {
    /// The batch becomes the entry's full child list.
    Replace,
    /// The batch unions into the entry, after the existing children.
    Append,
}

/// Cardinality of a relation field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// The field references at most one entity.
    ToOne,
    /// The field references an ordered set of entities.
    ToMany,
}

/// The inverse side of a mutual relation.
///
/// Declaring an inverse on a descriptor makes every save of the field also
/// maintain the counterpart entries on the target type, and every removal
/// withdraw from them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Inverse {
    /// Name of the counterpart field on the target type.
    pub name: RelationName,
    /// Cardinality of the counterpart field.
    pub cardinality: Cardinality,
}

impl Inverse {
    /// Declares a to-one counterpart field.
    #[must_use]
    pub const fn to_one(name: &'static str) -> Self {
        Self {
            name: RelationName::new(name),
            cardinality: Cardinality::ToOne,
        }
    }

    /// Declares a to-many counterpart field.
    #[must_use]
    pub const fn to_many(name: &'static str) -> Self {
        Self {
            name: RelationName::new(name),
            cardinality: Cardinality::ToMany,
        }
    }

    // A to-one counterpart holds at most one parent, so inserting into it
    // replaces; a to-many counterpart accumulates.
    pub(crate) fn link_mode(self) -> LinkMode {
        match self.cardinality {
            Cardinality::ToOne => LinkMode::Replace,
            Cardinality::ToMany => LinkMode::Append,
        }
    }
}

/// A batch of links from one parent entity through one relation field.
///
/// Batches are what descriptors project field values into, and what the
/// [`Context`] link operations consume. They can also be built directly to
/// manage links without touching entity payloads.
#[derive(Clone)]
pub struct Links<P: EntityModel, C: EntityModel> {
    /// Id of the parent entity.
    pub parent: P::Id,
    /// Name of the relation field on the parent type.
    pub relation: RelationName,
    /// Ids of the children, in order.
    pub children: Vec<C::Id>,
    /// How the batch combines with links already in the index.
    pub mode: LinkMode,
    /// Inverse side, when the relation is mutual.
    pub inverse: Option<Inverse>,
}

impl<P: EntityModel, C: EntityModel> Links<P, C> {
    /// Creates a batch that replaces the parent's existing links.
    #[must_use]
    pub fn replacing(parent: P::Id, relation: RelationName, children: Vec<C::Id>) -> Self {
        Self {
            parent,
            relation,
            children,
            mode: LinkMode::Replace,
            inverse: None,
        }
    }

    /// Creates a batch that appends to the parent's existing links.
    #[must_use]
    pub fn appending(parent: P::Id, relation: RelationName, children: Vec<C::Id>) -> Self {
        Self {
            parent,
            relation,
            children,
            mode: LinkMode::Append,
            inverse: None,
        }
    }

    /// Declares the relation mutual, maintaining the given counterpart.
    #[must_use]
    pub fn with_inverse(mut self, inverse: Inverse) -> Self {
        self.inverse = Some(inverse);
        self
    }
}

impl<P: EntityModel, C: EntityModel> fmt::Debug for Links<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Links({}/{}.{} -> [", P::entity_name(), self.parent, self.relation)?;
        for (index, child) in self.children.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{child}")?;
        }
        write!(f, "], {:?})", self.mode)
    }
}

/// Descriptor of a to-one relation field on `T` targeting `C`.
///
/// Accessors are plain function pointers, so descriptors are `Copy` and can
/// be declared as associated constants.
pub struct ToOneField<T: EntityModel, C: EntityModel> {
    /// Stable field name; the relationship index keys entries by it.
    pub name: RelationName,
    /// Reads the field from an entity.
    pub get: fn(&T) -> &ToOne<C>,
    /// Writes the field on an entity.
    pub get_mut: fn(&mut T) -> &mut ToOne<C>,
    /// Inverse side, when the relation is mutual.
    pub inverse: Option<Inverse>,
}

impl<T: EntityModel, C: EntityModel> ToOneField<T, C> {
    /// Declares a one-way to-one field.
    #[must_use]
    pub const fn one_way(
        name: &'static str,
        get: fn(&T) -> &ToOne<C>,
        get_mut: fn(&mut T) -> &mut ToOne<C>,
    ) -> Self {
        Self {
            name: RelationName::new(name),
            get,
            get_mut,
            inverse: None,
        }
    }

    /// Declares a mutual to-one field with its counterpart on `C`.
    #[must_use]
    pub const fn mutual(
        name: &'static str,
        inverse: Inverse,
        get: fn(&T) -> &ToOne<C>,
        get_mut: fn(&mut T) -> &mut ToOne<C>,
    ) -> Self {
        Self {
            name: RelationName::new(name),
            get,
            get_mut,
            inverse: Some(inverse),
        }
    }

    /// Projects the entity's current field value into a link batch.
    ///
    /// Returns `None` when the field is detached.
    #[must_use]
    pub fn links(&self, parent: &T) -> Option<Links<T, C>> {
        let field = (self.get)(parent);
        field.link_ids().map(|children| Links {
            parent: parent.id(),
            relation: self.name,
            children,
            mode: LinkMode::Replace,
            inverse: self.inverse,
        })
    }

    /// Saves the resolved target, then registers the field's links.
    ///
    /// A detached field is a no-op; a faulted reference links without
    /// touching the target's stored value.
    ///
    /// # Errors
    /// Propagates errors from the target's save hook.
    pub fn save(&self, parent: &T, context: &mut Context) -> Result<()> {
        let field = (self.get)(parent);
        if let Some(target) = field.entity() {
            target.save(context)?;
        }
        if let Some(links) = self.links(parent) {
            context.save_links(links);
        }
        Ok(())
    }
}

impl<T: EntityModel, C: EntityModel> Clone for ToOneField<T, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: EntityModel, C: EntityModel> Copy for ToOneField<T, C> {}

/// Descriptor of a to-many relation field on `T` targeting `C`.
pub struct ToManyField<T: EntityModel, C: EntityModel> {
    /// Stable field name; the relationship index keys entries by it.
    pub name: RelationName,
    /// Reads the field from an entity.
    pub get: fn(&T) -> &ToMany<C>,
    /// Writes the field on an entity.
    pub get_mut: fn(&mut T) -> &mut ToMany<C>,
    /// Inverse side, when the relation is mutual.
    pub inverse: Option<Inverse>,
}

impl<T: EntityModel, C: EntityModel> ToManyField<T, C> {
    /// Declares a one-way to-many field.
    #[must_use]
    pub const fn one_way(
        name: &'static str,
        get: fn(&T) -> &ToMany<C>,
        get_mut: fn(&mut T) -> &mut ToMany<C>,
    ) -> Self {
        Self {
            name: RelationName::new(name),
            get,
            get_mut,
            inverse: None,
        }
    }

    /// Declares a mutual to-many field with its counterpart on `C`.
    #[must_use]
    pub const fn mutual(
        name: &'static str,
        inverse: Inverse,
        get: fn(&T) -> &ToMany<C>,
        get_mut: fn(&mut T) -> &mut ToMany<C>,
    ) -> Self {
        Self {
            name: RelationName::new(name),
            get,
            get_mut,
            inverse: Some(inverse),
        }
    }

    /// Projects the entity's current field value into a link batch.
    ///
    /// Returns `None` when the field is detached. The batch carries the
    /// payload's save mode, so an appending payload projects into an
    /// appending batch.
    #[must_use]
    pub fn links(&self, parent: &T) -> Option<Links<T, C>> {
        let field = (self.get)(parent);
        field.link_ids().map(|children| Links {
            parent: parent.id(),
            relation: self.name,
            children,
            mode: field.mode(),
            inverse: self.inverse,
        })
    }

    /// Saves every resolved child, then registers the field's links.
    ///
    /// A detached field is a no-op; faulted references link without touching
    /// the children's stored values.
    ///
    /// # Errors
    /// Propagates errors from the children's save hooks.
    pub fn save(&self, parent: &T, context: &mut Context) -> Result<()> {
        let field = (self.get)(parent);
        for related in field.iter() {
            if let Some(child) = related.entity() {
                child.save(context)?;
            }
        }
        if let Some(links) = self.links(parent) {
            context.save_links(links);
        }
        Ok(())
    }
}

impl<T: EntityModel, C: EntityModel> Clone for ToManyField<T, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: EntityModel, C: EntityModel> Copy for ToManyField<T, C> {}
