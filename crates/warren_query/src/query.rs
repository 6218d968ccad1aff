//! Lazy queries over context snapshots.
//!
//! A [`Query`] names an entity in one snapshot and carries a resolver
//! closure built up by combinators. Construction and combination never read
//! the store; all traversal happens inside [`Query::resolve`], against the
//! snapshot captured at construction. Queries are cheap to build, clone,
//! and re-resolve, and resolving one never mutates anything.

use std::fmt;
use std::sync::Arc;

use warren_foundation::RelationName;
use warren_store::{Context, EntityModel, Related, ToMany, ToManyField, ToOne, ToOneField};

type Resolver<T> = Arc<dyn Fn() -> Option<T> + Send + Sync>;

/// A lazy query for one entity in one context snapshot.
pub struct Query<T: EntityModel> {
    context: Context,
    id: T::Id,
    resolver: Resolver<T>,
}

impl<T: EntityModel> Query<T> {
    /// Creates a query for the entity stored under the id.
    ///
    /// The context is captured as a snapshot; later saves elsewhere never
    /// change what this query resolves.
    #[must_use]
    pub fn new(context: &Context, id: T::Id) -> Self {
        let snapshot = context.clone();
        let root = id.clone();
        Self {
            context: context.clone(),
            id,
            resolver: Arc::new(move || snapshot.find::<T>(&root)),
        }
    }

    /// The id this query resolves.
    #[must_use]
    pub fn id(&self) -> &T::Id {
        &self.id
    }

    /// Runs the resolver chain.
    ///
    /// Returns `None` when the root entity is not stored. Resolving is pure:
    /// calling it again re-reads the same snapshot and yields the same
    /// result.
    #[must_use]
    pub fn resolve(&self) -> Option<T> {
        (self.resolver)()
    }

    fn then(self, step: impl Fn(T) -> T + Send + Sync + 'static) -> Self {
        let previous = Arc::clone(&self.resolver);
        Self {
            context: self.context,
            id: self.id,
            resolver: Arc::new(move || previous().map(|entity| step(entity))),
        }
    }

    // --- Eager loading ---

    /// Resolves the relation's target and writes it into the field.
    ///
    /// A missing link, or a linked id with no stored value, leaves the field
    /// detached.
    #[must_use]
    pub fn with_one<C: EntityModel>(self, field: ToOneField<T, C>) -> Self {
        self.with_one_nested(field, |query| query)
    }

    /// Like [`Query::with_one`], applying a nested builder to the child
    /// query before it resolves.
    #[must_use]
    pub fn with_one_nested<C: EntityModel>(
        self,
        field: ToOneField<T, C>,
        nested: impl Fn(Query<C>) -> Query<C> + Send + Sync + 'static,
    ) -> Self {
        let context = self.context.clone();
        self.then(move |mut entity| {
            let id = entity.id();
            let target = context
                .children::<T>(field.name, &id)
                .iter()
                .filter_map(|raw| raw.decode::<C::Id>())
                .find_map(|child_id| nested(Query::new(&context, child_id)).resolve());
            *(field.get_mut)(&mut entity) = match target {
                Some(child) => ToOne::resolved(child),
                None => ToOne::none(),
            };
            entity
        })
    }

    /// Resolves the relation's children and replaces the field with them.
    ///
    /// Children keep the index's insertion order; linked ids with no stored
    /// value are skipped.
    #[must_use]
    pub fn with_many<C: EntityModel>(self, field: ToManyField<T, C>) -> Self {
        self.with_many_nested(field, |query| query)
    }

    /// Like [`Query::with_many`], applying a nested builder to each child
    /// query before it resolves.
    #[must_use]
    pub fn with_many_nested<C: EntityModel>(
        self,
        field: ToManyField<T, C>,
        nested: impl Fn(Query<C>) -> Query<C> + Send + Sync + 'static,
    ) -> Self {
        let context = self.context.clone();
        self.then(move |mut entity| {
            let children = resolve_children(&context, field.name, &entity, &nested);
            *(field.get_mut)(&mut entity) = ToMany::resolved(children);
            entity
        })
    }

    /// Resolves the relation's children and unions them into the field.
    ///
    /// Unlike [`Query::with_many`] this keeps whatever the field already
    /// holds: existing ids are refreshed in place, novel ids are appended.
    #[must_use]
    pub fn fragment<C: EntityModel>(self, field: ToManyField<T, C>) -> Self {
        self.fragment_nested(field, |query| query)
    }

    /// Like [`Query::fragment`], applying a nested builder to each child
    /// query before it resolves.
    #[must_use]
    pub fn fragment_nested<C: EntityModel>(
        self,
        field: ToManyField<T, C>,
        nested: impl Fn(Query<C>) -> Query<C> + Send + Sync + 'static,
    ) -> Self {
        let context = self.context.clone();
        self.then(move |mut entity| {
            let children = resolve_children(&context, field.name, &entity, &nested);
            (field.get_mut)(&mut entity).merge(children.into_iter().map(Related::resolved));
            entity
        })
    }

    // --- Faulted loading ---

    /// Writes the relation's target into the field as a faulted reference,
    /// without touching the entity table.
    #[must_use]
    pub fn ref_one<C: EntityModel>(self, field: ToOneField<T, C>) -> Self {
        let context = self.context.clone();
        self.then(move |mut entity| {
            let id = entity.id();
            let target = context
                .children::<T>(field.name, &id)
                .iter()
                .find_map(|raw| raw.decode::<C::Id>());
            *(field.get_mut)(&mut entity) = match target {
                Some(child_id) => ToOne::faulted(child_id),
                None => ToOne::none(),
            };
            entity
        })
    }

    /// Replaces the field with the relation's children as faulted
    /// references, without touching the entity table.
    #[must_use]
    pub fn ref_many<C: EntityModel>(self, field: ToManyField<T, C>) -> Self {
        let context = self.context.clone();
        self.then(move |mut entity| {
            let id = entity.id();
            let ids: Vec<C::Id> = context
                .children::<T>(field.name, &id)
                .iter()
                .filter_map(|raw| raw.decode::<C::Id>())
                .collect();
            *(field.get_mut)(&mut entity) = ToMany::faulted(ids);
            entity
        })
    }

    /// Unions the relation's children into the field as faulted references.
    #[must_use]
    pub fn ref_many_fragment<C: EntityModel>(self, field: ToManyField<T, C>) -> Self {
        let context = self.context.clone();
        self.then(move |mut entity| {
            let id = entity.id();
            let ids: Vec<C::Id> = context
                .children::<T>(field.name, &id)
                .iter()
                .filter_map(|raw| raw.decode::<C::Id>())
                .collect();
            (field.get_mut)(&mut entity).merge(ids.into_iter().map(Related::faulted));
            entity
        })
    }
}

fn resolve_children<T: EntityModel, C: EntityModel>(
    context: &Context,
    relation: RelationName,
    entity: &T,
    nested: &impl Fn(Query<C>) -> Query<C>,
) -> Vec<C> {
    let id = entity.id();
    context
        .children::<T>(relation, &id)
        .iter()
        .filter_map(|raw| raw.decode::<C::Id>())
        .filter_map(|child_id| nested(Query::new(context, child_id)).resolve())
        .collect()
}

impl<T: EntityModel> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
            id: self.id.clone(),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

impl<T: EntityModel> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Query({}/{})", T::entity_name(), self.id)
    }
}

/// Resolves every query, dropping misses and preserving order.
#[must_use]
pub fn resolve_all<T: EntityModel>(queries: impl IntoIterator<Item = Query<T>>) -> Vec<T> {
    queries.into_iter().filter_map(|query| query.resolve()).collect()
}

/// Query-construction sugar on [`Context`].
pub trait QueryContext {
    /// Creates a query for the entity stored under the id.
    fn query<T: EntityModel>(&self, id: T::Id) -> Query<T>;

    /// Creates one query per id, over the same snapshot.
    fn query_all<T: EntityModel>(&self, ids: impl IntoIterator<Item = T::Id>) -> Vec<Query<T>>;
}

impl QueryContext for Context {
    fn query<T: EntityModel>(&self, id: T::Id) -> Query<T> {
        Query::new(self, id)
    }

    fn query_all<T: EntityModel>(&self, ids: impl IntoIterator<Item = T::Id>) -> Vec<Query<T>> {
        ids.into_iter().map(|id| Query::new(self, id)).collect()
    }
}
