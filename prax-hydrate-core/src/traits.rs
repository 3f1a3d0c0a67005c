//! Core traits: entities and the collaborators hydration calls into.

use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::HydrateResult;
use crate::fetch::BatchFetch;
use crate::filter::KeyValue;
use crate::identity::{IdentityKey, IdentityMap};
use crate::metadata::ModelMetadata;
use crate::relations::RelationSpec;
use crate::session::Session;
use crate::subject::{Association, AssociationValue};

/// A boxed future for async collaborator operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Primary key values of an entity, in primary key column order.
pub type PrimaryKey = SmallVec<[KeyValue; 1]>;

/// A shared handle to a loaded entity.
pub type EntityRef = Arc<dyn Entity>;

/// Static description of a model type.
pub trait Model {
    /// The name of the model.
    const MODEL_NAME: &'static str;

    /// The name of the database table.
    const TABLE_NAME: &'static str;

    /// The primary key column name(s).
    const PRIMARY_KEY: &'static [&'static str];

    /// Relations declared on this model.
    fn relations() -> Vec<RelationSpec> {
        Vec::new()
    }
}

/// A loaded entity instance whose associations can be read without reflection.
///
/// Each concrete entity type implements this, exposing its associations by
/// name. Returning `None` from [`Entity::association`] means the type has no
/// such property.
pub trait Entity: Send + Sync + 'static {
    /// Model name of the concrete type.
    fn model_name(&self) -> &str;

    /// Primary key values, or `None` for an entity that was never persisted.
    fn primary_key(&self) -> Option<PrimaryKey>;

    /// The in-memory state of the named association.
    fn association(&self, name: &str) -> Option<Association>;

    /// Upcast for typed access.
    fn as_any(&self) -> &dyn Any;
}

impl dyn Entity {
    /// Downcast to a concrete entity type.
    pub fn downcast_ref<T: Entity>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Source of model metadata.
pub trait MetadataProvider: Send + Sync {
    /// Metadata for the named model.
    fn metadata_for(&self, model: &str) -> HydrateResult<Arc<ModelMetadata>>;

    /// Metadata for the target model of `association` on `model`.
    fn resolve(&self, model: &ModelMetadata, association: &str) -> HydrateResult<Arc<ModelMetadata>> {
        let relation = model.relation(association)?;
        self.metadata_for(&relation.related_model)
    }
}

/// Reads association values off entity instances.
pub trait PropertyReader: Send + Sync {
    /// Read `property` on `entity`. May materialize a deferred association
    /// through the session.
    fn read<'a>(
        &'a self,
        session: &'a Session,
        entity: &'a EntityRef,
        property: &'a str,
    ) -> BoxFuture<'a, HydrateResult<AssociationValue>>;
}

/// Computes the identity key of an entity.
pub trait IdentityResolver: Send + Sync {
    /// Identity key of `entity`. Equal for equal logical entities.
    fn identity_key_of(&self, entity: &dyn Entity) -> HydrateResult<IdentityKey>;
}

/// Executes fetches against the persistence backend.
pub trait BatchExecutor: Send + Sync {
    /// Run one query selecting `fetch.keys` with `fetch.association()` joined.
    ///
    /// Implementations must register every matched subject and its joined
    /// association value in `identity_map`. Returns the number of rows read.
    fn fetch_with_join<'a>(
        &'a self,
        fetch: &'a BatchFetch,
        identity_map: &'a IdentityMap,
    ) -> BoxFuture<'a, HydrateResult<u64>>;

    /// Load a single association for a single owner.
    fn load_association<'a>(
        &'a self,
        owner: &'a IdentityKey,
        relation: &'a RelationSpec,
        identity_map: &'a IdentityMap,
    ) -> BoxFuture<'a, HydrateResult<AssociationValue>>;
}
