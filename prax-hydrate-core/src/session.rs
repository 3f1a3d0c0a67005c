//! The persistence context hydration runs against.
//!
//! A [`Session`] bundles the collaborators (executor, metadata, identity
//! resolution) with the identity map they share. It is passed explicitly to
//! every operation; nothing is kept in global state. A session is meant for one
//! unit of work: give concurrent callers their own session.

use std::sync::Arc;

use tracing::trace;

use crate::error::{HydrateError, HydrateResult};
use crate::identity::{canonical_key, IdentityKey, IdentityMap, PrimaryKeyResolver};
use crate::subject::{Association, AssociationValue};
use crate::traits::{
    BatchExecutor, BoxFuture, Entity, EntityRef, IdentityResolver, MetadataProvider, PropertyReader,
};

/// Explicit persistence context: collaborators plus the shared identity map.
pub struct Session {
    executor: Arc<dyn BatchExecutor>,
    metadata: Arc<dyn MetadataProvider>,
    resolver: Arc<dyn IdentityResolver>,
    identity_map: IdentityMap,
}

impl Session {
    /// Create a session over an executor and a metadata provider.
    pub fn new(
        executor: impl BatchExecutor + 'static,
        metadata: impl MetadataProvider + 'static,
    ) -> Self {
        Self {
            executor: Arc::new(executor),
            metadata: Arc::new(metadata),
            resolver: Arc::new(PrimaryKeyResolver),
            identity_map: IdentityMap::new(),
        }
    }

    /// Replace the identity resolver.
    pub fn with_identity_resolver(mut self, resolver: impl IdentityResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// The batch executor.
    pub fn executor(&self) -> &dyn BatchExecutor {
        self.executor.as_ref()
    }

    /// The metadata provider.
    pub fn metadata(&self) -> &dyn MetadataProvider {
        self.metadata.as_ref()
    }

    /// The shared identity map.
    pub fn identity_map(&self) -> &IdentityMap {
        &self.identity_map
    }

    /// Identity key of `entity` under its canonical model name.
    pub fn identity_key_of(&self, entity: &dyn Entity) -> HydrateResult<IdentityKey> {
        let key = self.resolver.identity_key_of(entity)?;
        canonical_key(key, self.metadata.as_ref())
    }

    /// Register an entity in the identity map, returning the managed instance.
    pub fn attach(&self, entity: EntityRef) -> HydrateResult<EntityRef> {
        let key = self.identity_key_of(entity.as_ref())?;
        Ok(self.identity_map.register(key, entity))
    }

    /// Read an association, materializing it if it is deferred.
    ///
    /// A deferred association is served from the identity map when it was
    /// already materialized, otherwise it costs one query for this entity.
    pub async fn read_association(
        &self,
        entity: &EntityRef,
        name: &str,
    ) -> HydrateResult<AssociationValue> {
        let slot = entity
            .association(name)
            .ok_or_else(|| HydrateError::unknown_property(entity.model_name(), name))?;

        match slot {
            Association::Loaded(value) => Ok(value),
            Association::Deferred => {
                let key = self.identity_key_of(entity.as_ref())?;
                if let Some(value) = self.identity_map.association(&key, name) {
                    trace!(entity = %key, association = name, "Association served from identity map");
                    return Ok(value);
                }

                let owner = self.metadata.metadata_for(key.model())?;
                let relation = owner.relation(name)?;
                trace!(entity = %key, association = name, "Loading deferred association");
                let value = self
                    .executor
                    .load_association(&key, relation, &self.identity_map)
                    .await?;
                self.identity_map.register_association(&key, name, value.clone());
                Ok(value)
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("identity_map", &self.identity_map)
            .finish_non_exhaustive()
    }
}

/// Default [`PropertyReader`]: reads through [`Session::read_association`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionPropertyReader;

impl PropertyReader for SessionPropertyReader {
    fn read<'a>(
        &'a self,
        session: &'a Session,
        entity: &'a EntityRef,
        property: &'a str,
    ) -> BoxFuture<'a, HydrateResult<AssociationValue>> {
        Box::pin(session.read_association(entity, property))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryExecutor;
    use crate::testing::{address, customer, order, schema, Fixture};

    #[tokio::test]
    async fn test_loaded_association_needs_no_query() {
        let executor = MemoryExecutor::new();
        let session = Session::new(executor.clone(), schema());
        let order = order(1, Some(customer(10, None)));

        let value = session.read_association(&order, "customer").await.unwrap();

        assert_eq!(value.len(), 1);
        assert_eq!(executor.query_count(), 0);
    }

    #[tokio::test]
    async fn test_deferred_association_loads_once() {
        let fixture = Fixture::new();
        let customer = fixture.deferred_customer(10);
        fixture.executor.relate(&customer, "address", address(100)).unwrap();

        let first = fixture.session.read_association(&customer, "address").await.unwrap();
        let second = fixture.session.read_association(&customer, "address").await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(fixture.executor.loads().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_property_is_access_error() {
        let session = Session::new(MemoryExecutor::new(), schema());
        let err = session
            .read_association(&order(1, None), "invoice")
            .await
            .unwrap_err();
        assert!(err.is_access_error());
    }

    #[test]
    fn test_identity_key_uses_canonical_model() {
        let registry = schema().with_alias("CustomerProxy", "Customer");
        let session = Session::new(MemoryExecutor::new(), registry);
        let proxy = crate::testing::customer_proxy(10);

        let key = session.identity_key_of(proxy.as_ref()).unwrap();
        assert_eq!(key, IdentityKey::single("Customer", 10));
    }

    #[test]
    fn test_attach_returns_managed_instance() {
        let session = Session::new(MemoryExecutor::new(), schema());
        let first = customer(10, None);
        session.attach(first.clone()).unwrap();
        let managed = session.attach(customer(10, None)).unwrap();
        assert!(Arc::ptr_eq(&managed, &first));
    }
}
