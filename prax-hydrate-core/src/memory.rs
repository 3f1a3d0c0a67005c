//! In-memory batch executor.
//!
//! Serves fetches from an in-process dataset and records every query it is
//! asked to run, which makes it usable both as a reference backend and as a
//! spy in tests.
//!
//! Entities are keyed the way a [`crate::session::Session`] keys them: give
//! the executor the session's metadata when models are aliased.
//!
//! ```rust
//! use prax_hydrate_core::memory::MemoryExecutor;
//! use prax_hydrate_core::metadata::SchemaRegistry;
//!
//! let executor = MemoryExecutor::with_metadata(SchemaRegistry::new());
//! assert_eq!(executor.query_count(), 0);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use smol_str::SmolStr;
use tracing::trace;

use crate::error::{HydrateError, HydrateResult};
use crate::fetch::BatchFetch;
use crate::identity::{canonical_key, IdentityKey, IdentityMap, PrimaryKeyResolver};
use crate::relations::{RelationSpec, RelationType};
use crate::subject::AssociationValue;
use crate::traits::{BatchExecutor, BoxFuture, EntityRef, IdentityResolver, MetadataProvider};

#[derive(Default)]
struct Store {
    entities: HashMap<IdentityKey, EntityRef>,
    edges: HashMap<IdentityKey, HashMap<SmolStr, AssociationValue>>,
}

impl Store {
    fn insert(&mut self, key: IdentityKey, entity: &EntityRef) {
        self.entities.entry(key).or_insert_with(|| entity.clone());
    }

    fn association(&self, key: &IdentityKey, name: &str, relation_type: RelationType) -> AssociationValue {
        match self.edges.get(key).and_then(|edges| edges.get(name)) {
            Some(value) => value.clone(),
            None if relation_type.is_many() => AssociationValue::Many(Vec::new()),
            None => AssociationValue::Null,
        }
    }
}

#[derive(Default)]
struct QueryLog {
    fetches: Vec<BatchFetch>,
    loads: Vec<(IdentityKey, SmolStr)>,
}

#[derive(Default)]
struct Inner {
    store: RwLock<Store>,
    log: Mutex<QueryLog>,
    failure: Mutex<Option<HydrateError>>,
    metadata: Option<Arc<dyn MetadataProvider>>,
}

/// A [`BatchExecutor`] over an in-memory dataset.
///
/// Clones share the same dataset and query log.
#[derive(Clone, Default)]
pub struct MemoryExecutor {
    inner: Arc<Inner>,
}

impl MemoryExecutor {
    /// Create an empty executor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty executor keying entities under the canonical model
    /// names of `metadata`.
    pub fn with_metadata(metadata: impl MetadataProvider + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                metadata: Some(Arc::new(metadata)),
                ..Inner::default()
            }),
        }
    }

    /// Add an entity to the dataset.
    pub fn insert(&self, entity: EntityRef) -> HydrateResult<IdentityKey> {
        let key = self.key_of(&entity)?;
        self.inner.store.write().insert(key.clone(), &entity);
        Ok(key)
    }

    /// Store the value of `association` on `owner`, adding the owner and the
    /// related entities to the dataset.
    pub fn relate(
        &self,
        owner: &EntityRef,
        association: &str,
        value: impl Into<AssociationValue>,
    ) -> HydrateResult<()> {
        let value = value.into();
        let key = self.key_of(owner)?;
        let related = value
            .iter()
            .map(|entity| Ok((self.key_of(entity)?, entity.clone())))
            .collect::<HydrateResult<Vec<_>>>()?;

        let mut store = self.inner.store.write();
        store.insert(key.clone(), owner);
        for (related_key, entity) in &related {
            store.insert(related_key.clone(), entity);
        }
        store
            .edges
            .entry(key)
            .or_default()
            .insert(SmolStr::new(association), value);
        Ok(())
    }

    /// Make the next query fail with `error`.
    pub fn fail_next(&self, error: HydrateError) {
        *self.inner.failure.lock() = Some(error);
    }

    /// Batched fetches issued so far.
    pub fn fetches(&self) -> Vec<BatchFetch> {
        self.inner.log.lock().fetches.clone()
    }

    /// Single-association loads issued so far.
    pub fn loads(&self) -> Vec<(IdentityKey, SmolStr)> {
        self.inner.log.lock().loads.clone()
    }

    /// Total number of queries issued.
    pub fn query_count(&self) -> usize {
        let log = self.inner.log.lock();
        log.fetches.len() + log.loads.len()
    }

    /// Forget the issued queries.
    pub fn reset_log(&self) {
        let mut log = self.inner.log.lock();
        log.fetches.clear();
        log.loads.clear();
    }

    fn key_of(&self, entity: &EntityRef) -> HydrateResult<IdentityKey> {
        let key = PrimaryKeyResolver.identity_key_of(entity.as_ref())?;
        match &self.inner.metadata {
            Some(metadata) => canonical_key(key, metadata.as_ref()),
            None => Ok(key),
        }
    }

    fn register_related(&self, identity_map: &IdentityMap, value: &AssociationValue) {
        for related in value.iter() {
            if let Ok(key) = self.key_of(related) {
                identity_map.register(key, related.clone());
            }
        }
    }

    fn take_failure(&self) -> HydrateResult<()> {
        match self.inner.failure.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl BatchExecutor for MemoryExecutor {
    fn fetch_with_join<'a>(
        &'a self,
        fetch: &'a BatchFetch,
        identity_map: &'a IdentityMap,
    ) -> BoxFuture<'a, HydrateResult<u64>> {
        Box::pin(async move {
            self.inner.log.lock().fetches.push(fetch.clone());
            self.take_failure()?;

            let store = self.inner.store.read();
            let mut rows = 0u64;
            for key in &fetch.keys {
                let Some(subject) = store.entities.get(key) else {
                    continue;
                };
                identity_map.register(key.clone(), subject.clone());

                let value = store.association(key, fetch.association(), fetch.join.relation_type);
                self.register_related(identity_map, &value);
                // LEFT JOIN: a subject without related rows still yields one row
                rows += value.len().max(1) as u64;
                identity_map.register_association(key, fetch.association(), value);
            }

            trace!(model = %fetch.model, association = fetch.association(), rows, "Memory fetch served");
            Ok(rows)
        })
    }

    fn load_association<'a>(
        &'a self,
        owner: &'a IdentityKey,
        relation: &'a RelationSpec,
        identity_map: &'a IdentityMap,
    ) -> BoxFuture<'a, HydrateResult<AssociationValue>> {
        Box::pin(async move {
            self.inner
                .log
                .lock()
                .loads
                .push((owner.clone(), relation.name.clone()));
            self.take_failure()?;

            let value = self
                .inner
                .store
                .read()
                .association(owner, &relation.name, relation.relation_type);
            self.register_related(identity_map, &value);
            Ok(value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ModelMetadata;
    use crate::testing::{address, customer, customer_proxy, schema};

    fn address_fetch(keys: Vec<IdentityKey>) -> BatchFetch {
        BatchFetch::new(
            &ModelMetadata::new("Customer", "customers"),
            RelationSpec::many_to_one("address", "Address", "addresses")
                .fields(["address_id"])
                .references(["id"]),
            keys,
        )
    }

    #[tokio::test]
    async fn test_fetch_populates_identity_map() {
        let executor = MemoryExecutor::new();
        let with_address = customer(10, None);
        executor.relate(&with_address, "address", address(100)).unwrap();
        executor.insert(customer(11, None)).unwrap();

        let identity_map = IdentityMap::new();
        let fetch = address_fetch(vec![
            IdentityKey::single("Customer", 10),
            IdentityKey::single("Customer", 11),
            IdentityKey::single("Customer", 12),
        ]);
        let rows = executor.fetch_with_join(&fetch, &identity_map).await.unwrap();

        assert_eq!(rows, 2);
        assert!(identity_map.contains(&IdentityKey::single("Customer", 10)));
        assert!(identity_map.contains(&IdentityKey::single("Address", 100)));
        assert!(!identity_map.contains(&IdentityKey::single("Customer", 12)));
        assert!(identity_map.is_loaded(&IdentityKey::single("Customer", 11), "address"));
        assert_eq!(executor.fetches().len(), 1);
    }

    #[tokio::test]
    async fn test_aliased_entities_keyed_by_canonical_model() {
        let executor = MemoryExecutor::with_metadata(schema().with_alias("CustomerProxy", "Customer"));
        let key = executor.insert(customer_proxy(10)).unwrap();
        assert_eq!(key, IdentityKey::single("Customer", 10));
        executor
            .relate(&customer_proxy(11), "address", address(101))
            .unwrap();

        let identity_map = IdentityMap::new();
        let fetch = address_fetch(vec![
            IdentityKey::single("Customer", 10),
            IdentityKey::single("Customer", 11),
        ]);
        let rows = executor.fetch_with_join(&fetch, &identity_map).await.unwrap();

        assert_eq!(rows, 2);
        assert!(identity_map.contains(&IdentityKey::single("Customer", 10)));
        assert!(!identity_map.contains(&IdentityKey::single("CustomerProxy", 10)));
        let address = identity_map
            .association(&IdentityKey::single("Customer", 11), "address")
            .unwrap();
        assert_eq!(address.len(), 1);
    }

    #[tokio::test]
    async fn test_fail_next_fails_once() {
        let executor = MemoryExecutor::new();
        executor.fail_next(HydrateError::query_failed("connection reset"));
        let identity_map = IdentityMap::new();
        let fetch = address_fetch(vec![IdentityKey::single("Customer", 10)]);

        let err = executor.fetch_with_join(&fetch, &identity_map).await.unwrap_err();
        assert!(err.is_query_error());
        assert!(executor.fetch_with_join(&fetch, &identity_map).await.is_ok());
        assert_eq!(executor.query_count(), 2);

        executor.reset_log();
        assert_eq!(executor.query_count(), 0);
    }
}
