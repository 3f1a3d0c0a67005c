//! Entity identity keys and the session identity map.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;
use smol_str::SmolStr;

use crate::error::{HydrateError, HydrateResult};
use crate::filter::KeyValue;
use crate::subject::AssociationValue;
use crate::traits::{Entity, EntityRef, IdentityResolver, MetadataProvider, PrimaryKey};

/// Identity of a persisted entity: its model plus primary key values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentityKey {
    model: SmolStr,
    values: PrimaryKey,
}

impl IdentityKey {
    /// Create a key from a model name and primary key values.
    pub fn new(model: impl Into<SmolStr>, values: impl IntoIterator<Item = KeyValue>) -> Self {
        Self {
            model: model.into(),
            values: values.into_iter().collect(),
        }
    }

    /// Create a key for a single-column primary key.
    pub fn single(model: impl Into<SmolStr>, value: impl Into<KeyValue>) -> Self {
        Self::new(model, [value.into()])
    }

    /// The model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The primary key values.
    pub fn values(&self) -> &[KeyValue] {
        &self.values
    }

    /// Same values under another model name.
    pub fn with_model(mut self, model: impl Into<SmolStr>) -> Self {
        self.model = model.into();
        self
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#", self.model)?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}

/// Resolves identity from [`Entity::primary_key`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimaryKeyResolver;

impl IdentityResolver for PrimaryKeyResolver {
    fn identity_key_of(&self, entity: &dyn Entity) -> HydrateResult<IdentityKey> {
        match entity.primary_key() {
            Some(values) if !values.is_empty() => Ok(IdentityKey {
                model: SmolStr::new(entity.model_name()),
                values,
            }),
            _ => Err(HydrateError::missing_identifier(entity.model_name())),
        }
    }
}

/// Rename `key` to the canonical model name known to `metadata`.
///
/// Aliased model names (proxies, subtypes) map onto the model they stand for,
/// so every party sharing an identity map agrees on the key of an entity.
pub fn canonical_key(key: IdentityKey, metadata: &dyn MetadataProvider) -> HydrateResult<IdentityKey> {
    let model = metadata.metadata_for(key.model())?;
    if model.name == key.model() {
        Ok(key)
    } else {
        Ok(key.with_model(model.name.clone()))
    }
}

#[derive(Default)]
struct Entries {
    entities: HashMap<IdentityKey, EntityRef>,
    associations: HashMap<IdentityKey, HashMap<SmolStr, AssociationValue>>,
}

/// Shared object cache of a session.
///
/// Holds one instance per identity plus every association value that was
/// materialized for it. Executors write into it; association reads consult it
/// before issuing a query.
#[derive(Default)]
pub struct IdentityMap {
    entries: RwLock<Entries>,
}

impl IdentityMap {
    /// Create an empty identity map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity, returning the instance already managed for this
    /// identity if there is one.
    pub fn register(&self, key: IdentityKey, entity: EntityRef) -> EntityRef {
        self.entries
            .write()
            .entities
            .entry(key)
            .or_insert(entity)
            .clone()
    }

    /// Get the managed instance for an identity.
    pub fn get(&self, key: &IdentityKey) -> Option<EntityRef> {
        self.entries.read().entities.get(key).cloned()
    }

    /// Check if an identity is managed.
    pub fn contains(&self, key: &IdentityKey) -> bool {
        self.entries.read().entities.contains_key(key)
    }

    /// Store a materialized association value.
    pub fn register_association(
        &self,
        key: &IdentityKey,
        association: &str,
        value: AssociationValue,
    ) {
        self.entries
            .write()
            .associations
            .entry(key.clone())
            .or_default()
            .insert(SmolStr::new(association), value);
    }

    /// Get a materialized association value.
    pub fn association(&self, key: &IdentityKey, association: &str) -> Option<AssociationValue> {
        self.entries
            .read()
            .associations
            .get(key)
            .and_then(|assocs| assocs.get(association))
            .cloned()
    }

    /// Check if an association has been materialized.
    pub fn is_loaded(&self, key: &IdentityKey, association: &str) -> bool {
        self.entries
            .read()
            .associations
            .get(key)
            .is_some_and(|assocs| assocs.contains_key(association))
    }

    /// Number of managed entities.
    pub fn len(&self) -> usize {
        self.entries.read().entities.len()
    }

    /// Check if no entity is managed.
    pub fn is_empty(&self) -> bool {
        self.entries.read().entities.is_empty()
    }

    /// Drop every entity and association.
    pub fn clear(&self) {
        let mut entries = self.entries.write();
        entries.entities.clear();
        entries.associations.clear();
    }
}

impl fmt::Debug for IdentityMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.read();
        f.debug_struct("IdentityMap")
            .field("entities", &entries.entities.len())
            .field("associations", &entries.associations.values().map(HashMap::len).sum::<usize>())
            .finish()
    }
}
