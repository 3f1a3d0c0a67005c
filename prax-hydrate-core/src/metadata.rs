//! Model metadata and the in-process schema registry.
//!
//! ```rust
//! use prax_hydrate_core::metadata::{ModelMetadata, SchemaRegistry};
//! use prax_hydrate_core::relations::RelationSpec;
//! use prax_hydrate_core::traits::MetadataProvider;
//!
//! let registry = SchemaRegistry::new()
//!     .with_model(
//!         ModelMetadata::new("Order", "orders").with_relation(
//!             RelationSpec::many_to_one("customer", "Customer", "customers")
//!                 .fields(["customer_id"])
//!                 .references(["id"]),
//!         ),
//!     )
//!     .with_model(ModelMetadata::new("Customer", "customers"));
//!
//! let order = registry.metadata_for("Order").unwrap();
//! let customer = registry.resolve(&order, "customer").unwrap();
//! assert_eq!(customer.name, "Customer");
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::error::{HydrateError, HydrateResult};
use crate::relations::{RelationRegistry, RelationSpec};
use crate::traits::{MetadataProvider, Model};

/// Metadata of one model: table, primary key and relations.
#[derive(Debug, Clone)]
pub struct ModelMetadata {
    /// Canonical model name.
    pub name: SmolStr,
    /// Table name.
    pub table: String,
    /// Primary key columns.
    pub primary_key: Vec<String>,
    relations: RelationRegistry,
}

impl ModelMetadata {
    /// Create metadata with an `id` primary key and no relations.
    pub fn new(name: impl Into<SmolStr>, table: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            primary_key: vec!["id".to_string()],
            relations: RelationRegistry::new(),
        }
    }

    /// Build metadata from a [`Model`] implementation.
    pub fn of<M: Model>() -> Self {
        let mut meta = Self::new(M::MODEL_NAME, M::TABLE_NAME).with_primary_key(M::PRIMARY_KEY.iter().copied());
        for relation in M::relations() {
            meta.relations.register(relation);
        }
        meta
    }

    /// Set the primary key columns.
    pub fn with_primary_key(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.primary_key = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Declare a relation.
    pub fn with_relation(mut self, relation: RelationSpec) -> Self {
        self.relations.register(relation);
        self
    }

    /// Look up a relation, failing with a metadata error if it is not declared.
    pub fn relation(&self, name: &str) -> HydrateResult<&RelationSpec> {
        self.relations
            .get(name)
            .ok_or_else(|| HydrateError::unknown_association(self.name.as_str(), name))
    }

    /// Check if a relation is declared.
    pub fn has_relation(&self, name: &str) -> bool {
        self.relations.get(name).is_some()
    }

    /// All declared relations.
    pub fn relations(&self) -> &RelationRegistry {
        &self.relations
    }
}

/// A [`MetadataProvider`] backed by registered [`ModelMetadata`].
///
/// Aliases map alternative type names (e.g. proxy or subtype names reported by
/// [`crate::traits::Entity::model_name`]) onto a canonical model.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    models: HashMap<SmolStr, Arc<ModelMetadata>>,
    aliases: HashMap<SmolStr, SmolStr>,
}

impl SchemaRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register model metadata.
    pub fn register(&mut self, metadata: ModelMetadata) {
        self.models.insert(metadata.name.clone(), Arc::new(metadata));
    }

    /// Register the metadata of a [`Model`] type.
    pub fn register_model<M: Model>(&mut self) {
        self.register(ModelMetadata::of::<M>());
    }

    /// Register an alias for a model.
    pub fn alias(&mut self, alias: impl Into<SmolStr>, model: impl Into<SmolStr>) {
        self.aliases.insert(alias.into(), model.into());
    }

    /// Builder form of [`SchemaRegistry::register`].
    pub fn with_model(mut self, metadata: ModelMetadata) -> Self {
        self.register(metadata);
        self
    }

    /// Builder form of [`SchemaRegistry::alias`].
    pub fn with_alias(mut self, alias: impl Into<SmolStr>, model: impl Into<SmolStr>) -> Self {
        self.alias(alias, model);
        self
    }

    /// Number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Check if no model is registered.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl MetadataProvider for SchemaRegistry {
    fn metadata_for(&self, model: &str) -> HydrateResult<Arc<ModelMetadata>> {
        let canonical = self.aliases.get(model).map(SmolStr::as_str).unwrap_or(model);
        self.models
            .get(canonical)
            .cloned()
            .ok_or_else(|| HydrateError::unknown_model(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::schema;

    struct Product;

    impl Model for Product {
        const MODEL_NAME: &'static str = "Product";
        const TABLE_NAME: &'static str = "products";
        const PRIMARY_KEY: &'static [&'static str] = &["sku"];

        fn relations() -> Vec<RelationSpec> {
            vec![RelationSpec::one_to_many("variants", "Variant", "variants").references(["product_sku"])]
        }
    }

    #[test]
    fn test_metadata_of_model() {
        let meta = ModelMetadata::of::<Product>();
        assert_eq!(meta.name, "Product");
        assert_eq!(meta.table, "products");
        assert_eq!(meta.primary_key, vec!["sku".to_string()]);
        assert!(meta.has_relation("variants"));
    }

    #[test]
    fn test_resolve_association_target() {
        let registry = schema();
        let order = registry.metadata_for("Order").unwrap();
        let customer = registry.resolve(&order, "customer").unwrap();
        let address = registry.resolve(&customer, "address").unwrap();
        assert_eq!(address.name, "Address");
    }

    #[test]
    fn test_unknown_model() {
        let err = schema().metadata_for("Invoice").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownModel);
    }

    #[test]
    fn test_unknown_association() {
        let registry = schema();
        let order = registry.metadata_for("Order").unwrap();
        let err = registry.resolve(&order, "shipment").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownAssociation);
        assert!(err.is_metadata_error());
    }

    #[test]
    fn test_alias_resolves_to_canonical_model() {
        let mut registry = schema();
        registry.register_model::<Product>();
        registry.alias("ProductProxy", "Product");

        let meta = registry.metadata_for("ProductProxy").unwrap();
        assert_eq!(meta.name, "Product");
    }
}
