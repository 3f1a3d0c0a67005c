//! # prax-hydrate-core
//!
//! Batched association hydration for the Prax ORM.
//!
//! Reading an association on each of N loaded entities issues N queries (the
//! N+1 problem). This crate loads an association path for a whole set of
//! entities with a single query per path:
//! - Dotted association paths (`customer.address`) walked through the
//!   in-memory object graph
//! - Identity-based deduplication of the entities reached
//! - One `LEFT JOIN` fetch per path, materialized into the session's identity map
//! - Per-model presets loaded from `prax-hydrate.toml`
//!
//! ## Paths
//!
//! ```rust
//! use prax_hydrate_core::relations::AssociationPath;
//!
//! let path = AssociationPath::parse("items.product").unwrap();
//! assert_eq!(path.traversal(), ["items"]);
//! assert_eq!(path.final_association(), "product");
//!
//! assert!(AssociationPath::parse("items..product").is_err());
//! ```
//!
//! ## Fetch SQL
//!
//! ```rust
//! use prax_hydrate_core::fetch::BatchFetch;
//! use prax_hydrate_core::identity::IdentityKey;
//! use prax_hydrate_core::metadata::ModelMetadata;
//! use prax_hydrate_core::relations::RelationSpec;
//!
//! let fetch = BatchFetch::new(
//!     &ModelMetadata::new("Customer", "customers"),
//!     RelationSpec::many_to_one("address", "Address", "addresses")
//!         .fields(["address_id"])
//!         .references(["id"]),
//!     vec![IdentityKey::single("Customer", 10)],
//! );
//!
//! let (sql, params) = fetch.to_sql();
//! assert!(sql.contains("LEFT JOIN addresses AS associations"));
//! assert_eq!(params.len(), 1);
//! ```
//!
//! ## Hydration
//!
//! ```rust,ignore
//! use prax_hydrate_core::prelude::*;
//!
//! let session = Session::new(executor, registry);
//! let hydrator = AssociationHydrator::new(&session, "Order")?;
//!
//! hydrator
//!     .hydrate_associations(orders, ["customer.address", "items.product"])
//!     .await?;
//! ```

pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod hydrator;
pub mod identity;
pub mod logging;
pub mod memory;
pub mod metadata;
pub mod relations;
pub mod session;
pub mod subject;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use config::HydratorConfig;
pub use error::{ErrorCode, HydrateError, HydrateResult};
pub use fetch::BatchFetch;
pub use filter::{Filter, FilterValue, KeyValue};
pub use hydrator::AssociationHydrator;
pub use identity::{IdentityKey, IdentityMap, PrimaryKeyResolver};
pub use memory::MemoryExecutor;
pub use metadata::{ModelMetadata, SchemaRegistry};
pub use relations::{AssociationPath, RelationSpec, RelationType};
pub use session::{Session, SessionPropertyReader};
pub use subject::{Association, AssociationValue, Subjects};
pub use traits::{
    BatchExecutor, BoxFuture, Entity, EntityRef, IdentityResolver, MetadataProvider, Model,
    PrimaryKey, PropertyReader,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::HydratorConfig;
    pub use crate::error::{HydrateError, HydrateResult};
    pub use crate::hydrator::AssociationHydrator;
    pub use crate::identity::IdentityKey;
    pub use crate::metadata::{ModelMetadata, SchemaRegistry};
    pub use crate::relations::RelationSpec;
    pub use crate::session::Session;
    pub use crate::subject::{Association, AssociationValue, Subjects};
    pub use crate::traits::{BatchExecutor, Entity, EntityRef, MetadataProvider, Model};
}
