//! Relation metadata and association paths.
//!
//! A [`RelationSpec`] describes how a model links to another one. An
//! [`AssociationPath`] names a chain of relations such as
//! `"customer.address"`: every segment but the last is traversed in memory,
//! the last one is loaded with a single batched fetch.
//!
//! ```rust
//! use prax_hydrate_core::relations::AssociationPath;
//!
//! let path = AssociationPath::parse("order.items.product").unwrap();
//! assert_eq!(path.traversal(), ["order", "items"]);
//! assert_eq!(path.final_association(), "product");
//! ```

mod path;
mod spec;

pub use path::{AssociationPath, DEFAULT_DELIMITER};
pub use spec::{JoinTableSpec, RelationRegistry, RelationSpec, RelationType};
