//! # Prax Hydrate
//!
//! Batched eager loading of association paths for the Prax ORM.
//!
//! Reading `order.customer.address` on a hundred orders costs a hundred
//! queries when every association loads lazily. Prax Hydrate walks the path
//! through the entities already in memory and loads the final association for
//! all of them with one query, so the following reads hit the session's
//! identity map instead of the database.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use prax_hydrate::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), HydrateError> {
//!     let session = Session::new(executor, registry);
//!     let hydrator = AssociationHydrator::new(&session, "Order")?
//!         .with_config(&HydratorConfig::from_file("prax-hydrate.toml")?);
//!
//!     // one query, however many orders and customers
//!     hydrator.hydrate_association(orders.clone(), "customer.address").await?;
//!
//!     // the configured presets for Order
//!     hydrator.hydrate_presets(orders).await?;
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Hydration engine, collaborator traits and supporting types.
pub mod engine {
    pub use prax_hydrate_core::*;
}

/// Logging setup.
pub use prax_hydrate_core::logging;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use prax_hydrate_core::prelude::*;
}

// Re-export key types at the crate root
pub use prax_hydrate_core::{
    AssociationHydrator, AssociationValue, HydrateError, HydrateResult, HydratorConfig, Session,
    Subjects,
};
