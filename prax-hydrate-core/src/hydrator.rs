//! Batched association hydration.
//!
//! Reading an association on N loaded entities one by one costs N queries.
//! [`AssociationHydrator`] loads it for all of them with one query: it walks
//! the association path through the in-memory object graph, deduplicates the
//! entities it reaches, and issues a single [`BatchFetch`] joining the final
//! association. The fetch result is not returned; the executor materializes
//! the joined rows into the session's identity map, so later reads of the
//! association are served from there.
//!
//! ```rust,ignore
//! let hydrator = AssociationHydrator::new(&session, "Order")?;
//!
//! // one query for the customers' addresses, whatever the number of orders
//! hydrator.hydrate_association(orders.clone(), "customer.address").await?;
//!
//! // one query per path
//! hydrator
//!     .hydrate_associations(orders, ["items.product", "customer"])
//!     .await?;
//! ```

use std::sync::Arc;
use std::time::Instant;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace, warn};

use crate::config::HydratorConfig;
use crate::error::HydrateResult;
use crate::fetch::BatchFetch;
use crate::identity::IdentityKey;
use crate::metadata::ModelMetadata;
use crate::relations::{AssociationPath, DEFAULT_DELIMITER};
use crate::session::{Session, SessionPropertyReader};
use crate::subject::Subjects;
use crate::traits::{EntityRef, Model, PropertyReader};

/// Loads association paths for many entities with one query per path.
///
/// A hydrator is bound to a session and to the root model its subjects
/// belong to. It holds no per-call state and can be reused.
pub struct AssociationHydrator<'s> {
    session: &'s Session,
    root: Arc<ModelMetadata>,
    reader: Arc<dyn PropertyReader>,
    delimiter: char,
    log_queries: bool,
    slow_fetch_threshold_ms: u64,
    presets: IndexMap<String, Vec<String>>,
}

impl<'s> AssociationHydrator<'s> {
    /// Create a hydrator for subjects of `root_model`.
    ///
    /// Fails with a metadata error if the model is unknown.
    pub fn new(session: &'s Session, root_model: &str) -> HydrateResult<Self> {
        let root = session.metadata().metadata_for(root_model)?;
        Ok(Self::with_root(session, root))
    }

    /// Create a hydrator for subjects of model `M`.
    pub fn for_model<M: Model>(session: &'s Session) -> HydrateResult<Self> {
        Self::new(session, M::MODEL_NAME)
    }

    /// Create a hydrator from already resolved root metadata.
    pub fn with_root(session: &'s Session, root: Arc<ModelMetadata>) -> Self {
        let defaults = HydratorConfig::default();
        Self {
            session,
            root,
            reader: Arc::new(SessionPropertyReader),
            delimiter: DEFAULT_DELIMITER,
            log_queries: defaults.debug.log_queries,
            slow_fetch_threshold_ms: defaults.debug.slow_query_threshold,
            presets: IndexMap::new(),
        }
    }

    /// Replace the property reader used during traversal.
    pub fn with_reader(mut self, reader: impl PropertyReader + 'static) -> Self {
        self.reader = Arc::new(reader);
        self
    }

    /// Apply delimiter, logging and preset settings.
    pub fn with_config(mut self, config: &HydratorConfig) -> Self {
        self.delimiter = config.hydration.delimiter;
        self.log_queries = config.debug.log_queries;
        self.slow_fetch_threshold_ms = config.debug.slow_query_threshold;
        self.presets = config.presets.clone();
        self
    }

    /// Metadata of the root model.
    pub fn root(&self) -> &ModelMetadata {
        &self.root
    }

    /// Hydrate every path, each one from the original subjects.
    ///
    /// Paths are processed in iteration order and share no intermediate
    /// state. The first error aborts the remaining paths.
    pub async fn hydrate_associations<I, P>(
        &self,
        subjects: impl Into<Subjects>,
        paths: I,
    ) -> HydrateResult<()>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let subjects = subjects.into().into_entities();
        for path in paths {
            self.hydrate_entities(subjects.clone(), path.as_ref()).await?;
        }
        Ok(())
    }

    /// Hydrate the final association of `path` on everything reachable from
    /// `subjects`, with at most one query.
    pub async fn hydrate_association(
        &self,
        subjects: impl Into<Subjects>,
        path: &str,
    ) -> HydrateResult<()> {
        self.hydrate_entities(subjects.into().into_entities(), path).await
    }

    /// Hydrate the paths configured as presets for the root model.
    pub async fn hydrate_presets(&self, subjects: impl Into<Subjects>) -> HydrateResult<()> {
        match self.presets.get(self.root.name.as_str()) {
            Some(paths) => self.hydrate_associations(subjects, paths).await,
            None => {
                trace!(model = %self.root.name, "No hydration preset configured");
                Ok(())
            }
        }
    }

    async fn hydrate_entities(&self, subjects: Vec<EntityRef>, path: &str) -> HydrateResult<()> {
        if subjects.is_empty() {
            trace!(path, "No subjects to hydrate");
            return Ok(());
        }

        let path = AssociationPath::parse_with(path, self.delimiter)?;
        let mut current = Arc::clone(&self.root);
        let mut working = subjects;

        for segment in path.traversal() {
            let mut next = Vec::with_capacity(working.len());
            for entity in &working {
                let value = self.reader.read(self.session, entity, segment).await?;
                // null associations are dropped: there is nothing to traverse
                next.extend(value.into_entities());
            }

            if next.is_empty() {
                debug!(path = %path, segment = %segment, "Traversal reached no entity, skipping fetch");
                return Ok(());
            }

            current = self.session.metadata().resolve(&current, segment)?;
            trace!(segment = %segment, model = %current.name, reached = next.len(), "Traversed association");
            working = next;
        }

        let keys = self.unique_keys(&working)?;
        let join = current.relation(path.final_association())?.clone();
        let fetch = BatchFetch::new(&current, join, keys);

        debug!(
            path = %path,
            model = %fetch.model,
            association = fetch.association(),
            subjects = working.len(),
            keys = fetch.key_count(),
            "Hydrating association"
        );
        self.execute(&fetch).await
    }

    /// Identity keys of `entities`, deduplicated in first-seen order.
    fn unique_keys(&self, entities: &[EntityRef]) -> HydrateResult<Vec<IdentityKey>> {
        let mut keys = IndexSet::with_capacity(entities.len());
        for entity in entities {
            keys.insert(self.session.identity_key_of(entity.as_ref())?);
        }
        Ok(keys.into_iter().collect())
    }

    async fn execute(&self, fetch: &BatchFetch) -> HydrateResult<()> {
        if self.log_queries {
            let (sql, params) = fetch.to_sql();
            debug!(sql = %sql, params = params.len(), "Issuing batched fetch");
        }

        let started = Instant::now();
        let rows = self
            .session
            .executor()
            .fetch_with_join(fetch, self.session.identity_map())
            .await?;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        if elapsed_ms >= self.slow_fetch_threshold_ms {
            warn!(
                model = %fetch.model,
                association = fetch.association(),
                elapsed_ms,
                "Slow batched fetch"
            );
        }
        trace!(rows, elapsed_ms, "Batched fetch completed");
        Ok(())
    }
}

impl std::fmt::Debug for AssociationHydrator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssociationHydrator")
            .field("root", &self.root.name)
            .field("delimiter", &self.delimiter)
            .finish_non_exhaustive()
    }
}
