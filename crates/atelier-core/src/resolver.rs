use crate::artifact::ArtifactRecord;
use crate::config::CoreConfig;
use crate::error::{AtelierError, Result};
use crate::lookup::TypeLookupCache;
use crate::store::ArtifactStore;
use crate::types::slugify;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Substituted when an artifact's current version was not materialized by the
/// loading path. Resolution keeps going instead of crashing on a missing
/// eager-load.
pub const CONTENT_NOT_LOADED: &str = "[Content not loaded]";

// ---------------------------------------------------------------------------
// DependencyContent / ResolvedDependencies
// ---------------------------------------------------------------------------

/// Resolved content for one dependency slug: a single document for
/// single-cardinality types, a list for multi-instance types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DependencyContent {
    Single(String),
    Multiple(Vec<String>),
}

/// Slug → content mapping, in dependency-listing order. Ephemeral: computed
/// fresh on every context assembly, never cached or persisted.
pub type ResolvedDependencies = IndexMap<String, DependencyContent>;

// ---------------------------------------------------------------------------
// DependencyResolver
// ---------------------------------------------------------------------------

/// Walks an artifact type's declared dependencies and fetches the current
/// content of each from the store.
///
/// Resolution is single-level: only the direct dependencies of the artifact
/// being assembled are fetched, never their dependencies in turn, so a cycle
/// in the declared type graph cannot cause unbounded work here.
pub struct DependencyResolver {
    store: Arc<dyn ArtifactStore>,
    types: Arc<TypeLookupCache>,
    config: Arc<CoreConfig>,
}

struct EnrichedDependency {
    name: String,
    slug: String,
    multiple: bool,
    required: bool,
}

impl DependencyResolver {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        types: Arc<TypeLookupCache>,
        config: Arc<CoreConfig>,
    ) -> Self {
        Self {
            store,
            types,
            config,
        }
    }

    /// Resolve the dependency context for `record`.
    ///
    /// Fails fast: the first required dependency with no matching artifact
    /// aborts resolution with [`AtelierError::MissingRequiredDependency`],
    /// and no store queries are issued for the dependencies after it. Store
    /// failures propagate unchanged.
    pub async fn resolve(&self, record: &ArtifactRecord) -> Result<ResolvedDependencies> {
        // Without type context there is nothing to resolve. Some construction
        // paths legitimately skip relation loading, so this is a soft case.
        let (Some(_project_type), Some(artifact_type)) =
            (record.project_type.as_ref(), record.artifact_type.as_ref())
        else {
            warn!(
                artifact = %record.artifact.id,
                "artifact relations not loaded; resolving empty dependency set"
            );
            return Ok(ResolvedDependencies::new());
        };

        let links = self.store.type_dependencies(&artifact_type.name).await?;

        let mut enriched = Vec::with_capacity(links.len());
        for link in links {
            let slug = match self.types.artifact_type_info(&link.ty.name).await? {
                Some(info) => info.slug,
                None => slugify(&link.ty.name),
            };
            enriched.push(EnrichedDependency {
                slug,
                multiple: self.config.is_multi_instance(&link.ty.name),
                required: link.required,
                name: link.ty.name,
            });
        }

        let mut resolved = ResolvedDependencies::new();
        for dep in enriched {
            let matches = self.store.artifacts_of_type(record, &dep.name).await?;

            if dep.required && matches.is_empty() {
                return Err(AtelierError::MissingRequiredDependency {
                    artifact_type: dep.name,
                });
            }

            // Artifacts with no version at all carry nothing usable; drop
            // them silently.
            let usable: Vec<&ArtifactRecord> = matches.iter().filter(|r| r.has_content()).collect();

            if dep.multiple {
                let contents: Vec<String> = usable.iter().map(|r| self.content_of(r)).collect();
                if !contents.is_empty() {
                    resolved.insert(dep.slug, DependencyContent::Multiple(contents));
                }
            } else if let Some(first) = usable.first() {
                resolved.insert(dep.slug, DependencyContent::Single(self.content_of(first)));
            }
        }

        Ok(resolved)
    }

    /// Current-version content of a matched artifact. Only the version the
    /// `current` pointer references is ever surfaced.
    fn content_of(&self, record: &ArtifactRecord) -> String {
        match record.current_version.as_ref() {
            Some(version) => version.content.clone(),
            None => {
                warn!(
                    artifact = %record.artifact.id,
                    "current version not materialized; substituting placeholder"
                );
                CONTENT_NOT_LOADED.to_string()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
