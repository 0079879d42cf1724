pub mod memory;

use crate::artifact::{Artifact, ArtifactRecord, ArtifactTypeDef, ArtifactVersion, Interaction};
use crate::error::Result;
use crate::project::{Project, ProjectType};
use crate::types::{ArtifactId, ArtifactState, ProjectId, ProjectTypeId, VersionId};
use async_trait::async_trait;

// ---------------------------------------------------------------------------
// DependencyLink
// ---------------------------------------------------------------------------

/// One resolved row of an artifact type's dependency listing: the dependency
/// type itself plus the per-relationship required flag.
#[derive(Debug, Clone)]
pub struct DependencyLink {
    pub ty: ArtifactTypeDef,
    pub required: bool,
}

// ---------------------------------------------------------------------------
// ArtifactStore
// ---------------------------------------------------------------------------

/// Persistence abstraction the core runs against. Implementations own their
/// storage details; unexpected backend failures are wrapped in
/// [`AtelierError::Store`](crate::error::AtelierError::Store) and propagate
/// through the core unchanged.
///
/// Listing order is store-defined and caller-observable: dependency
/// resolution preserves whatever order `type_dependencies` and
/// `artifacts_of_type` return.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    // -- projects --

    async fn insert_project(&self, project: Project) -> Result<Project>;

    async fn project(&self, id: ProjectId) -> Result<Option<Project>>;

    async fn list_projects(&self, owner: &str) -> Result<Vec<Project>>;

    // -- project types --

    async fn project_type(&self, id: ProjectTypeId) -> Result<Option<ProjectType>>;

    async fn project_type_by_name(&self, name: &str) -> Result<Option<ProjectType>>;

    // -- artifact types --

    /// Every artifact type known to the system, across all project types.
    /// The type-lookup cache loads this in one shot.
    async fn artifact_types(&self) -> Result<Vec<ArtifactTypeDef>>;

    /// The declared dependency types for the named artifact type. Unknown
    /// names yield an empty listing, not an error.
    async fn type_dependencies(&self, artifact_type_name: &str) -> Result<Vec<DependencyLink>>;

    // -- artifacts --

    async fn insert_artifact(&self, artifact: Artifact) -> Result<Artifact>;

    /// Load an artifact with its relations (project, project type, artifact
    /// type, phase, current version) materialized.
    async fn artifact(&self, id: ArtifactId) -> Result<Option<ArtifactRecord>>;

    /// Artifacts of the named type within the given record's project, in
    /// store order.
    async fn artifacts_of_type(
        &self,
        record: &ArtifactRecord,
        artifact_type_name: &str,
    ) -> Result<Vec<ArtifactRecord>>;

    async fn update_artifact_state(&self, id: ArtifactId, state: ArtifactState) -> Result<()>;

    // -- versions --

    async fn latest_version(&self, artifact_id: ArtifactId) -> Result<Option<ArtifactVersion>>;

    async fn insert_version(&self, version: ArtifactVersion) -> Result<ArtifactVersion>;

    /// Point the artifact's current-version reference at `version_id`.
    /// A separate write from [`insert_version`](Self::insert_version); the
    /// core performs the two sequentially with no transactional wrapping.
    async fn set_current_version(&self, id: ArtifactId, version_id: VersionId) -> Result<()>;

    // -- interactions --

    /// The most recent `limit` interactions for an artifact, newest first.
    async fn recent_interactions(
        &self,
        artifact_id: ArtifactId,
        limit: usize,
    ) -> Result<Vec<Interaction>>;

    async fn insert_interaction(&self, interaction: Interaction) -> Result<Interaction>;
}
