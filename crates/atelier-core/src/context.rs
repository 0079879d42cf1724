use crate::artifact::ArtifactRecord;
use crate::error::Result;
use crate::resolver::{DependencyResolver, ResolvedDependencies};
use crate::types::{ArtifactId, ArtifactTypeId, ProjectTypeId};
use serde::Serialize;

pub const UNKNOWN_TYPE: &str = "Unknown Type";
pub const UNKNOWN_PHASE: &str = "Unknown Phase";

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// The assembled key-value bag handed to the prompt-rendering collaborator.
///
/// Resolved dependencies are flattened to the top level on serialization, so
/// templates address each one by its slug (`vision`, `use_cases`, ...) with
/// no indirection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Context {
    pub project: ProjectContext,
    pub artifact: ArtifactContext,
    pub is_update: bool,
    pub user_message: Option<String>,
    #[serde(flatten)]
    pub dependencies: ResolvedDependencies,
}

impl Context {
    /// Resolved content for a dependency slug, if present.
    pub fn dependency(&self, slug: &str) -> Option<&crate::resolver::DependencyContent> {
        self.dependencies.get(slug)
    }
}

/// Best-effort project block: fields are absent rather than erroneous when
/// relations were not loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_type_id: Option<ProjectTypeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_type_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactContext {
    pub artifact_id: ArtifactId,
    pub artifact_type_id: ArtifactTypeId,
    pub artifact_type_name: String,
    pub phase_name: String,
    /// Present only on the update path: the artifact's current name and
    /// prior content (null when no version exists yet). A flattened `None`
    /// emits no fields at all.
    #[serde(flatten)]
    pub revision: Option<RevisionContext>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevisionContext {
    pub name: String,
    pub content: Option<String>,
}

// ---------------------------------------------------------------------------
// ContextAssembler
// ---------------------------------------------------------------------------

/// Builds the full [`Context`] for generating or revising an artifact:
/// project/artifact identification, the update flag, the user's message, and
/// the resolved dependency content merged flat.
pub struct ContextAssembler {
    resolver: DependencyResolver,
}

impl ContextAssembler {
    pub fn new(resolver: DependencyResolver) -> Self {
        Self { resolver }
    }

    /// Assemble the context for `record`. `is_update` is false when
    /// generating a brand-new artifact's first content, true when revising.
    /// A resolver failure aborts assembly unchanged; there is no
    /// partial-context fallback.
    pub async fn get_context(
        &self,
        record: &ArtifactRecord,
        is_update: bool,
        user_message: Option<&str>,
    ) -> Result<Context> {
        let project = ProjectContext {
            name: record.project.as_ref().map(|p| p.name.clone()),
            project_type_id: record
                .project
                .as_ref()
                .map(|p| p.project_type_id)
                .or_else(|| record.project_type.as_ref().map(|pt| pt.id)),
            project_type_name: record.project_type.as_ref().map(|pt| pt.name.clone()),
        };

        let artifact = ArtifactContext {
            artifact_id: record.artifact.id,
            artifact_type_id: record.artifact.artifact_type_id,
            artifact_type_name: record
                .artifact_type
                .as_ref()
                .map(|t| t.name.clone())
                .unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
            phase_name: record
                .phase
                .as_ref()
                .map(|p| p.name.clone())
                .unwrap_or_else(|| UNKNOWN_PHASE.to_string()),
            revision: is_update.then(|| RevisionContext {
                name: record.artifact.name.clone(),
                content: record.current_version.as_ref().map(|v| v.content.clone()),
            }),
        };

        let dependencies = self.resolver.resolve(record).await?;

        Ok(Context {
            project,
            artifact,
            is_update,
            user_message: user_message.map(str::to_string),
            dependencies,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{Artifact, ArtifactRecord, ArtifactVersion};
    use crate::config::CoreConfig;
    use crate::lookup::TypeLookupCache;
    use crate::project::Project;
    use crate::store::memory::MemoryStore;
    use crate::store::ArtifactStore;
    use crate::types::ArtifactId;
    use std::sync::Arc;
    use std::time::Duration;

    struct Fixture {
        store: Arc<MemoryStore>,
        project: Project,
        assembler: ContextAssembler,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::seeded());
        let project_type = store
            .project_type_by_name("Software Engineering")
            .await
            .unwrap()
            .unwrap();
        let project = store
            .insert_project(Project::new("Payments", "alice", project_type.id))
            .await
            .unwrap();

        let config = Arc::new(CoreConfig::default());
        let types = Arc::new(TypeLookupCache::new(
            store.clone() as Arc<dyn ArtifactStore>,
            Duration::from_secs(config.type_cache_ttl_secs),
        ));
        let resolver = DependencyResolver::new(store.clone(), types, config);

        Fixture {
            store,
            project,
            assembler: ContextAssembler::new(resolver),
        }
    }

    impl Fixture {
        async fn add_vision(&self) -> Artifact {
            let pt = self
                .store
                .project_type(self.project.project_type_id)
                .await
                .unwrap()
                .unwrap();
            let ty = pt.artifact_type("Vision Document").unwrap().clone();
            self.store
                .insert_artifact(Artifact::new(self.project.id, ty.id, "Vision"))
                .await
                .unwrap()
        }

        async fn record(&self, id: ArtifactId) -> ArtifactRecord {
            self.store.artifact(id).await.unwrap().unwrap()
        }
    }

    #[tokio::test]
    async fn create_context_has_no_content_field() {
        let fx = fixture().await;
        let vision = fx.add_vision().await;
        let record = fx.record(vision.id).await;

        let ctx = fx.assembler.get_context(&record, false, None).await.unwrap();
        assert!(!ctx.is_update);
        assert!(ctx.user_message.is_none());
        assert_eq!(ctx.artifact.artifact_type_name, "Vision Document");
        assert_eq!(ctx.artifact.phase_name, "Requirements");
        assert!(ctx.artifact.revision.is_none());

        let value = serde_json::to_value(&ctx).unwrap();
        assert!(value["artifact"].get("content").is_none());
        assert!(value["artifact"].get("name").is_none());
    }

    #[tokio::test]
    async fn update_context_exposes_name_and_content() {
        let fx = fixture().await;
        let vision = fx.add_vision().await;
        let version = fx
            .store
            .insert_version(ArtifactVersion::new(vision.id, 1, "Draft"))
            .await
            .unwrap();
        fx.store
            .set_current_version(vision.id, version.id)
            .await
            .unwrap();
        let record = fx.record(vision.id).await;

        let ctx = fx
            .assembler
            .get_context(&record, true, Some("tighten the scope"))
            .await
            .unwrap();
        assert!(ctx.is_update);
        assert_eq!(ctx.user_message.as_deref(), Some("tighten the scope"));

        let revision = ctx.artifact.revision.as_ref().unwrap();
        assert_eq!(revision.name, "Vision");
        assert_eq!(revision.content.as_deref(), Some("Draft"));

        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(value["artifact"]["content"], "Draft");
        assert_eq!(value["artifact"]["name"], "Vision");
    }

    #[tokio::test]
    async fn update_context_with_no_version_has_null_content() {
        let fx = fixture().await;
        let vision = fx.add_vision().await;
        let record = fx.record(vision.id).await;

        let ctx = fx.assembler.get_context(&record, true, None).await.unwrap();
        let revision = ctx.artifact.revision.as_ref().unwrap();
        assert!(revision.content.is_none());

        // The key is present with a null value, not absent.
        let value = serde_json::to_value(&ctx).unwrap();
        assert!(value["artifact"]["content"].is_null());
        assert!(value["artifact"].get("content").is_some());
    }

    #[tokio::test]
    async fn dependencies_merge_flat_at_top_level() {
        let fx = fixture().await;
        let vision = fx.add_vision().await;
        let version = fx
            .store
            .insert_version(ArtifactVersion::new(vision.id, 1, "V1 content"))
            .await
            .unwrap();
        fx.store
            .set_current_version(vision.id, version.id)
            .await
            .unwrap();

        let pt = fx
            .store
            .project_type(fx.project.project_type_id)
            .await
            .unwrap()
            .unwrap();
        let fr_ty = pt.artifact_type("Functional Requirements").unwrap().clone();
        let fr = fx
            .store
            .insert_artifact(Artifact::new(fx.project.id, fr_ty.id, "FR"))
            .await
            .unwrap();
        let record = fx.record(fr.id).await;

        let ctx = fx.assembler.get_context(&record, false, None).await.unwrap();
        let value = serde_json::to_value(&ctx).unwrap();
        // Top-level key, not nested under "dependencies".
        assert_eq!(value["vision"], "V1 content");
        assert!(value.get("dependencies").is_none());
    }

    #[tokio::test]
    async fn missing_relations_fall_back_to_unknown_labels() {
        let fx = fixture().await;
        let vision = fx.add_vision().await;
        let record = ArtifactRecord::bare(fx.record(vision.id).await.artifact);

        let ctx = fx.assembler.get_context(&record, false, None).await.unwrap();
        assert_eq!(ctx.artifact.artifact_type_name, UNKNOWN_TYPE);
        assert_eq!(ctx.artifact.phase_name, UNKNOWN_PHASE);
        assert!(ctx.project.name.is_none());
        assert!(ctx.dependencies.is_empty());

        let value = serde_json::to_value(&ctx).unwrap();
        assert!(value["project"].get("name").is_none());
    }

    #[tokio::test]
    async fn assembly_is_idempotent() {
        let fx = fixture().await;
        let vision = fx.add_vision().await;
        let record = fx.record(vision.id).await;

        let a = fx.assembler.get_context(&record, false, None).await.unwrap();
        let b = fx.assembler.get_context(&record, false, None).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_value(&a).unwrap(),
            serde_json::to_value(&b).unwrap()
        );
    }

    #[tokio::test]
    async fn resolver_failure_aborts_assembly() {
        let fx = fixture().await;
        let pt = fx
            .store
            .project_type(fx.project.project_type_id)
            .await
            .unwrap()
            .unwrap();
        let fr_ty = pt.artifact_type("Functional Requirements").unwrap().clone();
        let fr = fx
            .store
            .insert_artifact(Artifact::new(fx.project.id, fr_ty.id, "FR"))
            .await
            .unwrap();
        let record = fx.record(fr.id).await;

        let err = fx
            .assembler
            .get_context(&record, false, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Vision Document missing"));
    }
}
