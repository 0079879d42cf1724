use crate::artifact::{Artifact, ArtifactRecord, ArtifactTypeDef, ArtifactVersion, Interaction};
use crate::catalog;
use crate::error::Result;
use crate::project::{Project, ProjectType};
use crate::store::{ArtifactStore, DependencyLink};
use crate::types::{ArtifactId, ArtifactState, ArtifactTypeId, ProjectId, ProjectTypeId, VersionId};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-memory [`ArtifactStore`]. The reference implementation the test suite
/// runs against; listings come back in insertion order, which stands in for
/// a relational store's creation-timestamp ordering.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    project_types: Vec<ProjectType>,
    projects: Vec<Project>,
    artifacts: Vec<Artifact>,
    versions: Vec<ArtifactVersion>,
    interactions: Vec<Interaction>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with the built-in Software Engineering methodology.
    pub fn seeded() -> Self {
        Self {
            inner: RwLock::new(Inner {
                project_types: vec![catalog::software_engineering()],
                ..Inner::default()
            }),
        }
    }

    pub async fn seed_project_type(&self, project_type: ProjectType) {
        self.inner.write().await.project_types.push(project_type);
    }
}

impl Inner {
    fn type_by_name(&self, name: &str) -> Option<(&ProjectType, &ArtifactTypeDef)> {
        self.project_types
            .iter()
            .find_map(|pt| pt.artifact_type(name).map(|t| (pt, t)))
    }

    fn type_by_id(&self, id: ArtifactTypeId) -> Option<(&ProjectType, &ArtifactTypeDef)> {
        self.project_types.iter().find_map(|pt| {
            pt.phases
                .iter()
                .flat_map(|p| p.artifact_types.iter())
                .find(|t| t.id == id)
                .map(|t| (pt, t))
        })
    }

    fn record(&self, artifact: &Artifact) -> ArtifactRecord {
        let project = self
            .projects
            .iter()
            .find(|p| p.id == artifact.project_id)
            .cloned();
        let typed = self.type_by_id(artifact.artifact_type_id);
        let project_type = typed.map(|(pt, _)| pt.clone());
        let artifact_type = typed.map(|(_, t)| t.clone());
        let phase = typed.and_then(|(pt, t)| pt.phase(t.phase_id)).cloned();
        let current_version = artifact.current_version_id.and_then(|vid| {
            self.versions.iter().find(|v| v.id == vid).cloned()
        });

        ArtifactRecord {
            artifact: artifact.clone(),
            project,
            project_type,
            artifact_type,
            phase,
            current_version,
        }
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn insert_project(&self, project: Project) -> Result<Project> {
        self.inner.write().await.projects.push(project.clone());
        Ok(project)
    }

    async fn project(&self, id: ProjectId) -> Result<Option<Project>> {
        let inner = self.inner.read().await;
        Ok(inner.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects(&self, owner: &str) -> Result<Vec<Project>> {
        let inner = self.inner.read().await;
        Ok(inner
            .projects
            .iter()
            .filter(|p| p.owner == owner)
            .cloned()
            .collect())
    }

    async fn project_type(&self, id: ProjectTypeId) -> Result<Option<ProjectType>> {
        let inner = self.inner.read().await;
        Ok(inner.project_types.iter().find(|pt| pt.id == id).cloned())
    }

    async fn project_type_by_name(&self, name: &str) -> Result<Option<ProjectType>> {
        let inner = self.inner.read().await;
        Ok(inner.project_types.iter().find(|pt| pt.name == name).cloned())
    }

    async fn artifact_types(&self) -> Result<Vec<ArtifactTypeDef>> {
        let inner = self.inner.read().await;
        Ok(inner
            .project_types
            .iter()
            .flat_map(|pt| pt.phases.iter())
            .flat_map(|p| p.artifact_types.iter())
            .cloned()
            .collect())
    }

    async fn type_dependencies(&self, artifact_type_name: &str) -> Result<Vec<DependencyLink>> {
        let inner = self.inner.read().await;
        let Some((_, ty)) = inner.type_by_name(artifact_type_name) else {
            return Ok(Vec::new());
        };
        Ok(ty
            .depends_on
            .iter()
            .filter_map(|decl| {
                inner
                    .type_by_name(&decl.artifact_type)
                    .map(|(_, dep_ty)| DependencyLink {
                        ty: dep_ty.clone(),
                        required: decl.required,
                    })
            })
            .collect())
    }

    async fn insert_artifact(&self, artifact: Artifact) -> Result<Artifact> {
        self.inner.write().await.artifacts.push(artifact.clone());
        Ok(artifact)
    }

    async fn artifact(&self, id: ArtifactId) -> Result<Option<ArtifactRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .artifacts
            .iter()
            .find(|a| a.id == id)
            .map(|a| inner.record(a)))
    }

    async fn artifacts_of_type(
        &self,
        record: &ArtifactRecord,
        artifact_type_name: &str,
    ) -> Result<Vec<ArtifactRecord>> {
        let inner = self.inner.read().await;
        let Some((_, ty)) = inner.type_by_name(artifact_type_name) else {
            return Ok(Vec::new());
        };
        let type_id = ty.id;
        Ok(inner
            .artifacts
            .iter()
            .filter(|a| a.project_id == record.artifact.project_id && a.artifact_type_id == type_id)
            .map(|a| inner.record(a))
            .collect())
    }

    async fn update_artifact_state(&self, id: ArtifactId, state: ArtifactState) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(artifact) = inner.artifacts.iter_mut().find(|a| a.id == id) {
            artifact.state = state;
            artifact.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn latest_version(&self, artifact_id: ArtifactId) -> Result<Option<ArtifactVersion>> {
        let inner = self.inner.read().await;
        Ok(inner
            .versions
            .iter()
            .filter(|v| v.artifact_id == artifact_id)
            .max_by_key(|v| v.number)
            .cloned())
    }

    async fn insert_version(&self, version: ArtifactVersion) -> Result<ArtifactVersion> {
        self.inner.write().await.versions.push(version.clone());
        Ok(version)
    }

    async fn set_current_version(&self, id: ArtifactId, version_id: VersionId) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(artifact) = inner.artifacts.iter_mut().find(|a| a.id == id) {
            artifact.current_version_id = Some(version_id);
            artifact.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn recent_interactions(
        &self,
        artifact_id: ArtifactId,
        limit: usize,
    ) -> Result<Vec<Interaction>> {
        let inner = self.inner.read().await;
        let mut recent: Vec<Interaction> = inner
            .interactions
            .iter()
            .filter(|i| i.artifact_id == artifact_id)
            .cloned()
            .collect();
        recent.sort_by(|a, b| b.sequence.cmp(&a.sequence));
        recent.truncate(limit);
        Ok(recent)
    }

    async fn insert_interaction(&self, interaction: Interaction) -> Result<Interaction> {
        self.inner
            .write()
            .await
            .interactions
            .push(interaction.clone());
        Ok(interaction)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::Artifact;
    use crate::project::Project;

    async fn seeded_with_project() -> (MemoryStore, Project) {
        let store = MemoryStore::seeded();
        let pt = store
            .project_type_by_name("Software Engineering")
            .await
            .unwrap()
            .unwrap();
        let project = store
            .insert_project(Project::new("Payments", "alice", pt.id))
            .await
            .unwrap();
        (store, project)
    }

    #[tokio::test]
    async fn seeded_store_lists_all_types() {
        let store = MemoryStore::seeded();
        let types = store.artifact_types().await.unwrap();
        assert_eq!(types.len(), 6);
        assert!(types.iter().any(|t| t.name == "Vision Document"));
    }

    #[tokio::test]
    async fn type_dependencies_resolve_declared_links() {
        let store = MemoryStore::seeded();
        let deps = store.type_dependencies("C4 Context").await.unwrap();
        let names: Vec<&str> = deps.iter().map(|d| d.ty.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Vision Document", "Functional Requirements", "Use Cases"]
        );
        assert!(deps.iter().all(|d| d.required));
    }

    #[tokio::test]
    async fn type_dependencies_unknown_type_is_empty() {
        let store = MemoryStore::seeded();
        assert!(store.type_dependencies("Nope").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn artifact_record_materializes_relations() {
        let (store, project) = seeded_with_project().await;
        let vision = store
            .project_type(project.project_type_id)
            .await
            .unwrap()
            .unwrap()
            .artifact_type("Vision Document")
            .unwrap()
            .clone();

        let artifact = store
            .insert_artifact(Artifact::new(project.id, vision.id, "Vision"))
            .await
            .unwrap();
        let record = store.artifact(artifact.id).await.unwrap().unwrap();

        assert_eq!(record.project.as_ref().unwrap().name, "Payments");
        assert_eq!(
            record.project_type.as_ref().unwrap().name,
            "Software Engineering"
        );
        assert_eq!(
            record.artifact_type.as_ref().unwrap().name,
            "Vision Document"
        );
        assert_eq!(record.phase.as_ref().unwrap().name, "Requirements");
        assert!(record.current_version.is_none());
    }

    #[tokio::test]
    async fn artifacts_of_type_scoped_to_project() {
        let (store, project) = seeded_with_project().await;
        let pt = store
            .project_type(project.project_type_id)
            .await
            .unwrap()
            .unwrap();
        let use_cases = pt.artifact_type("Use Cases").unwrap().clone();

        let a1 = store
            .insert_artifact(Artifact::new(project.id, use_cases.id, "Login"))
            .await
            .unwrap();
        let a2 = store
            .insert_artifact(Artifact::new(project.id, use_cases.id, "Registration"))
            .await
            .unwrap();

        // An artifact in a different project must not leak in.
        let other = store
            .insert_project(Project::new("Other", "bob", pt.id))
            .await
            .unwrap();
        store
            .insert_artifact(Artifact::new(other.id, use_cases.id, "Stray"))
            .await
            .unwrap();

        let anchor = store.artifact(a1.id).await.unwrap().unwrap();
        let found = store
            .artifacts_of_type(&anchor, "Use Cases")
            .await
            .unwrap();
        let ids: Vec<ArtifactId> = found.iter().map(|r| r.artifact.id).collect();
        assert_eq!(ids, vec![a1.id, a2.id]);
    }

    #[tokio::test]
    async fn version_bookkeeping() {
        let (store, project) = seeded_with_project().await;
        let pt = store
            .project_type(project.project_type_id)
            .await
            .unwrap()
            .unwrap();
        let vision = pt.artifact_type("Vision Document").unwrap().clone();
        let artifact = store
            .insert_artifact(Artifact::new(project.id, vision.id, "Vision"))
            .await
            .unwrap();

        assert!(store.latest_version(artifact.id).await.unwrap().is_none());

        let v1 = store
            .insert_version(ArtifactVersion::new(artifact.id, 1, "first"))
            .await
            .unwrap();
        store.set_current_version(artifact.id, v1.id).await.unwrap();
        let v2 = store
            .insert_version(ArtifactVersion::new(artifact.id, 2, "second"))
            .await
            .unwrap();
        store.set_current_version(artifact.id, v2.id).await.unwrap();

        assert_eq!(store.latest_version(artifact.id).await.unwrap().unwrap().number, 2);
        let record = store.artifact(artifact.id).await.unwrap().unwrap();
        assert_eq!(record.current_version.as_ref().unwrap().content, "second");
    }

    #[tokio::test]
    async fn recent_interactions_newest_first_bounded() {
        let (store, project) = seeded_with_project().await;
        let pt = store
            .project_type(project.project_type_id)
            .await
            .unwrap()
            .unwrap();
        let vision = pt.artifact_type("Vision Document").unwrap().clone();
        let artifact = store
            .insert_artifact(Artifact::new(project.id, vision.id, "Vision"))
            .await
            .unwrap();

        for (seq, msg) in [(1, "a"), (2, "b"), (3, "c"), (4, "d")] {
            store
                .insert_interaction(Interaction::new(
                    artifact.id,
                    seq,
                    crate::artifact::Role::User,
                    msg,
                ))
                .await
                .unwrap();
        }

        let recent = store.recent_interactions(artifact.id, 3).await.unwrap();
        let seqs: Vec<u32> = recent.iter().map(|i| i.sequence).collect();
        assert_eq!(seqs, vec![4, 3, 2]);
    }
}
