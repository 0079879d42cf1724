use crate::artifact::{
    Artifact, ArtifactRecord, ArtifactVersion, ChatMessage, Interaction, Role,
};
use crate::config::CoreConfig;
use crate::context::ContextAssembler;
use crate::error::{AtelierError, Result};
use crate::generate::{GenerationRequest, Generator};
use crate::lookup::TypeLookupCache;
use crate::project::Project;
use crate::resolver::DependencyResolver;
use crate::store::ArtifactStore;
use crate::types::{ArtifactId, ArtifactState, ProjectId};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// An artifact operation's result: the reloaded artifact plus any chat
/// messages the generation backend produced along the way.
#[derive(Debug, Clone)]
pub struct ArtifactOutcome {
    pub record: ArtifactRecord,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub record: ArtifactRecord,
    /// Transitions available from the state just entered.
    pub available: Vec<ArtifactState>,
}

// ---------------------------------------------------------------------------
// AuthoringService
// ---------------------------------------------------------------------------

/// Orchestrates the artifact/project domain operations: create and list
/// projects, create artifacts (with generated first drafts), run interactive
/// revision turns, and apply state transitions.
///
/// Operations perform their persistence writes sequentially with no
/// transactional wrapping; a side effect that completed before a later step
/// failed is not undone.
pub struct AuthoringService {
    store: Arc<dyn ArtifactStore>,
    config: Arc<CoreConfig>,
    generator: Arc<dyn Generator>,
    assembler: ContextAssembler,
}

impl AuthoringService {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        generator: Arc<dyn Generator>,
        config: CoreConfig,
    ) -> Self {
        let config = Arc::new(config);
        let types = Arc::new(TypeLookupCache::new(
            store.clone(),
            Duration::from_secs(config.type_cache_ttl_secs),
        ));
        let resolver = DependencyResolver::new(store.clone(), types, config.clone());
        Self {
            store,
            config,
            generator,
            assembler: ContextAssembler::new(resolver),
        }
    }

    /// The assembler, for callers that only need context construction.
    pub fn assembler(&self) -> &ContextAssembler {
        &self.assembler
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    /// Create a project under the named project type, or under the configured
    /// default when none is given. An explicitly requested type that does not
    /// exist is a hard failure.
    pub async fn create_project(
        &self,
        name: &str,
        owner: &str,
        project_type: Option<&str>,
    ) -> Result<Project> {
        let type_name = project_type.unwrap_or(&self.config.default_project_type);
        let project_type = self
            .store
            .project_type_by_name(type_name)
            .await?
            .ok_or_else(|| AtelierError::ProjectTypeNotFound(type_name.to_string()))?;

        debug!(name, project_type = %project_type.name, "creating project");
        self.store
            .insert_project(Project::new(name, owner, project_type.id))
            .await
    }

    pub async fn list_projects(&self, owner: &str) -> Result<Vec<Project>> {
        self.store.list_projects(owner).await
    }

    // -----------------------------------------------------------------------
    // Artifacts
    // -----------------------------------------------------------------------

    /// Create an artifact and generate its first draft.
    ///
    /// Validation order: the type name must exist at all, its owning phase
    /// must belong to the project's project type, and single-instance types
    /// must not already have an instance in the project. Then the row is
    /// created, context is assembled (failing here, e.g. on a missing
    /// required dependency, leaves the row in place), and the generator is
    /// invoked: commentary becomes interaction 1 and a chat message, content
    /// becomes version 1.
    pub async fn create_artifact(
        &self,
        project_id: ProjectId,
        type_name: &str,
        artifact_name: &str,
    ) -> Result<ArtifactOutcome> {
        let project = self
            .store
            .project(project_id)
            .await?
            .ok_or(AtelierError::ProjectNotFound(project_id))?;
        let project_type = self
            .store
            .project_type(project.project_type_id)
            .await?
            .ok_or_else(|| {
                AtelierError::ProjectTypeNotFound(project.project_type_id.to_string())
            })?;

        // Unknown everywhere → invalid name. Known somewhere but not under
        // this project's type → cross-methodology mismatch.
        let Some(ty) = project_type.artifact_type(type_name).cloned() else {
            let known = self
                .store
                .artifact_types()
                .await?
                .iter()
                .any(|t| t.name == type_name);
            return Err(if known {
                AtelierError::PhaseMismatch {
                    artifact_type: type_name.to_string(),
                    project_type: project_type.name.clone(),
                }
            } else {
                AtelierError::UnknownArtifactType(type_name.to_string())
            });
        };

        let artifact = Artifact::new(project.id, ty.id, artifact_name);
        if !self.config.is_multi_instance(type_name) {
            let existing = self
                .store
                .artifacts_of_type(&ArtifactRecord::bare(artifact.clone()), type_name)
                .await?;
            if !existing.is_empty() {
                return Err(AtelierError::DuplicateArtifact(type_name.to_string()));
            }
        }

        let artifact = self.store.insert_artifact(artifact).await?;
        debug!(artifact = %artifact.id, artifact_type = type_name, "artifact created");

        let record = self.reload(artifact.id).await?;
        let context = self.assembler.get_context(&record, false, None).await?;
        let outcome = self
            .generator
            .generate(GenerationRequest::new(context))
            .await?;

        let mut messages = Vec::new();
        if let Some(commentary) = outcome.commentary {
            self.store
                .insert_interaction(Interaction::new(
                    artifact.id,
                    1,
                    Role::Assistant,
                    commentary.clone(),
                ))
                .await?;
            messages.push(ChatMessage {
                role: Role::Assistant,
                content: commentary,
            });
        }
        if let Some(content) = outcome.content {
            let version = self
                .store
                .insert_version(ArtifactVersion::new(artifact.id, 1, content))
                .await?;
            self.store
                .set_current_version(artifact.id, version.id)
                .await?;
        }

        Ok(ArtifactOutcome {
            record: self.reload(artifact.id).await?,
            messages,
        })
    }

    /// One interactive revision turn on an existing artifact.
    ///
    /// Reads the recent interaction window, appends the user's message at the
    /// next sequence number, assembles update context, and hands both to the
    /// generator with the window reversed into chronological order. New
    /// content becomes the next version (`latest + 1`; concurrent turns on
    /// the same artifact can race on this, and serializing them is the
    /// caller's concern). Commentary is persisted at the next sequence and
    /// surfaced. The artifact lands in InProgress as a side effect.
    pub async fn interact(&self, artifact_id: ArtifactId, message: &str) -> Result<ArtifactOutcome> {
        let record = self.reload(artifact_id).await?;

        let window = self
            .store
            .recent_interactions(artifact_id, self.config.interaction_window)
            .await?;
        let mut next_seq = window.first().map(|i| i.sequence + 1).unwrap_or(1);

        self.store
            .insert_interaction(Interaction::new(artifact_id, next_seq, Role::User, message))
            .await?;
        next_seq += 1;

        let context = self.assembler.get_context(&record, true, Some(message)).await?;
        let history: Vec<Interaction> = window.into_iter().rev().collect();
        let outcome = self
            .generator
            .generate(GenerationRequest::with_history(context, history))
            .await?;

        if let Some(content) = outcome.content {
            let previous = self
                .store
                .latest_version(artifact_id)
                .await?
                .map(|v| v.number)
                .unwrap_or(0);
            let version = self
                .store
                .insert_version(ArtifactVersion::new(artifact_id, previous + 1, content))
                .await?;
            self.store
                .set_current_version(artifact_id, version.id)
                .await?;
        }

        let mut messages = Vec::new();
        if let Some(commentary) = outcome.commentary {
            self.store
                .insert_interaction(Interaction::new(
                    artifact_id,
                    next_seq,
                    Role::Assistant,
                    commentary.clone(),
                ))
                .await?;
            messages.push(ChatMessage {
                role: Role::Assistant,
                content: commentary,
            });
        }

        if record.artifact.state != ArtifactState::InProgress {
            self.store
                .update_artifact_state(artifact_id, ArtifactState::InProgress)
                .await?;
        }

        Ok(ArtifactOutcome {
            record: self.reload(artifact_id).await?,
            messages,
        })
    }

    /// Apply a state by its stable identifier and re-derive what is available
    /// from the state just entered.
    pub async fn transition(
        &self,
        artifact_id: ArtifactId,
        state_id: u16,
    ) -> Result<TransitionOutcome> {
        let record = self.reload(artifact_id).await?;
        let target = ArtifactState::from_id(state_id)
            .ok_or_else(|| AtelierError::InvalidState(state_id.to_string()))?;

        if !record.artifact.state.can_transition_to(target) {
            return Err(AtelierError::InvalidTransition {
                from: record.artifact.state.to_string(),
                to: target.to_string(),
            });
        }

        self.store.update_artifact_state(artifact_id, target).await?;
        Ok(TransitionOutcome {
            record: self.reload(artifact_id).await?,
            available: target.transitions().to_vec(),
        })
    }

    async fn reload(&self, artifact_id: ArtifactId) -> Result<ArtifactRecord> {
        self.store
            .artifact(artifact_id)
            .await?
            .ok_or(AtelierError::ArtifactNotFound(artifact_id))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
