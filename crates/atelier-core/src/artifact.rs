use crate::project::{LifecyclePhase, Project, ProjectType};
use crate::types::{slugify, ArtifactId, ArtifactState, ArtifactTypeId, InteractionId, PhaseId, ProjectId, VersionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// DependencyDecl
// ---------------------------------------------------------------------------

/// A declared edge in the artifact-type dependency graph: this type needs
/// context from `artifact_type` before it can be generated.
///
/// `required` is per-relationship data. The built-in catalog declares every
/// edge required; optional edges are skipped when no matching artifact exists
/// instead of failing resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyDecl {
    pub artifact_type: String,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl DependencyDecl {
    pub fn required(artifact_type: impl Into<String>) -> Self {
        Self {
            artifact_type: artifact_type.into(),
            required: true,
        }
    }

    pub fn optional(artifact_type: impl Into<String>) -> Self {
        Self {
            artifact_type: artifact_type.into(),
            required: false,
        }
    }
}

// ---------------------------------------------------------------------------
// ArtifactTypeDef
// ---------------------------------------------------------------------------

/// The schema/category of an artifact ("Vision Document", "Use Cases"),
/// scoped to a lifecycle phase. `name` is the unique system-wide lookup key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactTypeDef {
    pub id: ArtifactTypeId,
    pub name: String,
    pub slug: String,
    pub syntax: ContentSyntax,
    pub phase_id: PhaseId,
    #[serde(default)]
    pub depends_on: Vec<DependencyDecl>,
}

impl ArtifactTypeDef {
    pub fn new(
        name: impl Into<String>,
        syntax: ContentSyntax,
        phase_id: PhaseId,
        depends_on: Vec<DependencyDecl>,
    ) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self {
            id: ArtifactTypeId::new(),
            name,
            slug,
            syntax,
            phase_id,
            depends_on,
        }
    }

    /// Override the derived slug. Some catalog entries use a shorter key
    /// than their display name would synthesize ("vision", not
    /// "vision_document").
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentSyntax {
    Markdown,
    Mermaid,
    PlainText,
}

impl fmt::Display for ContentSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ContentSyntax::Markdown => "markdown",
            ContentSyntax::Mermaid => "mermaid",
            ContentSyntax::PlainText => "plain_text",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Artifact / ArtifactVersion
// ---------------------------------------------------------------------------

/// A single document instance within a project. `current_version_id` always
/// points at the most recently created version; there is no rollback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub id: ArtifactId,
    pub project_id: ProjectId,
    pub artifact_type_id: ArtifactTypeId,
    pub name: String,
    pub state: ArtifactState,
    pub current_version_id: Option<VersionId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Artifact {
    pub fn new(
        project_id: ProjectId,
        artifact_type_id: ArtifactTypeId,
        name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ArtifactId::new(),
            project_id,
            artifact_type_id,
            name: name.into(),
            state: ArtifactState::Todo,
            current_version_id: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// An immutable content snapshot. Versions are append-only: created whenever
/// generated or user-supplied content is committed, never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactVersion {
    pub id: VersionId,
    pub artifact_id: ArtifactId,
    pub number: u32,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ArtifactVersion {
    pub fn new(artifact_id: ArtifactId, number: u32, content: impl Into<String>) -> Self {
        Self {
            id: VersionId::new(),
            artifact_id,
            number,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// ArtifactRecord
// ---------------------------------------------------------------------------

/// An artifact together with its optionally-loaded relations.
///
/// Relation fields may be absent: some construction paths (partially loaded
/// fixtures, listings that only need the row) skip them, and consumers
/// degrade softly rather than failing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub artifact: Artifact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<ProjectType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<ArtifactTypeDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<LifecyclePhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_version: Option<ArtifactVersion>,
}

impl ArtifactRecord {
    /// A record with no relations loaded.
    pub fn bare(artifact: Artifact) -> Self {
        Self {
            artifact,
            project: None,
            project_type: None,
            artifact_type: None,
            phase: None,
            current_version: None,
        }
    }

    /// True if this record exposes usable content: either a materialized
    /// current version or at least a current-version reference.
    pub fn has_content(&self) -> bool {
        self.current_version.is_some() || self.artifact.current_version_id.is_some()
    }
}

// ---------------------------------------------------------------------------
// Interaction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        f.write_str(s)
    }
}

/// One turn of the co-authoring conversation attached to an artifact.
/// `sequence` is monotonic per artifact, starting at 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub id: InteractionId,
    pub artifact_id: ArtifactId,
    pub sequence: u32,
    pub role: Role,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Interaction {
    pub fn new(
        artifact_id: ArtifactId,
        sequence: u32,
        role: Role,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: InteractionId::new(),
            artifact_id,
            sequence,
            role,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

/// Plain-data chat output surfaced to callers alongside an operation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
