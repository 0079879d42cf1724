use crate::artifact::ArtifactTypeDef;
use crate::types::{PhaseId, ProjectId, ProjectTypeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LifecyclePhase
// ---------------------------------------------------------------------------

/// An ordered stage within a project type ("Requirements" order 1, "Design"
/// order 2). Owns the artifact types that are legal while a project is in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecyclePhase {
    pub id: PhaseId,
    pub name: String,
    pub order: u32,
    pub artifact_types: Vec<ArtifactTypeDef>,
}

impl LifecyclePhase {
    pub fn artifact_type(&self, name: &str) -> Option<&ArtifactTypeDef> {
        self.artifact_types.iter().find(|t| t.name == name)
    }
}

// ---------------------------------------------------------------------------
// ProjectType
// ---------------------------------------------------------------------------

/// A named methodology: an ordered set of lifecycle phases and, transitively,
/// the artifact types legal within each.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectType {
    pub id: ProjectTypeId,
    pub name: String,
    pub phases: Vec<LifecyclePhase>,
}

impl ProjectType {
    /// Search every phase for an artifact type by its unique name.
    pub fn artifact_type(&self, name: &str) -> Option<&ArtifactTypeDef> {
        self.phases.iter().find_map(|p| p.artifact_type(name))
    }

    pub fn phase(&self, id: PhaseId) -> Option<&LifecyclePhase> {
        self.phases.iter().find(|p| p.id == id)
    }

    /// True if the given phase belongs to this project type.
    pub fn owns_phase(&self, id: PhaseId) -> bool {
        self.phase(id).is_some()
    }
}

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub owner: String,
    pub project_type_id: ProjectTypeId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(
        name: impl Into<String>,
        owner: impl Into<String>,
        project_type_id: ProjectTypeId,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            name: name.into(),
            owner: owner.into(),
            project_type_id,
            created_at: now,
            updated_at: now,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
