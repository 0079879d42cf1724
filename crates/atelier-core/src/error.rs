use crate::types::{ArtifactId, ProjectId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtelierError {
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    #[error("artifact not found: {0}")]
    ArtifactNotFound(ArtifactId),

    #[error("project type not found: {0}")]
    ProjectTypeNotFound(String),

    #[error("unknown artifact type: {0}")]
    UnknownArtifactType(String),

    #[error("artifact type '{artifact_type}' does not belong to project type '{project_type}'")]
    PhaseMismatch {
        artifact_type: String,
        project_type: String,
    },

    #[error("project already has a '{0}' artifact")]
    DuplicateArtifact(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("{artifact_type} missing; {artifact_type} is required context")]
    MissingRequiredDependency { artifact_type: String },

    #[error("store error: {0}")]
    Store(#[source] anyhow::Error),

    #[error("generation error: {0}")]
    Generation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl AtelierError {
    /// "Referenced thing does not exist"; transports map these to 404.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AtelierError::ProjectNotFound(_)
                | AtelierError::ArtifactNotFound(_)
                | AtelierError::ProjectTypeNotFound(_)
        )
    }

    /// Caller-supplied input violated a domain rule; transports map these to 400.
    pub fn is_bad_request(&self) -> bool {
        matches!(
            self,
            AtelierError::UnknownArtifactType(_)
                | AtelierError::PhaseMismatch { .. }
                | AtelierError::DuplicateArtifact(_)
                | AtelierError::InvalidState(_)
                | AtelierError::InvalidTransition { .. }
                | AtelierError::MissingRequiredDependency { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AtelierError>;
