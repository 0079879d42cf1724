use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Id newtypes
// ---------------------------------------------------------------------------

macro_rules! id_type {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_type!(ProjectId);
id_type!(ProjectTypeId);
id_type!(PhaseId);
id_type!(ArtifactId);
id_type!(ArtifactTypeId);
id_type!(VersionId);
id_type!(InteractionId);

// ---------------------------------------------------------------------------
// ArtifactState
// ---------------------------------------------------------------------------

/// Content lifecycle of a single artifact. Transitions are a static table
/// lookup, not a workflow engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactState {
    Todo,
    InProgress,
    InReview,
    Approved,
}

impl ArtifactState {
    pub fn all() -> &'static [ArtifactState] {
        &[
            ArtifactState::Todo,
            ArtifactState::InProgress,
            ArtifactState::InReview,
            ArtifactState::Approved,
        ]
    }

    /// Stable numeric identifier, used by callers that address states by id.
    pub fn id(self) -> u16 {
        match self {
            ArtifactState::Todo => 1,
            ArtifactState::InProgress => 2,
            ArtifactState::InReview => 3,
            ArtifactState::Approved => 4,
        }
    }

    pub fn from_id(id: u16) -> Option<ArtifactState> {
        ArtifactState::all().iter().copied().find(|s| s.id() == id)
    }

    /// States reachable from this one.
    pub fn transitions(self) -> &'static [ArtifactState] {
        match self {
            ArtifactState::Todo => &[ArtifactState::InProgress],
            ArtifactState::InProgress => &[ArtifactState::InReview],
            ArtifactState::InReview => &[ArtifactState::InProgress, ArtifactState::Approved],
            ArtifactState::Approved => &[],
        }
    }

    pub fn can_transition_to(self, target: ArtifactState) -> bool {
        self.transitions().contains(&target)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactState::Todo => "todo",
            ArtifactState::InProgress => "in_progress",
            ArtifactState::InReview => "in_review",
            ArtifactState::Approved => "approved",
        }
    }
}

impl fmt::Display for ArtifactState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ArtifactState {
    type Err = crate::error::AtelierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(ArtifactState::Todo),
            "in_progress" => Ok(ArtifactState::InProgress),
            "in_review" => Ok(ArtifactState::InReview),
            "approved" => Ok(ArtifactState::Approved),
            _ => Err(crate::error::AtelierError::InvalidState(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// slugify
// ---------------------------------------------------------------------------

/// Normalize an artifact-type name into a context key: lowercase, whitespace
/// to underscores, everything outside `[a-z0-9_]` dropped.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
