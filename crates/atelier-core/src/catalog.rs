use crate::artifact::{ArtifactTypeDef, ContentSyntax, DependencyDecl};
use crate::project::{LifecyclePhase, ProjectType};
use crate::types::{PhaseId, ProjectTypeId};

// ---------------------------------------------------------------------------
// Built-in methodology
// ---------------------------------------------------------------------------

/// The built-in "Software Engineering" methodology: a Requirements phase
/// feeding a Design phase, with the canonical document dependency chain
/// Vision → Functional Requirements → Use Cases → C4 diagrams.
///
/// Ids are freshly generated on every call; seed a store once and look types
/// up by name afterwards.
pub fn software_engineering() -> ProjectType {
    let requirements = PhaseId::new();
    let design = PhaseId::new();

    ProjectType {
        id: ProjectTypeId::new(),
        name: "Software Engineering".to_string(),
        phases: vec![
            LifecyclePhase {
                id: requirements,
                name: "Requirements".to_string(),
                order: 1,
                artifact_types: vec![
                    ArtifactTypeDef::new(
                        "Vision Document",
                        ContentSyntax::Markdown,
                        requirements,
                        vec![],
                    )
                    .with_slug("vision"),
                    ArtifactTypeDef::new(
                        "Functional Requirements",
                        ContentSyntax::Markdown,
                        requirements,
                        vec![DependencyDecl::required("Vision Document")],
                    ),
                    ArtifactTypeDef::new(
                        "Use Cases",
                        ContentSyntax::Markdown,
                        requirements,
                        vec![
                            DependencyDecl::required("Vision Document"),
                            DependencyDecl::required("Functional Requirements"),
                        ],
                    ),
                ],
            },
            LifecyclePhase {
                id: design,
                name: "Design".to_string(),
                order: 2,
                artifact_types: vec![
                    ArtifactTypeDef::new(
                        "C4 Context",
                        ContentSyntax::Mermaid,
                        design,
                        vec![
                            DependencyDecl::required("Vision Document"),
                            DependencyDecl::required("Functional Requirements"),
                            DependencyDecl::required("Use Cases"),
                        ],
                    ),
                    ArtifactTypeDef::new(
                        "C4 Container",
                        ContentSyntax::Mermaid,
                        design,
                        vec![DependencyDecl::required("C4 Context")],
                    ),
                    ArtifactTypeDef::new(
                        "C4 Component",
                        ContentSyntax::Mermaid,
                        design,
                        vec![DependencyDecl::required("C4 Container")],
                    ),
                ],
            },
        ],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_shape() {
        let pt = software_engineering();
        assert_eq!(pt.phases.len(), 2);
        assert_eq!(pt.phases[0].name, "Requirements");
        assert_eq!(pt.phases[1].name, "Design");
        assert_eq!(pt.phases[0].artifact_types.len(), 3);
        assert_eq!(pt.phases[1].artifact_types.len(), 3);
    }

    #[test]
    fn every_declared_dependency_exists_in_catalog() {
        let pt = software_engineering();
        for phase in &pt.phases {
            for ty in &phase.artifact_types {
                for dep in &ty.depends_on {
                    assert!(
                        pt.artifact_type(&dep.artifact_type).is_some(),
                        "{} depends on unknown type {}",
                        ty.name,
                        dep.artifact_type
                    );
                }
            }
        }
    }

    #[test]
    fn vision_document_is_a_root() {
        let pt = software_engineering();
        assert!(pt
            .artifact_type("Vision Document")
            .unwrap()
            .depends_on
            .is_empty());
    }

    #[test]
    fn all_catalog_edges_are_required() {
        let pt = software_engineering();
        for phase in &pt.phases {
            for ty in &phase.artifact_types {
                assert!(ty.depends_on.iter().all(|d| d.required));
            }
        }
    }
}
