use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// CoreConfig
// ---------------------------------------------------------------------------

/// Tunable knobs for the core. Everything has a sensible default so an empty
/// config file (or none at all) yields a working system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Project type used when `create_project` is called without one.
    #[serde(default = "default_project_type")]
    pub default_project_type: String,

    /// Artifact types that may legitimately have more than one instance per
    /// project. Dependencies on these types resolve to a list of contents;
    /// everything else resolves to a single content string.
    #[serde(default = "default_multi_instance")]
    pub multi_instance_types: Vec<String>,

    /// How many prior interactions are handed to the generator as
    /// conversational context on the update path.
    #[serde(default = "default_interaction_window")]
    pub interaction_window: usize,

    /// How long the type-lookup cache serves a snapshot before reloading it
    /// from the store.
    #[serde(default = "default_cache_ttl")]
    pub type_cache_ttl_secs: u64,
}

fn default_project_type() -> String {
    "Software Engineering".to_string()
}

fn default_multi_instance() -> Vec<String> {
    vec!["Use Cases".to_string(), "C4 Component".to_string()]
}

fn default_interaction_window() -> usize {
    3
}

fn default_cache_ttl() -> u64 {
    300
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            default_project_type: default_project_type(),
            multi_instance_types: default_multi_instance(),
            interaction_window: default_interaction_window(),
            type_cache_ttl_secs: default_cache_ttl(),
        }
    }
}

impl CoreConfig {
    pub fn is_multi_instance(&self, artifact_type_name: &str) -> bool {
        self.multi_instance_types
            .iter()
            .any(|t| t == artifact_type_name)
    }

    // ---------------------------------------------------------------------------
    // Persistence
    // ---------------------------------------------------------------------------

    /// Load from a YAML file; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        let config: CoreConfig = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let cfg = CoreConfig::default();
        assert_eq!(cfg.default_project_type, "Software Engineering");
        assert_eq!(cfg.interaction_window, 3);
        assert!(cfg.is_multi_instance("Use Cases"));
        assert!(cfg.is_multi_instance("C4 Component"));
        assert!(!cfg.is_multi_instance("Vision Document"));
    }

    #[test]
    fn roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("atelier.yaml");

        let mut cfg = CoreConfig::default();
        cfg.interaction_window = 5;
        cfg.multi_instance_types.push("Persona".to_string());
        cfg.save(&path).unwrap();

        let loaded = CoreConfig::load(&path).unwrap();
        assert_eq!(loaded.interaction_window, 5);
        assert!(loaded.is_multi_instance("Persona"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = CoreConfig::load(&dir.path().join("nope.yaml")).unwrap();
        assert_eq!(cfg.type_cache_ttl_secs, 300);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("atelier.yaml");
        std::fs::write(&path, "interaction_window: 7\n").unwrap();

        let cfg = CoreConfig::load(&path).unwrap();
        assert_eq!(cfg.interaction_window, 7);
        assert_eq!(cfg.default_project_type, "Software Engineering");
        assert!(cfg.is_multi_instance("Use Cases"));
    }
}
