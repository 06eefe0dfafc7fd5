//! On-disk persistence of compiled artifacts.
//!
//! Artifacts are stored as JSON at `<root>/<family>/<name>.json`.

use std::path::{Path, PathBuf};

use stencil_core::CompiledArtifact;
use tracing::{debug, warn};

use crate::error::LoadError;

/// Directory of persisted compiled artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, family: &str, name: &str) -> PathBuf {
        self.root.join(family).join(format!("{name}.json"))
    }

    /// Persisted artifact for `name`, if one exists and can be read.
    ///
    /// Unreadable or corrupt files are logged and ignored so the template is
    /// compiled from source instead.
    pub fn load(&self, family: &str, name: &str) -> Option<CompiledArtifact> {
        let path = self.path_for(family, name);
        let contents = match std::fs::read(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read persisted artifact");
                return None;
            }
        };
        match serde_json::from_slice(&contents) {
            Ok(artifact) => {
                debug!(path = %path.display(), "Loaded persisted artifact");
                Some(artifact)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring corrupt persisted artifact");
                None
            }
        }
    }

    /// Write `artifact`, returning the path written.
    pub fn save(&self, artifact: &CompiledArtifact) -> Result<PathBuf, LoadError> {
        let path = self.path_for(artifact.family(), artifact.name());
        let persist_error = |source: Box<dyn std::error::Error + Send + Sync>| LoadError::Persist {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| persist_error(e.into()))?;
        }
        let json = serde_json::to_vec_pretty(artifact).map_err(|e| persist_error(e.into()))?;
        std::fs::write(&path, json).map_err(|e| persist_error(e.into()))?;
        debug!(path = %path.display(), "Persisted compiled artifact");
        Ok(path)
    }

    pub fn remove(&self, family: &str, name: &str) -> std::io::Result<()> {
        match std::fs::remove_file(self.path_for(family, name)) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_core::{Block, BlockPart, ContentTree};

    fn artifact() -> CompiledArtifact {
        let mut builder = ContentTree::builder();
        builder.add_block(Block::new(
            "",
            vec![
                BlockPart::Text { text: "Hi ".into() },
                BlockPart::Value {
                    id: "name".into(),
                    tag: "{{v name/}}".into(),
                },
            ],
        ));
        builder.declare_value("name");
        CompiledArtifact::new("greeting", "txt", ".txt", builder.build())
            .with_modification_state(Some("abc".to_string()))
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let path = store.save(&artifact()).unwrap();
        assert_eq!(path, dir.path().join("txt").join("greeting.json"));

        let loaded = store.load("txt", "greeting").unwrap();
        assert_eq!(loaded.name(), "greeting");
        assert_eq!(loaded.modification_state(), Some("abc"));
        assert!(loaded.tree().has_value_id("name"));
        assert_eq!(loaded.tree().root().unwrap().literal_text(), "Hi ");
    }

    #[test]
    fn test_missing_and_corrupt_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        assert!(store.load("txt", "greeting").is_none());

        std::fs::create_dir_all(dir.path().join("txt")).unwrap();
        std::fs::write(store.path_for("txt", "greeting"), "{not json").unwrap();
        assert!(store.load("txt", "greeting").is_none());

        store.remove("txt", "greeting").unwrap();
        store.remove("txt", "greeting").unwrap();
    }

    #[test]
    fn test_save_failure_is_persist_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, "a file where a directory should be").unwrap();
        let store = ArtifactStore::new(&blocker);
        let err = store.save(&artifact()).unwrap_err();
        assert!(matches!(err, LoadError::Persist { .. }));
    }
}
