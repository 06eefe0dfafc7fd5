//! Compiled artifacts: the cacheable product of compiling one template source.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tree::ContentTree;

/// Filter capturing `render:<renderer>[:<differentiator>]` value tags.
pub const FILTER_RENDER: &str = "render";
/// Filter capturing `l10n:[<bundle>:]<key>` value tags.
pub const FILTER_L10N: &str = "l10n";
/// Filter capturing `lang:<name>` values and `lang:<name>:<languages>` blocks.
pub const FILTER_LANG: &str = "lang";

/// Captures of one filter pattern against one value or block id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCaptures {
    /// The full id that matched.
    pub id: String,
    /// Capture groups 1..n; `None` where a group did not participate.
    pub groups: Vec<Option<String>>,
}

impl FilterCaptures {
    /// Capture group by regex index; `0` is the id.
    pub fn group(&self, index: usize) -> Option<&str> {
        if index == 0 {
            return Some(&self.id);
        }
        self.groups.get(index - 1).and_then(|g| g.as_deref())
    }
}

/// A resource the artifact was compiled from, with the modification time
/// observed at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Template name of the resource (e.g. `common.header`).
    pub name: String,
    pub modified: Option<DateTime<Utc>>,
}

/// Everything produced by compiling one template source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledArtifact {
    name: String,
    family: String,
    extension: String,
    tree: ContentTree,
    #[serde(default)]
    filtered_values: HashMap<String, Vec<FilterCaptures>>,
    #[serde(default)]
    filtered_blocks: HashMap<String, Vec<FilterCaptures>>,
    source_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    dependencies: Vec<Dependency>,
    modification_state: Option<String>,
    #[serde(default)]
    generation: u64,
    compiled_at: DateTime<Utc>,
}

impl CompiledArtifact {
    pub fn new(
        name: impl Into<String>,
        family: impl Into<String>,
        extension: impl Into<String>,
        tree: ContentTree,
    ) -> Self {
        Self {
            name: name.into(),
            family: family.into(),
            extension: extension.into(),
            tree,
            filtered_values: HashMap::new(),
            filtered_blocks: HashMap::new(),
            source_modified: None,
            dependencies: Vec::new(),
            modification_state: None,
            generation: 0,
            compiled_at: Utc::now(),
        }
    }

    pub fn with_filtered_values(mut self, filtered: HashMap<String, Vec<FilterCaptures>>) -> Self {
        self.filtered_values = filtered;
        self
    }

    pub fn with_filtered_blocks(mut self, filtered: HashMap<String, Vec<FilterCaptures>>) -> Self {
        self.filtered_blocks = filtered;
        self
    }

    pub fn with_source_modified(mut self, modified: Option<DateTime<Utc>>) -> Self {
        self.source_modified = modified;
        self
    }

    pub fn with_dependencies(mut self, dependencies: Vec<Dependency>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn with_modification_state(mut self, state: Option<String>) -> Self {
        self.modification_state = state;
        self
    }

    /// Stamp the generation assigned by the loader that cached this artifact.
    pub fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Name with the family extension appended, e.g. `pages.home.html`.
    pub fn full_name(&self) -> String {
        format!("{}{}", self.name, self.extension)
    }

    pub fn tree(&self) -> &ContentTree {
        &self.tree
    }

    pub fn filtered_values(&self, filter: &str) -> &[FilterCaptures] {
        self.filtered_values
            .get(filter)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn filtered_blocks(&self, filter: &str) -> &[FilterCaptures] {
        self.filtered_blocks
            .get(filter)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn source_modified(&self) -> Option<DateTime<Utc>> {
        self.source_modified
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn modification_state(&self) -> Option<&str> {
        self.modification_state.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn compiled_at(&self) -> DateTime<Utc> {
        self.compiled_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_groups() {
        let captures = FilterCaptures {
            id: "render:clock:utc".into(),
            groups: vec![Some("clock".into()), Some("utc".into())],
        };
        assert_eq!(captures.group(0), Some("render:clock:utc"));
        assert_eq!(captures.group(1), Some("clock"));
        assert_eq!(captures.group(2), Some("utc"));
        assert_eq!(captures.group(3), None);
    }

    #[test]
    fn test_missing_filter_is_empty() {
        let artifact = CompiledArtifact::new("empty", "html", ".html", ContentTree::builder().build());
        assert!(artifact.filtered_values(FILTER_RENDER).is_empty());
        assert!(artifact.filtered_blocks(FILTER_LANG).is_empty());
        assert_eq!(artifact.full_name(), "empty.html");
        assert_eq!(artifact.generation(), 0);
    }

    #[test]
    fn test_artifact_json_round_trip_keeps_metadata() {
        let modified = Utc::now();
        let mut artifact = CompiledArtifact::new("page", "html", ".html", ContentTree::builder().build())
            .with_source_modified(Some(modified))
            .with_dependencies(vec![Dependency {
                name: "common.footer".into(),
                modified: None,
            }])
            .with_modification_state(Some("abc".into()));
        artifact.set_generation(7);

        let json = serde_json::to_string(&artifact).unwrap();
        let restored: CompiledArtifact = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.source_modified(), Some(modified));
        assert_eq!(restored.dependencies()[0].name, "common.footer");
        assert_eq!(restored.modification_state(), Some("abc"));
        assert_eq!(restored.generation(), 7);
    }
}
