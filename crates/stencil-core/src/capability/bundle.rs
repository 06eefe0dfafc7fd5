//! Resource bundles consulted by localization tags.

use std::collections::HashMap;
use std::sync::Arc;

/// Ordered lookup of localized text by key.
pub trait ResourceBundle: Send + Sync + std::fmt::Debug {
    /// Bundle name, matched against explicit `l10n:<bundle>:<key>` tags.
    fn name(&self) -> &str;

    /// Text for `key`, or `None` when the bundle has no entry.
    fn get(&self, key: &str) -> Option<&str>;
}

/// Locates named bundles for explicit localization tags.
pub trait BundleResolver: Send + Sync + std::fmt::Debug {
    fn resolve(&self, name: &str, language: Option<&str>) -> Option<Arc<dyn ResourceBundle>>;
}

/// In-memory bundle.
#[derive(Debug, Clone, Default)]
pub struct MapBundle {
    name: String,
    entries: HashMap<String, String>,
}

impl MapBundle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
        }
    }

    pub fn with_entry(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.entries.insert(key.into(), text.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }

    pub fn from_entries(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        Self {
            name: name.into(),
            entries: entries.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceBundle for MapBundle {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

/// Resolver over bundles registered in memory, optionally per language.
#[derive(Debug, Clone, Default)]
pub struct MapBundleResolver {
    bundles: HashMap<(String, Option<String>), Arc<dyn ResourceBundle>>,
}

impl MapBundleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a bundle for every language.
    pub fn register(&mut self, bundle: Arc<dyn ResourceBundle>) {
        self.bundles
            .insert((bundle.name().to_string(), None), bundle);
    }

    /// Register a bundle used only when the template language is `language`.
    pub fn register_for_language(&mut self, language: &str, bundle: Arc<dyn ResourceBundle>) {
        self.bundles.insert(
            (bundle.name().to_string(), Some(language.to_ascii_lowercase())),
            bundle,
        );
    }
}

impl BundleResolver for MapBundleResolver {
    fn resolve(&self, name: &str, language: Option<&str>) -> Option<Arc<dyn ResourceBundle>> {
        if let Some(lang) = language {
            let key = (name.to_string(), Some(lang.to_ascii_lowercase()));
            if let Some(bundle) = self.bundles.get(&key) {
                return Some(Arc::clone(bundle));
            }
        }
        self.bundles.get(&(name.to_string(), None)).cloned()
    }
}
