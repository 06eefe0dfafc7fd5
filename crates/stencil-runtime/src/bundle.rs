//! File-backed resource bundles.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use stencil_core::{BundleResolver, ResourceBundle};
use tracing::{debug, warn};

use crate::error::ConfigError;

/// Bundle read from a TOML file of `key = "text"` entries. Nested tables
/// produce dotted keys; numbers and booleans are stored as their text.
#[derive(Debug, Clone)]
pub struct TomlBundle {
    name: String,
    entries: HashMap<String, String>,
}

impl TomlBundle {
    pub fn from_file(name: impl Into<String>, path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(name, &contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(name: impl Into<String>, contents: &str) -> Result<Self, toml::de::Error> {
        let table: toml::Table = toml::from_str(contents)?;
        let name = name.into();
        let mut entries = HashMap::new();
        flatten(&name, "", &table, &mut entries);
        Ok(Self { name, entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn flatten(bundle: &str, prefix: &str, table: &toml::Table, entries: &mut HashMap<String, String>) {
    for (key, value) in table {
        let key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::String(text) => {
                entries.insert(key, text.clone());
            }
            toml::Value::Table(nested) => flatten(bundle, &key, nested, entries),
            toml::Value::Integer(n) => {
                entries.insert(key, n.to_string());
            }
            toml::Value::Float(n) => {
                entries.insert(key, n.to_string());
            }
            toml::Value::Boolean(b) => {
                entries.insert(key, b.to_string());
            }
            other => warn!(bundle, key = %key, kind = other.type_str(), "Skipping unsupported bundle entry"),
        }
    }
}

impl ResourceBundle for TomlBundle {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

/// Resolves bundle `name` from `<dir>/<name>_<language>.toml`, then
/// `<dir>/<name>.toml`, across directories in order. Loaded bundles are
/// cached; unreadable files are logged and skipped.
#[derive(Debug, Default)]
pub struct DirectoryBundleResolver {
    dirs: Vec<PathBuf>,
    cache: DashMap<PathBuf, Arc<TomlBundle>>,
}

impl DirectoryBundleResolver {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
            cache: DashMap::new(),
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    fn candidates(&self, name: &str, language: Option<&str>) -> Vec<PathBuf> {
        let mut files = Vec::new();
        if let Some(language) = language {
            let lang = language.to_ascii_lowercase();
            files.extend(self.dirs.iter().map(|dir| dir.join(format!("{name}_{lang}.toml"))));
        }
        files.extend(self.dirs.iter().map(|dir| dir.join(format!("{name}.toml"))));
        files
    }

    fn load(&self, name: &str, path: PathBuf) -> Option<Arc<TomlBundle>> {
        if let Some(bundle) = self.cache.get(&path) {
            return Some(Arc::clone(bundle.value()));
        }
        match TomlBundle::from_file(name, &path) {
            Ok(bundle) => {
                debug!(bundle = name, path = %path.display(), entries = bundle.len(), "Loaded resource bundle");
                let bundle = Arc::new(bundle);
                self.cache.insert(path, Arc::clone(&bundle));
                Some(bundle)
            }
            Err(e) => {
                warn!(bundle = name, error = %e, "Skipping unreadable resource bundle");
                None
            }
        }
    }
}

impl BundleResolver for DirectoryBundleResolver {
    fn resolve(&self, name: &str, language: Option<&str>) -> Option<Arc<dyn ResourceBundle>> {
        self.candidates(name, language)
            .into_iter()
            .filter(|path| path.is_file())
            .find_map(|path| self.load(name, path))
            .map(|bundle| bundle as Arc<dyn ResourceBundle>)
    }
}
