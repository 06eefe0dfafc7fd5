//! Configuration for template families and the registry.
//!
//! Loaded from `stencil.toml` (kebab-case keys). Every field has a default, so
//! an empty file is a valid configuration.

pub mod loader;

pub use loader::{expand_path, load_config};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use stencil_compiler::FilterDefinition;
use stencil_core::{Encoder, HtmlEncoder, JsonEncoder, XmlEncoder};

use crate::error::ConfigError;

fn default_true() -> bool {
    true
}

fn default_content_type() -> String {
    "text/plain".to_string()
}

/// Text encoder bound to a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderKind {
    Html,
    Xml,
    Json,
    #[default]
    None,
}

impl EncoderKind {
    pub fn encoder(self) -> Option<Arc<dyn Encoder>> {
        match self {
            EncoderKind::Html => Some(Arc::new(HtmlEncoder)),
            EncoderKind::Xml => Some(Arc::new(XmlEncoder)),
            EncoderKind::Json => Some(Arc::new(JsonEncoder)),
            EncoderKind::None => None,
        }
    }
}

/// A named filter pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub name: String,
    pub pattern: String,
}

impl From<&FilterConfig> for FilterDefinition {
    fn from(filter: &FilterConfig) -> Self {
        FilterDefinition::new(&filter.name, &filter.pattern)
    }
}

/// One output family: file extension, content type, encoder and filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FamilyConfig {
    pub identifier: String,

    /// Source file extension including the dot, e.g. `.html`.
    pub extension: String,

    #[serde(default = "default_content_type")]
    pub content_type: String,

    #[serde(default)]
    pub encoder: EncoderKind,

    /// Value filters in addition to the built-in ones.
    #[serde(default)]
    pub value_filters: Vec<FilterConfig>,

    /// Block filters in addition to the built-in ones.
    #[serde(default)]
    pub block_filters: Vec<FilterConfig>,

    /// Bundles attached to every template of the family, in lookup order.
    #[serde(default)]
    pub default_bundles: Vec<String>,

    pub default_language: Option<String>,

    /// Bind beans through the JSON bean handler.
    #[serde(default = "default_true")]
    pub bind_beans: bool,
}

impl FamilyConfig {
    pub fn new(identifier: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            extension: extension.into(),
            content_type: default_content_type(),
            encoder: EncoderKind::None,
            value_filters: Vec::new(),
            block_filters: Vec::new(),
            default_bundles: Vec::new(),
            default_language: None,
            bind_beans: true,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    pub fn with_encoder(mut self, encoder: EncoderKind) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn with_value_filter(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.value_filters.push(FilterConfig {
            name: name.into(),
            pattern: pattern.into(),
        });
        self
    }

    pub fn with_block_filter(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.block_filters.push(FilterConfig {
            name: name.into(),
            pattern: pattern.into(),
        });
        self
    }

    pub fn with_default_bundle(mut self, name: impl Into<String>) -> Self {
        self.default_bundles.push(name.into());
        self
    }

    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = Some(language.into());
        self
    }
}

/// The html, xml, txt and json families.
pub fn builtin_families() -> Vec<FamilyConfig> {
    vec![
        FamilyConfig::new("html", ".html")
            .with_content_type("text/html")
            .with_encoder(EncoderKind::Html),
        FamilyConfig::new("xml", ".xml")
            .with_content_type("text/xml")
            .with_encoder(EncoderKind::Xml),
        FamilyConfig::new("txt", ".txt"),
        FamilyConfig::new("json", ".json")
            .with_content_type("application/json")
            .with_encoder(EncoderKind::Json),
    ]
}

/// Top-level `stencil.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StencilConfig {
    /// Template root directories, searched in order.
    #[serde(default)]
    pub template_paths: Vec<String>,

    #[serde(default = "default_true")]
    pub auto_reload: bool,

    /// Directory for persisted compiled artifacts. Persistence is off when unset.
    pub generation_path: Option<String>,

    /// Language applied to families that do not set their own.
    pub default_language: Option<String>,

    /// Directories holding `<bundle>[_<language>].toml` resource bundles.
    #[serde(default)]
    pub bundle_paths: Vec<String>,

    /// Families replacing built-ins with the same identifier or adding new ones.
    #[serde(default)]
    pub families: Vec<FamilyConfig>,
}

impl Default for StencilConfig {
    fn default() -> Self {
        Self {
            template_paths: Vec::new(),
            auto_reload: true,
            generation_path: None,
            default_language: None,
            bundle_paths: Vec::new(),
            families: Vec::new(),
        }
    }
}

impl StencilConfig {
    /// Parse `path`, failing on unreadable or malformed files.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Built-in families with configured overrides applied, followed by
    /// additional configured families. The global default language fills in
    /// families without one.
    pub fn effective_families(&self) -> Vec<FamilyConfig> {
        let mut families = builtin_families();
        for family in &self.families {
            match families
                .iter_mut()
                .find(|existing| existing.identifier == family.identifier)
            {
                Some(existing) => *existing = family.clone(),
                None => families.push(family.clone()),
            }
        }
        if let Some(language) = &self.default_language {
            for family in &mut families {
                family
                    .default_language
                    .get_or_insert_with(|| language.clone());
            }
        }
        families
    }

    pub fn template_dirs(&self) -> Vec<PathBuf> {
        self.template_paths.iter().map(|p| expand_path(p)).collect()
    }

    pub fn bundle_dirs(&self) -> Vec<PathBuf> {
        self.bundle_paths.iter().map(|p| expand_path(p)).collect()
    }

    pub fn generation_dir(&self) -> Option<PathBuf> {
        self.generation_path.as_deref().map(expand_path)
    }
}
