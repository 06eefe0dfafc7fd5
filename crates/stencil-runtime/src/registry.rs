//! Registry of template factories keyed by family identifier.

use std::collections::BTreeMap;
use std::sync::Arc;

use stencil_core::{BundleResolver, Template};
use tracing::info;

use crate::bundle::DirectoryBundleResolver;
use crate::config::{builtin_families, StencilConfig};
use crate::error::{ConfigError, FactoryError};
use crate::factory::TemplateFactory;
use crate::source::{DirectorySource, TemplateSource};

/// One [`TemplateFactory`] per output family, built once at startup and
/// shared across threads.
#[derive(Debug, Default, Clone)]
pub struct TemplateRegistry {
    factories: BTreeMap<String, Arc<TemplateFactory>>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the html, xml, txt and json families reading from `source`.
    pub fn with_builtin_families(source: Arc<dyn TemplateSource>) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        for family in builtin_families() {
            registry.register(TemplateFactory::new(family, Arc::clone(&source))?);
        }
        Ok(registry)
    }

    /// Registry built from a loaded configuration: templates come from the
    /// configured paths and bundles from the configured bundle directories.
    pub fn from_config(config: &StencilConfig) -> Result<Self, ConfigError> {
        let source: Arc<dyn TemplateSource> = Arc::new(DirectorySource::new(config.template_dirs()));
        Self::from_config_with_source(config, source)
    }

    /// Like [`Self::from_config`] with an explicit template source.
    pub fn from_config_with_source(
        config: &StencilConfig,
        source: Arc<dyn TemplateSource>,
    ) -> Result<Self, ConfigError> {
        let resolver: Arc<dyn BundleResolver> = Arc::new(DirectoryBundleResolver::new(config.bundle_dirs()));
        let generation_dir = config.generation_dir();

        let mut registry = Self::new();
        for family in config.effective_families() {
            let mut factory =
                TemplateFactory::with_bundle_resolver(family, Arc::clone(&source), Arc::clone(&resolver))?
                    .with_auto_reload(config.auto_reload);
            if let Some(dir) = &generation_dir {
                factory = factory.with_persistence(dir);
            }
            registry.register(factory);
        }
        info!(
            families = ?registry.families(),
            auto_reload = config.auto_reload,
            persistence = generation_dir.is_some(),
            "Template registry ready"
        );
        Ok(registry)
    }

    /// Add `factory`, replacing any factory with the same identifier.
    pub fn register(&mut self, factory: TemplateFactory) -> Arc<TemplateFactory> {
        let factory = Arc::new(factory);
        self.factories
            .insert(factory.identifier().to_string(), Arc::clone(&factory));
        factory
    }

    pub fn family(&self, identifier: &str) -> Result<&Arc<TemplateFactory>, FactoryError> {
        self.factories
            .get(identifier)
            .ok_or_else(|| FactoryError::UnknownFamily(identifier.to_string()))
    }

    /// Fresh template `name` of family `family`.
    pub fn get(&self, family: &str, name: &str) -> Result<Template, FactoryError> {
        self.family(family)?.get(name)
    }

    /// Registered family identifiers, sorted.
    pub fn families(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FamilyConfig;
    use crate::source::MemorySource;

    #[test]
    fn test_builtin_families() {
        let source = Arc::new(MemorySource::new());
        source.insert("note", ".txt", "a & b {{v x/}}");
        source.insert("note", ".html", "<b>{{v x/}}</b>");
        let registry = TemplateRegistry::with_builtin_families(source).unwrap();

        assert_eq!(registry.families(), vec!["html", "json", "txt", "xml"]);

        let mut txt = registry.get("txt", "note").unwrap();
        txt.set_value_encoded("x", "<y>").unwrap();
        assert_eq!(txt.get_content().unwrap(), "a & b <y>");

        let mut html = registry.get("html", "note").unwrap();
        html.set_value_encoded("x", "<y>").unwrap();
        assert_eq!(html.get_content().unwrap(), "<b>&lt;y&gt;</b>");
    }

    #[test]
    fn test_unknown_family() {
        let registry = TemplateRegistry::new();
        assert!(matches!(
            registry.get("pdf", "x").unwrap_err(),
            FactoryError::UnknownFamily(ref id) if id == "pdf"
        ));
    }

    #[test]
    fn test_from_config_reads_directories() {
        let templates = tempfile::tempdir().unwrap();
        let bundles = tempfile::tempdir().unwrap();
        let generated = tempfile::tempdir().unwrap();
        std::fs::write(templates.path().join("hello.txt"), "{{v l10n:greeting/}}!").unwrap();
        std::fs::write(bundles.path().join("messages_de.toml"), "greeting = \"Hallo\"").unwrap();

        let config = StencilConfig {
            template_paths: vec![templates.path().display().to_string()],
            bundle_paths: vec![bundles.path().display().to_string()],
            generation_path: Some(generated.path().display().to_string()),
            default_language: Some("de".into()),
            families: vec![FamilyConfig::new("txt", ".txt").with_default_bundle("messages")],
            ..StencilConfig::default()
        };
        let registry = TemplateRegistry::from_config(&config).unwrap();
        let mut template = registry.get("txt", "hello").unwrap();
        assert_eq!(template.language(), Some("de"));
        assert_eq!(template.get_content().unwrap(), "Hallo!");
        assert!(generated.path().join("txt").join("hello.json").is_file());
    }

    #[test]
    fn test_from_config_missing_bundle_fails() {
        let config = StencilConfig {
            families: vec![FamilyConfig::new("txt", ".txt").with_default_bundle("absent")],
            ..StencilConfig::default()
        };
        assert!(matches!(
            TemplateRegistry::from_config(&config).unwrap_err(),
            ConfigError::MissingBundle(_)
        ));
    }

    #[test]
    fn test_register_replaces_family() {
        let source: Arc<dyn TemplateSource> = Arc::new(MemorySource::new());
        let mut registry = TemplateRegistry::with_builtin_families(Arc::clone(&source)).unwrap();
        registry.register(TemplateFactory::new(FamilyConfig::new("txt", ".text"), source).unwrap());
        assert_eq!(registry.family("txt").unwrap().extension(), ".text");
        assert_eq!(registry.families().len(), 4);
    }
}
