//! Template factory: one per output family.

use std::path::PathBuf;
use std::sync::Arc;

use stencil_compiler::{FilterDefinition, FilterSet, TemplateCompiler};
use stencil_core::{
    BeanHandler, BundleResolver, Charset, ComponentRegistry, Encoder, JsonBeanHandler, Template,
    TemplateBindings, TemplateInitializer,
};
use tracing::debug;

use crate::config::FamilyConfig;
use crate::error::{ConfigError, FactoryError};
use crate::loader::ArtifactLoader;
use crate::persist::ArtifactStore;
use crate::source::{is_valid_name, TemplateSource};

/// Produces initialized [`Template`] instances of one family.
///
/// Collaborator bindings are shared by every template the factory produces.
/// The `with_*` builders are meant for startup; instances already handed out
/// keep the bindings they were created with.
#[derive(Debug)]
pub struct TemplateFactory {
    config: FamilyConfig,
    bindings: Arc<TemplateBindings>,
    loader: ArtifactLoader,
}

impl TemplateFactory {
    /// Factory for `config` reading sources from `source`.
    ///
    /// Fails when a filter pattern does not compile, or when the family names
    /// default bundles (those need [`Self::with_bundle_resolver`]).
    pub fn new(config: FamilyConfig, source: Arc<dyn TemplateSource>) -> Result<Self, ConfigError> {
        Self::build(config, source, None)
    }

    /// Like [`Self::new`], resolving the family's default bundles and explicit
    /// `l10n:<bundle>:<key>` tags through `resolver`.
    pub fn with_bundle_resolver(
        config: FamilyConfig,
        source: Arc<dyn TemplateSource>,
        resolver: Arc<dyn BundleResolver>,
    ) -> Result<Self, ConfigError> {
        Self::build(config, source, Some(resolver))
    }

    fn build(
        config: FamilyConfig,
        source: Arc<dyn TemplateSource>,
        resolver: Option<Arc<dyn BundleResolver>>,
    ) -> Result<Self, ConfigError> {
        let value_filters: Vec<FilterDefinition> = config.value_filters.iter().map(Into::into).collect();
        let block_filters: Vec<FilterDefinition> = config.block_filters.iter().map(Into::into).collect();
        let filters = FilterSet::with_builtins(&value_filters, &block_filters)?;
        // Artifacts persisted by another release or for another extension are stale.
        let compiler = TemplateCompiler::new(&config.identifier, &config.extension, Arc::new(filters))
            .with_extra_state(format!("{}@{}", config.extension, env!("CARGO_PKG_VERSION")));

        let mut bindings = TemplateBindings::new()
            .with_content_type(&config.content_type)
            .with_default_language(config.default_language.clone());
        if let Some(encoder) = config.encoder.encoder() {
            bindings = bindings.with_encoder(encoder);
        }
        if config.bind_beans {
            bindings = bindings.with_bean_handler(Arc::new(JsonBeanHandler));
        }
        for name in &config.default_bundles {
            let bundle = resolver
                .as_ref()
                .and_then(|r| r.resolve(name, config.default_language.as_deref()))
                .ok_or_else(|| ConfigError::MissingBundle(name.clone()))?;
            bindings = bindings.with_default_bundle(bundle);
        }
        if let Some(resolver) = resolver {
            bindings = bindings.with_bundle_resolver(resolver);
        }

        debug!(
            family = %config.identifier,
            extension = %config.extension,
            state = %compiler.modification_state(),
            "Created template factory"
        );
        Ok(Self {
            config,
            bindings: Arc::new(bindings),
            loader: ArtifactLoader::new(source, compiler),
        })
    }

    pub fn with_auto_reload(mut self, auto_reload: bool) -> Self {
        self.loader = self.loader.with_auto_reload(auto_reload);
        self
    }

    /// Persist compiled artifacts under `path` and reuse them across processes.
    pub fn with_persistence(mut self, path: impl Into<PathBuf>) -> Self {
        self.loader = self.loader.with_store(ArtifactStore::new(path));
        self
    }

    pub fn with_encoder(self, encoder: Arc<dyn Encoder>) -> Self {
        self.update_bindings(|b| b.with_encoder(encoder))
    }

    pub fn with_bean_handler(self, handler: Arc<dyn BeanHandler>) -> Self {
        self.update_bindings(|b| b.with_bean_handler(handler))
    }

    pub fn with_initializer(self, initializer: Arc<dyn TemplateInitializer>) -> Self {
        self.update_bindings(|b| b.with_initializer(initializer))
    }

    pub fn with_components(self, components: Arc<ComponentRegistry>) -> Self {
        self.update_bindings(|b| b.with_components(components))
    }

    fn update_bindings(mut self, update: impl FnOnce(TemplateBindings) -> TemplateBindings) -> Self {
        let bindings = Arc::make_mut(&mut self.bindings);
        *bindings = update(std::mem::take(bindings));
        self
    }

    /// Fresh, initialized template `name` writing UTF-8.
    pub fn get(&self, name: &str) -> Result<Template, FactoryError> {
        self.instantiate(name, Charset::Utf8)
    }

    /// Fresh, initialized template `name` writing `encoding`.
    pub fn get_with_encoding(&self, name: &str, encoding: &str) -> Result<Template, FactoryError> {
        if encoding.trim().is_empty() {
            return Err(FactoryError::InvalidEncoding(encoding.to_string()));
        }
        let charset = encoding
            .parse::<Charset>()
            .map_err(|_| FactoryError::InvalidEncoding(encoding.to_string()))?;
        self.instantiate(name, charset)
    }

    fn instantiate(&self, name: &str, charset: Charset) -> Result<Template, FactoryError> {
        if !is_valid_name(name) {
            return Err(FactoryError::InvalidName(name.to_string()));
        }
        let artifact = self.loader.load(name)?;
        let template = Template::instantiate(artifact, Arc::clone(&self.bindings), charset)?;
        Ok(template)
    }

    /// Names of every template of this family the source provides.
    pub fn template_names(&self) -> std::io::Result<Vec<String>> {
        self.loader.source().template_names(&self.config.extension)
    }

    pub fn identifier(&self) -> &str {
        &self.config.identifier
    }

    pub fn extension(&self) -> &str {
        &self.config.extension
    }

    pub fn config(&self) -> &FamilyConfig {
        &self.config
    }

    pub fn bindings(&self) -> &Arc<TemplateBindings> {
        &self.bindings
    }

    pub fn loader(&self) -> &ArtifactLoader {
        &self.loader
    }
}
