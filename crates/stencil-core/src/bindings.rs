//! Collaborators a factory copies onto every template it instantiates.

use std::sync::Arc;

use crate::capability::{
    BeanHandler, BundleResolver, ComponentRegistry, Encoder, ResourceBundle, TemplateInitializer,
};

/// Immutable-after-configuration collaborator set shared by all templates of
/// one family.
#[derive(Debug, Clone)]
pub struct TemplateBindings {
    default_content_type: String,
    default_language: Option<String>,
    encoder: Option<Arc<dyn Encoder>>,
    bean_handler: Option<Arc<dyn BeanHandler>>,
    initializer: Option<Arc<dyn TemplateInitializer>>,
    components: Arc<ComponentRegistry>,
    bundle_resolver: Option<Arc<dyn BundleResolver>>,
    default_bundles: Vec<Arc<dyn ResourceBundle>>,
}

impl Default for TemplateBindings {
    fn default() -> Self {
        Self {
            default_content_type: "text/plain".to_string(),
            default_language: None,
            encoder: None,
            bean_handler: None,
            initializer: None,
            components: Arc::new(ComponentRegistry::default()),
            bundle_resolver: None,
            default_bundles: Vec::new(),
        }
    }
}

impl TemplateBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.default_content_type = content_type.into();
        self
    }

    pub fn with_default_language(mut self, language: Option<String>) -> Self {
        self.default_language = language;
        self
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn Encoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn with_bean_handler(mut self, handler: Arc<dyn BeanHandler>) -> Self {
        self.bean_handler = Some(handler);
        self
    }

    pub fn with_initializer(mut self, initializer: Arc<dyn TemplateInitializer>) -> Self {
        self.initializer = Some(initializer);
        self
    }

    pub fn with_components(mut self, components: Arc<ComponentRegistry>) -> Self {
        self.components = components;
        self
    }

    pub fn with_bundle_resolver(mut self, resolver: Arc<dyn BundleResolver>) -> Self {
        self.bundle_resolver = Some(resolver);
        self
    }

    pub fn with_default_bundle(mut self, bundle: Arc<dyn ResourceBundle>) -> Self {
        self.default_bundles.push(bundle);
        self
    }

    pub fn default_content_type(&self) -> &str {
        &self.default_content_type
    }

    pub fn default_language(&self) -> Option<&str> {
        self.default_language.as_deref()
    }

    pub fn encoder(&self) -> Option<&Arc<dyn Encoder>> {
        self.encoder.as_ref()
    }

    pub fn bean_handler(&self) -> Option<&Arc<dyn BeanHandler>> {
        self.bean_handler.as_ref()
    }

    pub fn initializer(&self) -> Option<&Arc<dyn TemplateInitializer>> {
        self.initializer.as_ref()
    }

    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    pub fn bundle_resolver(&self) -> Option<&Arc<dyn BundleResolver>> {
        self.bundle_resolver.as_ref()
    }

    pub fn default_bundles(&self) -> &[Arc<dyn ResourceBundle>] {
        &self.default_bundles
    }

    /// Encode with the bound encoder, or return `text` unchanged.
    pub fn encode(&self, text: &str) -> String {
        match &self.encoder {
            Some(encoder) => encoder.encode(text),
            None => text.to_string(),
        }
    }

    /// Like [`encode`](Self::encode) but keeps entity references already in `text`.
    pub fn encode_defensive(&self, text: &str) -> String {
        match &self.encoder {
            Some(encoder) => encoder.encode_defensive(text),
            None => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{HtmlEncoder, MapBundle};

    #[test]
    fn test_defaults_are_identity() {
        let bindings = TemplateBindings::default();
        assert_eq!(bindings.default_content_type(), "text/plain");
        assert_eq!(bindings.encode("<b>"), "<b>");
        assert!(bindings.components().is_empty());
        assert!(bindings.default_bundles().is_empty());
    }

    #[test]
    fn test_builder_sets_collaborators() {
        let bindings = TemplateBindings::new()
            .with_content_type("text/html")
            .with_encoder(Arc::new(HtmlEncoder))
            .with_default_bundle(Arc::new(MapBundle::new("messages")));
        assert_eq!(bindings.default_content_type(), "text/html");
        assert_eq!(bindings.encode("<b>"), "&lt;b&gt;");
        assert_eq!(bindings.encode_defensive("&copy; <b>"), "&copy; &lt;b&gt;");
        assert_eq!(bindings.default_bundles().len(), 1);
    }
}
