//! Renderer components resolved by name from `render:` value tags.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{TemplateError, TemplateResult};
use crate::template::Template;

/// Produces the text of a value carrying a `render:<name>[:<differentiator>]` tag.
pub trait ValueRenderer: Send + Sync + fmt::Debug {
    fn render(&self, template: &Template, value_id: &str, differentiator: Option<&str>) -> String;
}

/// A named plug-in. Capabilities are advertised through the `as_*` accessors
/// instead of being assumed from the registration name.
pub trait Component: Send + Sync + fmt::Debug {
    fn as_value_renderer(&self) -> Option<&dyn ValueRenderer> {
        None
    }
}

/// Instantiates a component; an `Err` carries the reason instantiation failed.
pub type ComponentFactory = Arc<dyn Fn() -> Result<Arc<dyn Component>, String> + Send + Sync>;

/// Component wrapper for a plain [`ValueRenderer`].
#[derive(Debug)]
pub struct RendererComponent<R> {
    renderer: R,
}

impl<R: ValueRenderer> RendererComponent<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }
}

impl<R: ValueRenderer> Component for RendererComponent<R> {
    fn as_value_renderer(&self) -> Option<&dyn ValueRenderer> {
        Some(&self.renderer)
    }
}

/// Mapping from component name to factory.
#[derive(Clone, Default)]
pub struct ComponentRegistry {
    factories: HashMap<String, ComponentFactory>,
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("ComponentRegistry")
            .field("components", &names)
            .finish()
    }
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Arc<dyn Component>, String> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
    }

    /// Register a renderer shared by every dispatch under `name`.
    pub fn register_renderer<R>(&mut self, name: impl Into<String>, renderer: R)
    where
        R: ValueRenderer + 'static,
    {
        let component: Arc<dyn Component> = Arc::new(RendererComponent::new(renderer));
        self.register(name, move || Ok(Arc::clone(&component)));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Instantiate the component `name` and render `value_id` with it.
    pub fn dispatch_render(
        &self,
        name: &str,
        template: &Template,
        value_id: &str,
        differentiator: Option<&str>,
    ) -> TemplateResult<String> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| TemplateError::RendererNotFound {
                name: name.to_string(),
            })?;

        let component = factory().map_err(|reason| TemplateError::RendererInstantiation {
            name: name.to_string(),
            reason,
        })?;

        let renderer = component
            .as_value_renderer()
            .ok_or_else(|| TemplateError::NotARenderer {
                name: name.to_string(),
            })?;

        debug!(renderer = name, value_id, "Dispatching value renderer");
        Ok(renderer.render(template, value_id, differentiator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Plain;

    impl Component for Plain {}

    #[test]
    fn test_component_is_object_safe() {
        fn _assert_object_safe(_: &dyn Component) {}
        fn _assert_renderer_object_safe(_: &dyn ValueRenderer) {}
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = ComponentRegistry::new();
        assert!(registry.is_empty());
        registry.register("plain", || Ok(Arc::new(Plain) as Arc<dyn Component>));
        assert!(registry.contains("plain"));
        assert!(!registry.contains("other"));
        assert_eq!(registry.len(), 1);
        assert!(format!("{registry:?}").contains("plain"));
    }
}
