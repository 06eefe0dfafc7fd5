//! Tag evaluation: renderer dispatch, localization and language variants.
//!
//! Each pass installs its results as generated values and skips ids the
//! caller set explicitly. Generated values are purged after every full
//! content retrieval, so the passes re-run against current state.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use super::Template;
use crate::capability::ResourceBundle;
use crate::error::{TemplateError, TemplateResult};
use crate::model::{FILTER_L10N, FILTER_LANG, FILTER_RENDER};

impl Template {
    /// Run the localization and language passes, then the family initializer.
    pub fn initialize(&mut self) -> TemplateResult<()> {
        self.evaluate_l10n_tags()?;
        self.evaluate_lang_tags()?;
        if let Some(initializer) = self.bindings.initializer().cloned() {
            initializer.initialize(self)?;
        }
        Ok(())
    }

    /// Dispatch every `render:<name>[:<differentiator>]` value to its renderer.
    pub fn evaluate_render_tags(&mut self) -> TemplateResult<()> {
        let artifact = Arc::clone(&self.artifact);
        for captures in artifact.filtered_values(FILTER_RENDER) {
            let id = captures.id.as_str();
            if self.store.is_set(id) {
                continue;
            }
            let Some(renderer) = captures.group(1) else {
                continue;
            };
            let text = self.bindings.components().dispatch_render(
                renderer,
                self,
                id,
                captures.group(2),
            )?;
            self.store.set_fixed(id, text.into());
            self.store.mark_generated(id);
        }
        Ok(())
    }

    /// Substitute every `l10n:[<bundle>:]<key>` value from the resource bundles.
    ///
    /// An explicitly named bundle is looked up among the attached bundles and
    /// then through the family's bundle resolver; when neither has it the pass
    /// fails. A key no bundle knows leaves the placeholder to its fallback.
    /// Family default bundles follow the active language, and the text is
    /// encoded without touching entity references it already carries.
    pub fn evaluate_l10n_tags(&mut self) -> TemplateResult<()> {
        let artifact = Arc::clone(&self.artifact);
        for captures in artifact.filtered_values(FILTER_L10N) {
            let id = captures.id.as_str();
            if self.store.is_set(id) {
                continue;
            }
            let Some(key) = captures.group(2) else {
                continue;
            };

            let text = match captures.group(1) {
                Some(bundle_name) => {
                    let bundle = self.find_bundle(bundle_name)?;
                    bundle.get(key).map(str::to_string)
                }
                None => self
                    .bundles
                    .iter()
                    .find_map(|bundle| self.localized(bundle).get(key).map(str::to_string)),
            };

            match text {
                Some(text) => {
                    let encoded = self.bindings.encode_defensive(&text);
                    self.store.set_fixed(id, encoded.into());
                    self.store.mark_generated(id);
                }
                None => {
                    debug!(template = self.name(), key, "No localized text found");
                    if self.store.is_generated(id) {
                        self.store.remove(id);
                    }
                }
            }
        }
        Ok(())
    }

    /// Install the `lang:<name>:<languages>` block matching the active
    /// language into every `lang:<name>` value.
    pub fn evaluate_lang_tags(&mut self) -> TemplateResult<()> {
        self.evaluate_lang(None)
    }

    /// Language pass restricted to the value `id`.
    pub fn evaluate_lang_tag(&mut self, id: &str) -> TemplateResult<()> {
        self.check_value_id(id)?;
        self.evaluate_lang(Some(id))
    }

    fn evaluate_lang(&mut self, only: Option<&str>) -> TemplateResult<()> {
        let artifact = Arc::clone(&self.artifact);
        let blocks = artifact.filtered_blocks(FILTER_LANG);
        if blocks.is_empty() {
            return Ok(());
        }

        let in_scope = |value_id: &str| only.map_or(true, |scope| scope == value_id);

        // Variants installed for a previous language must not linger.
        for captures in artifact.filtered_values(FILTER_LANG) {
            if in_scope(&captures.id) && self.store.is_generated(&captures.id) {
                self.store.remove(&captures.id);
            }
        }

        let Some(language) = self.language.clone() else {
            return Ok(());
        };

        let mut installed = HashSet::new();
        for captures in blocks {
            let (Some(name), Some(labels)) = (captures.group(1), captures.group(2)) else {
                continue;
            };
            let value_id = format!("{FILTER_LANG}:{name}");
            if !in_scope(&value_id)
                || !self.has_value_id(&value_id)
                || installed.contains(&value_id)
                || self.store.is_set(&value_id)
            {
                continue;
            }
            let matches = labels
                .split(',')
                .any(|label| label.trim().eq_ignore_ascii_case(&language));
            if !matches {
                continue;
            }

            let content = self.resolve_internal_block(&captures.id)?;
            self.store.set_constructed(&value_id, content);
            self.store.mark_generated(&value_id);
            installed.insert(value_id);
        }
        Ok(())
    }

    /// Run all three passes in the order content retrieval uses.
    pub(crate) fn evaluate_all_tags(&mut self) -> TemplateResult<()> {
        self.evaluate_render_tags()?;
        self.evaluate_l10n_tags()?;
        self.evaluate_lang_tags()
    }

    fn find_bundle(&self, name: &str) -> TemplateResult<Arc<dyn ResourceBundle>> {
        if let Some(bundle) = self.bundles.iter().find(|b| b.name() == name) {
            return Ok(self.localized(bundle));
        }
        self.bindings
            .bundle_resolver()
            .and_then(|resolver| resolver.resolve(name, self.language()))
            .ok_or_else(|| TemplateError::BundleNotFound {
                name: name.to_string(),
            })
    }

    /// Default bundles are resolved in the family language when the factory is
    /// built; re-resolve them for the active language. Bundles the caller
    /// attached are used as given.
    fn localized(&self, bundle: &Arc<dyn ResourceBundle>) -> Arc<dyn ResourceBundle> {
        let is_default = self
            .bindings
            .default_bundles()
            .iter()
            .any(|default| Arc::ptr_eq(default, bundle));
        if !is_default {
            return Arc::clone(bundle);
        }
        self.bindings
            .bundle_resolver()
            .and_then(|resolver| resolver.resolve(bundle.name(), self.language()))
            .unwrap_or_else(|| Arc::clone(bundle))
    }
}
