//! Template instances: the mutable per-render state bound to a compiled artifact.
//!
//! A [`Template`] owns its value store, attributes and resource-bundle list and
//! shares the immutable [`CompiledArtifact`] and [`TemplateBindings`] with every
//! other instance created from the same factory. It is not synchronized; use
//! [`Clone`] or a fresh instance per thread.

mod output;
mod resolve;
mod tags;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::bindings::TemplateBindings;
use crate::capability::ResourceBundle;
use crate::charset::Charset;
use crate::error::{TemplateError, TemplateResult};
use crate::model::{Block, CompiledArtifact, Dependency, FilterCaptures};
use crate::value::{InternalValue, ValueStore};

#[derive(Debug, Clone)]
pub struct Template {
    artifact: Arc<CompiledArtifact>,
    bindings: Arc<TemplateBindings>,
    encoding: Charset,
    language: Option<String>,
    store: ValueStore,
    attributes: HashMap<String, serde_json::Value>,
    bundles: Vec<Arc<dyn ResourceBundle>>,
}

impl Template {
    /// Bind a new instance to `artifact` without running initialization.
    pub fn new(artifact: Arc<CompiledArtifact>, bindings: Arc<TemplateBindings>) -> Self {
        let language = bindings.default_language().map(str::to_string);
        let bundles = bindings.default_bundles().to_vec();
        Self {
            artifact,
            bindings,
            encoding: Charset::default(),
            language,
            store: ValueStore::default(),
            attributes: HashMap::new(),
            bundles,
        }
    }

    /// Create and initialize an instance; the instance is only returned once
    /// initialization has fully succeeded.
    pub fn instantiate(
        artifact: Arc<CompiledArtifact>,
        bindings: Arc<TemplateBindings>,
        encoding: Charset,
    ) -> TemplateResult<Self> {
        let mut template = Self::new(artifact, bindings).with_encoding(encoding);
        template.initialize()?;
        Ok(template)
    }

    pub fn with_encoding(mut self, encoding: Charset) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    pub fn name(&self) -> &str {
        self.artifact.name()
    }

    pub fn full_name(&self) -> String {
        self.artifact.full_name()
    }

    pub fn family(&self) -> &str {
        self.artifact.family()
    }

    pub fn encoding(&self) -> Charset {
        self.encoding
    }

    pub fn default_content_type(&self) -> &str {
        self.bindings.default_content_type()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Change the active language. Takes effect at the next content retrieval
    /// or explicit language pass.
    pub fn set_language(&mut self, language: Option<String>) {
        self.language = language;
    }

    pub fn generation(&self) -> u64 {
        self.artifact.generation()
    }

    pub fn dependencies(&self) -> &[Dependency] {
        self.artifact.dependencies()
    }

    pub fn artifact(&self) -> &Arc<CompiledArtifact> {
        &self.artifact
    }

    pub fn bindings(&self) -> &TemplateBindings {
        &self.bindings
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    pub fn set_value(&mut self, id: &str, text: impl Into<Arc<str>>) -> TemplateResult<()> {
        self.check_value_id(id)?;
        self.store.set_fixed(id, text.into());
        Ok(())
    }

    /// Set a value to `text` run through the family encoder.
    pub fn set_value_encoded(&mut self, id: &str, text: &str) -> TemplateResult<()> {
        let encoded = self.bindings.encode(text);
        self.set_value(id, encoded)
    }

    /// Set a value to a constructed tree.
    pub fn set_value_internal(&mut self, id: &str, value: InternalValue) -> TemplateResult<()> {
        self.check_value_id(id)?;
        self.store.set_constructed(id, value);
        Ok(())
    }

    /// Append text to a set value. Appending to an unset value does nothing.
    pub fn append_value(&mut self, id: &str, text: &str) -> TemplateResult<()> {
        self.check_value_id(id)?;
        if let Some(fixed) = self.store.fixed(id) {
            let joined: Arc<str> = format!("{fixed}{text}").into();
            self.store.set_fixed(id, joined);
        } else if let Some(value) = self.store.constructed_mut(id) {
            value.append_text(text);
        }
        Ok(())
    }

    pub fn append_value_encoded(&mut self, id: &str, text: &str) -> TemplateResult<()> {
        let encoded = self.bindings.encode(text);
        self.append_value(id, &encoded)
    }

    /// Append a constructed tree as a nested part, creating the value when unset.
    pub fn append_value_internal(&mut self, id: &str, value: InternalValue) -> TemplateResult<()> {
        self.check_value_id(id)?;
        let mut target = self.take_constructed(id);
        target.append_value(value);
        self.store.set_constructed(id, target);
        Ok(())
    }

    /// Replace a value with the resolved content of `block_id`.
    pub fn set_block(&mut self, id: &str, block_id: &str) -> TemplateResult<()> {
        self.check_value_id(id)?;
        let value = self.resolve_internal_block(block_id)?;
        self.store.set_constructed(id, value);
        Ok(())
    }

    /// Append the resolved content of `block_id` to a value, creating it when
    /// unset. A fixed value is kept as leading text.
    pub fn append_block(&mut self, id: &str, block_id: &str) -> TemplateResult<()> {
        self.check_value_id(id)?;
        let block = self.resolve_internal_block(block_id)?;
        let mut target = self.take_constructed(id);
        target.extend(block);
        self.store.set_constructed(id, target);
        Ok(())
    }

    /// Append the resolved content of `block_id` to a free-standing value.
    pub fn append_block_internal(
        &self,
        target: &mut InternalValue,
        block_id: &str,
    ) -> TemplateResult<()> {
        target.extend(self.resolve_internal_block(block_id)?);
        Ok(())
    }

    pub fn create_internal_value(&self) -> InternalValue {
        InternalValue::new()
    }

    /// Current text of a value: its set content, else its compiled default.
    /// `None` when the value is unset and has no default.
    pub fn get_value(&self, id: &str) -> TemplateResult<Option<String>> {
        self.check_value_id(id)?;
        if !self.store.contains(id) && !self.artifact.tree().has_default_value(id) {
            return Ok(None);
        }
        let mut out = crate::value::ExternalValue::new();
        self.resolve_external_value(id, "", &mut out, &mut Vec::new())?;
        Ok(Some(out.to_string()))
    }

    pub fn default_value(&self, id: &str) -> Option<&str> {
        self.artifact.tree().default_value(id).map(|t| t.as_ref())
    }

    pub fn has_default_value(&self, id: &str) -> bool {
        self.artifact.tree().has_default_value(id)
    }

    pub fn has_value_id(&self, id: &str) -> bool {
        !id.is_empty() && self.artifact.tree().has_value_id(id)
    }

    /// Whether the caller set `id`; values installed by tag evaluation do not count.
    pub fn is_value_set(&self, id: &str) -> TemplateResult<bool> {
        self.check_value_id(id)?;
        Ok(self.store.is_set(id))
    }

    /// Remove a value. Removing a declared value that is not set does nothing.
    pub fn remove_value(&mut self, id: &str) -> TemplateResult<()> {
        self.check_value_id(id)?;
        self.store.remove(id);
        Ok(())
    }

    pub fn remove_values<I, S>(&mut self, ids: I) -> TemplateResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            self.remove_value(id.as_ref())?;
        }
        Ok(())
    }

    /// Set a value to the empty string.
    pub fn blank_value(&mut self, id: &str) -> TemplateResult<()> {
        self.set_value(id, "")
    }

    pub fn blank_values<I, S>(&mut self, ids: I) -> TemplateResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            self.blank_value(id.as_ref())?;
        }
        Ok(())
    }

    /// Drop every value installed by tag evaluation; caller-set values stay.
    pub fn remove_generated_values(&mut self) {
        self.store.remove_generated();
    }

    /// Number of caller-set values.
    pub fn count_values(&self) -> usize {
        self.store.count()
    }

    /// Declared values that are neither set nor backed by a compiled default.
    pub fn unset_value_ids(&self) -> Vec<&str> {
        self.artifact
            .tree()
            .value_ids()
            .iter()
            .map(String::as_str)
            .filter(|id| !self.store.contains(id) && !self.artifact.tree().has_default_value(id))
            .collect()
    }

    /// Every value id declared by the template.
    pub fn available_value_ids(&self) -> &[String] {
        self.artifact.tree().value_ids()
    }

    /// Reset all values, restore the default resource bundles and initialize again.
    pub fn clear(&mut self) -> TemplateResult<()> {
        self.store.clear();
        self.bundles = self.bindings.default_bundles().to_vec();
        self.initialize()
    }

    // ------------------------------------------------------------------
    // Blocks
    // ------------------------------------------------------------------

    pub fn has_block(&self, id: &str) -> bool {
        self.artifact.tree().has_block(id)
    }

    /// Declared block ids, root (`""`) first.
    pub fn block_ids(&self) -> impl Iterator<Item = &str> {
        self.artifact.tree().blocks().iter().map(|b| b.id())
    }

    // ------------------------------------------------------------------
    // Attributes
    // ------------------------------------------------------------------

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn attribute(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes.get(name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<serde_json::Value> {
        self.attributes.remove(name)
    }

    pub fn attributes(&self) -> &HashMap<String, serde_json::Value> {
        &self.attributes
    }

    // ------------------------------------------------------------------
    // Resource bundles
    // ------------------------------------------------------------------

    /// Append a bundle; implicit localization lookups scan bundles in order.
    pub fn add_resource_bundle(&mut self, bundle: Arc<dyn ResourceBundle>) {
        self.bundles.push(bundle);
    }

    pub fn resource_bundles(&self) -> &[Arc<dyn ResourceBundle>] {
        &self.bundles
    }

    pub fn has_resource_bundles(&self) -> bool {
        !self.bundles.is_empty()
    }

    // ------------------------------------------------------------------
    // Beans
    // ------------------------------------------------------------------

    /// Bind the fields of `bean` to the values named `prefix + field`.
    pub fn set_bean<T>(&mut self, bean: &T, prefix: Option<&str>, encode: bool) -> TemplateResult<()>
    where
        T: Serialize + ?Sized,
    {
        let handler = self.bean_handler()?;
        let bean = serde_json::to_value(bean)?;
        handler.set_bean(self, &bean, prefix, encode)
    }

    pub fn remove_bean<T>(&mut self, bean: &T, prefix: Option<&str>) -> TemplateResult<()>
    where
        T: Serialize + ?Sized,
    {
        let handler = self.bean_handler()?;
        let bean = serde_json::to_value(bean)?;
        handler.remove_bean(self, &bean, prefix)
    }

    fn bean_handler(&self) -> TemplateResult<Arc<dyn crate::capability::BeanHandler>> {
        self.bindings
            .bean_handler()
            .cloned()
            .ok_or_else(|| TemplateError::BeanHandlerUnsupported {
                template: self.name().to_string(),
            })
    }

    // ------------------------------------------------------------------
    // Filtered tags
    // ------------------------------------------------------------------

    pub fn filtered_values(&self, filter: &str) -> &[FilterCaptures] {
        self.artifact.filtered_values(filter)
    }

    pub fn filtered_blocks(&self, filter: &str) -> &[FilterCaptures] {
        self.artifact.filtered_blocks(filter)
    }

    pub fn has_filtered_values(&self, filter: &str) -> bool {
        !self.filtered_values(filter).is_empty()
    }

    pub fn has_filtered_blocks(&self, filter: &str) -> bool {
        !self.filtered_blocks(filter).is_empty()
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn check_value_id(&self, id: &str) -> TemplateResult<()> {
        if self.has_value_id(id) {
            Ok(())
        } else {
            Err(TemplateError::ValueUnknown {
                template: self.name().to_string(),
                id: id.to_string(),
            })
        }
    }

    fn block(&self, id: &str) -> TemplateResult<&Block> {
        self.artifact
            .tree()
            .block(id)
            .ok_or_else(|| TemplateError::BlockUnknown {
                template: self.name().to_string(),
                id: id.to_string(),
            })
    }

    /// Remove `id` from the store as a constructed value; a fixed value becomes
    /// its leading text part.
    fn take_constructed(&mut self, id: &str) -> InternalValue {
        let taken = if let Some(value) = self.store.constructed(id) {
            value.clone()
        } else if let Some(fixed) = self.store.fixed(id) {
            let mut value = InternalValue::new();
            value.append_text(Arc::clone(fixed));
            value
        } else {
            InternalValue::new()
        };
        self.store.remove(id);
        taken
    }
}
