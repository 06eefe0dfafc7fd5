//! Block resolution: walking a block against the value store into either the
//! constructed (internal) or the flattened (external) form.
//!
//! Both forms apply the same precedence to a placeholder: a fixed value, then
//! a constructed value, then the compiled default text, then the block that
//! serves as the value's default, then the literal tag text. Tag evaluation
//! installs renderer output as fixed values before resolution runs.

use std::sync::Arc;

use super::Template;
use crate::error::{TemplateError, TemplateResult};
use crate::model::BlockPart;
use crate::value::{ExternalValue, InternalPart, InternalValue};

impl Template {
    /// Snapshot `block_id` into a constructed value.
    ///
    /// Fixed values are copied as text and constructed values are nested as
    /// copies. Placeholders of unset values stay references, so defaults and
    /// values set later are picked up when the snapshot is rendered.
    pub(crate) fn resolve_internal_block(&self, block_id: &str) -> TemplateResult<InternalValue> {
        let block = self.block(block_id)?;
        let mut result = InternalValue::new();

        for part in block.parts() {
            match part {
                BlockPart::Text { text } => result.append_text(Arc::clone(text)),
                BlockPart::Value { id, tag } => {
                    if let Some(fixed) = self.store.fixed(id) {
                        result.append_text(Arc::clone(fixed));
                    } else if let Some(constructed) = self.store.constructed(id) {
                        result.append_value(constructed.clone());
                    } else {
                        result.append_value_id(Arc::clone(id), Arc::clone(tag));
                    }
                }
            }
        }
        Ok(result)
    }

    /// Flatten `block_id` into `out`.
    pub(crate) fn resolve_external_block(
        &self,
        block_id: &str,
        out: &mut ExternalValue,
        stack: &mut Vec<String>,
    ) -> TemplateResult<()> {
        let block = self.block(block_id)?;

        for part in block.parts() {
            match part {
                BlockPart::Text { text } => out.push(Arc::clone(text)),
                BlockPart::Value { id, tag } => self.resolve_external_value(id, tag, out, stack)?,
            }
        }
        Ok(())
    }

    /// Flatten the current content of value `id` into `out`, emitting `tag`
    /// when nothing resolves. `stack` holds the values being expanded.
    pub(crate) fn resolve_external_value(
        &self,
        id: &str,
        tag: &str,
        out: &mut ExternalValue,
        stack: &mut Vec<String>,
    ) -> TemplateResult<()> {
        if stack.iter().any(|open| open == id) {
            return Err(TemplateError::CircularValue {
                template: self.name().to_string(),
                id: id.to_string(),
            });
        }

        let tree = self.artifact.tree();
        if let Some(fixed) = self.store.fixed(id) {
            out.push(Arc::clone(fixed));
        } else if let Some(constructed) = self.store.constructed(id) {
            stack.push(id.to_string());
            self.flatten_internal(constructed, out, stack)?;
            stack.pop();
        } else if let Some(default) = tree.default_value(id) {
            out.push(Arc::clone(default));
        } else if tree.is_block_value(id) && tree.has_block(id) {
            stack.push(id.to_string());
            self.resolve_external_block(id, out, stack)?;
            stack.pop();
        } else if !tag.is_empty() {
            out.push(Arc::from(tag));
        }
        Ok(())
    }

    fn flatten_internal(
        &self,
        value: &InternalValue,
        out: &mut ExternalValue,
        stack: &mut Vec<String>,
    ) -> TemplateResult<()> {
        for part in value.parts() {
            match part {
                InternalPart::Text(text) => out.push(Arc::clone(text)),
                InternalPart::Value { id, tag } => self.resolve_external_value(id, tag, out, stack)?,
                InternalPart::Nested(nested) => self.flatten_internal(nested, out, stack)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::super::test_support::*;
    use super::*;
    use crate::bindings::TemplateBindings;
    use crate::model::{Block, CompiledArtifact, ContentTree};

    fn flatten(template: &Template, block: &str) -> String {
        let mut out = ExternalValue::new();
        template
            .resolve_external_block(block, &mut out, &mut Vec::new())
            .unwrap();
        out.to_string()
    }

    #[test]
    fn test_unset_value_falls_back_to_tag() {
        let template = page();
        assert_eq!(flatten(&template, "FOOTER"), "bye {{v NAME/}}");
    }

    #[test]
    fn test_default_text_used_when_unset() {
        let template = page();
        assert_eq!(flatten(&template, ""), "<h1>Untitled</h1>{{v CONTENT/}}");
    }

    #[test]
    fn test_snapshot_sees_late_values() {
        let mut template = page();
        template.append_block("CONTENT", "ROW").unwrap();
        template.set_value("ITEM", "late").unwrap();
        assert_eq!(flatten(&template, ""), "<h1>Untitled</h1><li>late</li>");
    }

    #[test]
    fn test_snapshot_freezes_fixed_values() {
        let mut template = page();
        template.set_value("ITEM", "1").unwrap();
        template.append_block("CONTENT", "ROW").unwrap();
        template.set_value("ITEM", "2").unwrap();
        template.append_block("CONTENT", "ROW").unwrap();
        assert_eq!(
            template.get_value("CONTENT").unwrap().as_deref(),
            Some("<li>1</li><li>2</li>")
        );
    }

    #[test]
    fn test_nested_constructed_values() {
        let mut template = page();
        let mut rows = template.create_internal_value();
        template.set_value("ITEM", "a").unwrap();
        template.append_block_internal(&mut rows, "ROW").unwrap();
        template.set_value("ITEM", "b").unwrap();
        template.append_block_internal(&mut rows, "ROW").unwrap();

        let mut list = InternalValue::from("<ul>");
        list.append_value(rows);
        list.append_text("</ul>");
        template.set_value_internal("CONTENT", list).unwrap();

        assert_eq!(
            template.get_value("CONTENT").unwrap().as_deref(),
            Some("<ul><li>a</li><li>b</li></ul>")
        );
    }

    #[test]
    fn test_self_reference_is_circular() {
        let mut template = page();
        template.set_block("ITEM", "ROW").unwrap();
        let err = template.get_value("ITEM").unwrap_err();
        assert!(matches!(err, TemplateError::CircularValue { ref id, .. } if id == "ITEM"));
    }

    #[test]
    fn test_block_value_default() {
        let mut builder = ContentTree::builder();
        builder.add_block(Block::new("", vec![text("["), value("MENU"), text("]")]));
        builder.add_block(Block::new("MENU", vec![text("menu for "), value("USER")]));
        builder.block_value("MENU");
        builder.declare_value("USER");
        let artifact = Arc::new(CompiledArtifact::new("menu", "txt", ".txt", builder.build()));
        let mut template = Template::new(artifact, Arc::new(TemplateBindings::default()));

        template.set_value("USER", "ann").unwrap();
        assert_eq!(flatten(&template, ""), "[menu for ann]");
        template.set_value("MENU", "custom").unwrap();
        assert_eq!(flatten(&template, ""), "[custom]");
    }
}
