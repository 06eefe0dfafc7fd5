//! Content retrieval: whole-template and single-block output.

use std::io::Write;

use super::Template;
use crate::charset::Charset;
use crate::error::TemplateResult;
use crate::model::ROOT_BLOCK;
use crate::value::ExternalValue;

impl Template {
    /// Evaluate all tags and flatten the whole template.
    ///
    /// Values generated by the tag passes are removed before returning, on
    /// success and on failure.
    pub fn get_deferred_content(&mut self) -> TemplateResult<ExternalValue> {
        let result = self
            .evaluate_all_tags()
            .and_then(|()| self.get_deferred_block(ROOT_BLOCK));
        self.store.remove_generated();
        result
    }

    pub fn get_content(&mut self) -> TemplateResult<String> {
        Ok(self.get_deferred_content()?.to_string())
    }

    /// Write the whole template in `charset`, or in the template's encoding
    /// when `None`. Nothing is written unless the content resolves and encodes.
    pub fn write_content<W>(&mut self, writer: &mut W, charset: Option<&str>) -> TemplateResult<()>
    where
        W: Write + ?Sized,
    {
        let charset = self.output_charset(charset)?;
        let content = self.get_deferred_content()?;
        content.write_to(writer, charset)
    }

    /// Flatten one block without running the tag passes.
    pub fn get_deferred_block(&self, id: &str) -> TemplateResult<ExternalValue> {
        let mut out = ExternalValue::new();
        self.resolve_external_block(id, &mut out, &mut Vec::new())?;
        Ok(out)
    }

    pub fn get_block(&self, id: &str) -> TemplateResult<String> {
        Ok(self.get_deferred_block(id)?.to_string())
    }

    pub fn write_block<W>(&self, writer: &mut W, id: &str, charset: Option<&str>) -> TemplateResult<()>
    where
        W: Write + ?Sized,
    {
        let charset = self.output_charset(charset)?;
        self.get_deferred_block(id)?.write_to(writer, charset)
    }

    fn output_charset(&self, requested: Option<&str>) -> TemplateResult<Charset> {
        match requested {
            Some(name) => name.parse(),
            None => Ok(self.encoding),
        }
    }
}
