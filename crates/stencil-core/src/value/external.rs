//! Flattened content: the terminal form handed to writers and streaming producers.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use crate::charset::Charset;
use crate::error::TemplateError;

/// Ordered sequence of text fragments produced by resolving a block or value.
///
/// Fragments are shared with the compiled artifact and the value store, so
/// building this sequence does not copy template text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalValue {
    parts: Vec<Arc<str>>,
}

impl ExternalValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: Arc<str>) {
        if !text.is_empty() {
            self.parts.push(text);
        }
    }

    pub fn parts(&self) -> &[Arc<str>] {
        &self.parts
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Total length in bytes of all fragments.
    pub fn text_len(&self) -> usize {
        self.parts.iter().map(|p| p.len()).sum()
    }

    /// Encode every fragment before anything is written, so an unmappable
    /// character leaves the writer untouched.
    pub fn encode(&self, charset: Charset) -> Result<Vec<u8>, TemplateError> {
        let mut bytes = Vec::with_capacity(self.text_len());
        for part in &self.parts {
            bytes.extend_from_slice(&charset.encode(part)?);
        }
        Ok(bytes)
    }

    pub fn write_to<W: Write + ?Sized>(
        &self,
        writer: &mut W,
        charset: Charset,
    ) -> Result<(), TemplateError> {
        let bytes = self.encode(charset)?;
        writer.write_all(&bytes)?;
        Ok(())
    }
}

impl fmt::Display for ExternalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            f.write_str(part)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ExternalValue {
    type Item = &'a Arc<str>;
    type IntoIter = std::slice::Iter<'a, Arc<str>>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
}
