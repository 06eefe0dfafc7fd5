//! Constructed values: tree-preserving content built from text, block
//! snapshots and nested values.

use std::sync::Arc;

/// One element of a constructed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalPart {
    Text(Arc<str>),
    /// A placeholder left unresolved when a block was appended; resolved
    /// against the value store each time the value is rendered.
    Value { id: Arc<str>, tag: Arc<str> },
    Nested(InternalValue),
}

/// Ordered, mutable list of parts held by a constructed value.
///
/// Rendering flattens the parts against the template's current values, so a
/// placeholder appended while its value was unset picks up whatever the value
/// holds at render time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InternalValue {
    parts: Vec<InternalPart>,
}

impl InternalValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_text(&mut self, text: impl Into<Arc<str>>) {
        let text = text.into();
        if !text.is_empty() {
            self.parts.push(InternalPart::Text(text));
        }
    }

    /// Append another constructed value as a nested part.
    pub fn append_value(&mut self, value: InternalValue) {
        self.parts.push(InternalPart::Nested(value));
    }

    pub(crate) fn append_value_id(&mut self, id: Arc<str>, tag: Arc<str>) {
        self.parts.push(InternalPart::Value { id, tag });
    }

    pub(crate) fn extend(&mut self, other: InternalValue) {
        self.parts.extend(other.parts);
    }

    pub fn parts(&self) -> &[InternalPart] {
        &self.parts
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn clear(&mut self) {
        self.parts.clear();
    }
}

impl From<&str> for InternalValue {
    fn from(text: &str) -> Self {
        let mut value = Self::new();
        value.append_text(text);
        value
    }
}
