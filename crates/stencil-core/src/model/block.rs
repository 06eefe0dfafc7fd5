//! Immutable blocks: the named fragments a compiled template is made of.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Id of the block holding the whole template content.
pub const ROOT_BLOCK: &str = "";

/// One element of a block, fixed at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockPart {
    /// Literal text emitted verbatim.
    Text { text: Arc<str> },
    /// Placeholder for the value `id`; `tag` is the literal source text emitted
    /// when nothing else resolves.
    Value { id: Arc<str>, tag: Arc<str> },
}

/// A named, ordered sequence of [`BlockPart`]s.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    id: String,
    parts: Vec<BlockPart>,
}

impl Block {
    pub fn new(id: impl Into<String>, parts: Vec<BlockPart>) -> Self {
        Self {
            id: id.into(),
            parts,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parts(&self) -> &[BlockPart] {
        &self.parts
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_BLOCK
    }

    /// Ids of the value placeholders in this block, in order of appearance.
    pub fn value_ids(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|p| match p {
            BlockPart::Value { id, .. } => Some(id.as_ref()),
            BlockPart::Text { .. } => None,
        })
    }

    /// Concatenation of the literal text parts, ignoring placeholders.
    pub fn literal_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| match p {
                BlockPart::Text { text } => Some(text.as_ref()),
                BlockPart::Value { .. } => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Block {
        Block::new(
            "row",
            vec![
                BlockPart::Text { text: "<td>".into() },
                BlockPart::Value {
                    id: "cell".into(),
                    tag: "{{v cell/}}".into(),
                },
                BlockPart::Text { text: "</td>".into() },
            ],
        )
    }

    #[test]
    fn test_value_ids_in_order() {
        let block = sample();
        assert_eq!(block.value_ids().collect::<Vec<_>>(), vec!["cell"]);
        assert!(!block.is_root());
    }

    #[test]
    fn test_literal_text_skips_placeholders() {
        assert_eq!(sample().literal_text(), "<td></td>");
    }

    #[test]
    fn test_block_part_serde_shape() {
        let json = serde_json::to_value(&sample().parts()[1]).unwrap();
        assert_eq!(json["kind"], "value");
        assert_eq!(json["id"], "cell");
    }
}
