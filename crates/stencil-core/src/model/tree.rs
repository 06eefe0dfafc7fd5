//! The content tree: every block and value declaration of one compiled template.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::block::{Block, ROOT_BLOCK};

/// Read-only block graph and value declarations produced by compilation.
///
/// Shared by every [`Template`](crate::Template) created from the same
/// compiled artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "ContentTreeRepr", into = "ContentTreeRepr")]
pub struct ContentTree {
    blocks: Vec<Block>,
    block_index: HashMap<String, usize>,
    value_ids: Vec<String>,
    value_index: HashSet<String>,
    default_values: HashMap<String, Arc<str>>,
    block_values: HashSet<String>,
}

/// Flat serialized form; indexes are rebuilt on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ContentTreeRepr {
    blocks: Vec<Block>,
    value_ids: Vec<String>,
    #[serde(default)]
    default_values: HashMap<String, Arc<str>>,
    #[serde(default)]
    block_values: Vec<String>,
}

impl From<ContentTreeRepr> for ContentTree {
    fn from(repr: ContentTreeRepr) -> Self {
        let mut builder = ContentTreeBuilder::default();
        for block in repr.blocks {
            builder.add_block(block);
        }
        for id in repr.value_ids {
            builder.declare_value(&id);
        }
        for (id, text) in repr.default_values {
            builder.default_values.entry(id).or_insert(text);
        }
        builder.block_values.extend(repr.block_values);
        builder.build()
    }
}

impl From<ContentTree> for ContentTreeRepr {
    fn from(tree: ContentTree) -> Self {
        let mut block_values: Vec<String> = tree.block_values.into_iter().collect();
        block_values.sort();
        Self {
            blocks: tree.blocks,
            value_ids: tree.value_ids,
            default_values: tree.default_values,
            block_values,
        }
    }
}

impl ContentTree {
    pub fn builder() -> ContentTreeBuilder {
        ContentTreeBuilder::default()
    }

    /// Block by id; `""` is the whole template content.
    pub fn block(&self, id: &str) -> Option<&Block> {
        self.block_index.get(id).map(|&i| &self.blocks[i])
    }

    pub fn root(&self) -> Option<&Block> {
        self.block(ROOT_BLOCK)
    }

    pub fn has_block(&self, id: &str) -> bool {
        self.block_index.contains_key(id)
    }

    /// All blocks in declaration order, root first.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Declared value ids in order of first appearance.
    pub fn value_ids(&self) -> &[String] {
        &self.value_ids
    }

    pub fn has_value_id(&self, id: &str) -> bool {
        self.value_index.contains(id)
    }

    /// Literal default text declared for a value.
    pub fn default_value(&self, id: &str) -> Option<&Arc<str>> {
        self.default_values.get(id)
    }

    /// Whether `id` names a block that also serves as the default of the value `id`.
    pub fn is_block_value(&self, id: &str) -> bool {
        self.block_values.contains(id)
    }

    pub fn has_default_value(&self, id: &str) -> bool {
        self.default_values.contains_key(id) || self.is_block_value(id)
    }
}

/// Incremental constructor used by the compiler.
#[derive(Debug, Default)]
pub struct ContentTreeBuilder {
    blocks: Vec<Block>,
    value_ids: Vec<String>,
    value_index: HashSet<String>,
    default_values: HashMap<String, Arc<str>>,
    block_values: HashSet<String>,
}

impl ContentTreeBuilder {
    /// Add a block. Returns `false` when a block with the same id already exists.
    pub fn add_block(&mut self, block: Block) -> bool {
        if self.blocks.iter().any(|b| b.id() == block.id()) {
            return false;
        }
        self.blocks.push(block);
        true
    }

    pub fn has_block(&self, id: &str) -> bool {
        self.blocks.iter().any(|b| b.id() == id)
    }

    /// Declare a value id; repeated declarations keep the first position.
    pub fn declare_value(&mut self, id: &str) {
        if self.value_index.insert(id.to_string()) {
            self.value_ids.push(id.to_string());
        }
    }

    /// Record default text for a value. The first default declared wins.
    pub fn default_value(&mut self, id: &str, text: impl Into<Arc<str>>) {
        self.declare_value(id);
        self.default_values
            .entry(id.to_string())
            .or_insert_with(|| text.into());
    }

    /// Mark `id` as a block value: block `id` is the default of value `id`.
    pub fn block_value(&mut self, id: &str) {
        self.declare_value(id);
        self.block_values.insert(id.to_string());
    }

    pub fn build(mut self) -> ContentTree {
        // Root block first, the rest in declaration order.
        if let Some(pos) = self.blocks.iter().position(Block::is_root) {
            let root = self.blocks.remove(pos);
            self.blocks.insert(0, root);
        } else {
            self.blocks.insert(0, Block::new(ROOT_BLOCK, Vec::new()));
        }

        let block_index = self
            .blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id().to_string(), i))
            .collect();

        ContentTree {
            blocks: self.blocks,
            block_index,
            value_ids: self.value_ids,
            value_index: self.value_index,
            default_values: self.default_values,
            block_values: self.block_values,
        }
    }
}
