//! Content tree model: blocks, value declarations and compiled artifacts.

mod artifact;
mod block;
mod tree;

pub use artifact::{
    CompiledArtifact, Dependency, FilterCaptures, FILTER_L10N, FILTER_LANG, FILTER_RENDER,
};
pub use block::{Block, BlockPart, ROOT_BLOCK};
pub use tree::{ContentTree, ContentTreeBuilder};
