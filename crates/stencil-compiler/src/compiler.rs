//! Compilation: include expansion, parsing and filter indexing.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use stencil_core::{CompiledArtifact, Dependency};
use tracing::debug;

use crate::error::CompileError;
use crate::filters::FilterSet;
use crate::lexer::{tokenize, Token, TokenKind};
use crate::parser::parse;

/// Source of a template pulled in by `{{i NAME/}}`.
#[derive(Debug, Clone)]
pub struct IncludedSource {
    pub content: String,
    pub modified: Option<DateTime<Utc>>,
}

/// Locates included templates by name.
pub trait IncludeResolver {
    /// `Ok(None)` when no template named `name` exists.
    fn resolve_include(&self, name: &str) -> std::io::Result<Option<IncludedSource>>;
}

/// In-memory includes without modification times.
impl IncludeResolver for HashMap<String, String> {
    fn resolve_include(&self, name: &str) -> std::io::Result<Option<IncludedSource>> {
        Ok(self.get(name).map(|content| IncludedSource {
            content: content.clone(),
            modified: None,
        }))
    }
}

/// Resolver for templates that may not include anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIncludes;

impl IncludeResolver for NoIncludes {
    fn resolve_include(&self, _name: &str) -> std::io::Result<Option<IncludedSource>> {
        Ok(None)
    }
}

/// Relative path of the source of template `name`: `.` separates directories
/// and `extension` is appended, so `pages.home` becomes `pages/home.html`.
pub fn source_path(name: &str, extension: &str) -> String {
    format!("{}{extension}", name.replace('.', "/"))
}

/// Compiles template sources of one family.
#[derive(Debug, Clone)]
pub struct TemplateCompiler {
    family: String,
    extension: String,
    filters: Arc<FilterSet>,
    extra_state: Option<String>,
}

impl TemplateCompiler {
    pub fn new(family: impl Into<String>, extension: impl Into<String>, filters: Arc<FilterSet>) -> Self {
        Self {
            family: family.into(),
            extension: extension.into(),
            filters,
            extra_state: None,
        }
    }

    /// Additional state folded into the modification-state token.
    pub fn with_extra_state(mut self, state: impl Into<String>) -> Self {
        self.extra_state = Some(state.into());
        self
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    /// Token recorded on every artifact; a cached artifact with a different
    /// token was compiled under other settings and is stale.
    pub fn modification_state(&self) -> String {
        match &self.extra_state {
            Some(extra) => format!("{}:{extra}", self.filters.fingerprint()),
            None => self.filters.fingerprint().to_string(),
        }
    }

    /// Compile the source of template `name`.
    pub fn compile(
        &self,
        name: &str,
        source: &str,
        modified: Option<DateTime<Utc>>,
        includes: &dyn IncludeResolver,
    ) -> Result<CompiledArtifact, CompileError> {
        let mut expansion = Expansion {
            includes,
            chain: vec![name.to_string()],
            dependencies: Vec::new(),
            tokens: Vec::new(),
        };
        expansion.expand(name, source)?;

        let Expansion {
            dependencies,
            tokens,
            ..
        } = expansion;
        let tree = parse(tokens)?;

        let values = self
            .filters
            .capture_values(tree.value_ids().iter().map(String::as_str));
        let blocks = self.filters.capture_blocks(
            tree.blocks()
                .iter()
                .filter(|b| !b.is_root())
                .map(|b| b.id()),
        );

        debug!(
            template = name,
            family = %self.family,
            blocks = tree.blocks().len(),
            values = tree.value_ids().len(),
            dependencies = dependencies.len(),
            "Compiled template"
        );

        Ok(CompiledArtifact::new(name, &self.family, &self.extension, tree)
            .with_filtered_values(values)
            .with_filtered_blocks(blocks)
            .with_source_modified(modified)
            .with_dependencies(dependencies)
            .with_modification_state(Some(self.modification_state())))
    }
}

/// Token-level include splicing with cycle detection.
struct Expansion<'r> {
    includes: &'r dyn IncludeResolver,
    chain: Vec<String>,
    dependencies: Vec<Dependency>,
    tokens: Vec<Token>,
}

impl Expansion<'_> {
    fn expand(&mut self, origin: &str, source: &str) -> Result<(), CompileError> {
        for token in tokenize(origin, source)? {
            let include = match &token.kind {
                TokenKind::Include { name } => Some(name.clone()),
                _ => None,
            };
            let Some(name) = include else {
                self.tokens.push(token);
                continue;
            };

            if self.chain.iter().any(|open| *open == name) {
                let mut chain = self.chain.clone();
                chain.push(name.clone());
                return Err(CompileError::IncludeCycle {
                    template: origin.to_string(),
                    chain,
                    line: token.line,
                    column: token.column,
                });
            }

            let included = self
                .includes
                .resolve_include(&name)
                .map_err(|source| CompileError::Io {
                    name: name.clone(),
                    source,
                })?
                .ok_or_else(|| CompileError::IncludeNotFound {
                    template: origin.to_string(),
                    include: name.clone(),
                    line: token.line,
                    column: token.column,
                })?;

            if !self.dependencies.iter().any(|d| d.name == name) {
                self.dependencies.push(Dependency {
                    name: name.clone(),
                    modified: included.modified,
                });
            }

            self.chain.push(name.clone());
            self.expand(&name, &included.content)?;
            self.chain.pop();
        }
        Ok(())
    }
}
