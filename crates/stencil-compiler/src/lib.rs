//! # stencil-compiler
//!
//! Turns Stencil template sources into [`CompiledArtifact`](stencil_core::CompiledArtifact)s.
//!
//! ## Grammar
//!
//! | Tag | Meaning |
//! |---|---|
//! | `{{v NAME/}}` | value placeholder |
//! | `{{v NAME}}text{{/v}}` | value placeholder with default text |
//! | `{{b NAME}}...{{/b}}` | block definition |
//! | `{{bv NAME}}...{{/bv}}` | block that is also the default of value `NAME` |
//! | `{{i NAME/}}` | include another template of the same family |
//! | `{{c}}...{{/c}}` | comment |
//!
//! Names are bare words or quoted strings. Any other `{{` is literal text.

mod compiler;
mod error;
mod filters;
mod lexer;
mod parser;

pub use compiler::{source_path, IncludeResolver, IncludedSource, NoIncludes, TemplateCompiler};
pub use error::{CompileError, FilterError};
pub use filters::{FilterDefinition, FilterSet, BUILTIN_BLOCK_FILTERS, BUILTIN_VALUE_FILTERS};
