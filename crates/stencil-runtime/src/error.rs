//! Error types for loading, instantiating and configuring templates.

use std::path::PathBuf;

use stencil_compiler::{CompileError, FilterError};
use stencil_core::TemplateError;

/// Failure to produce a compiled artifact for a template name.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("template '{name}' not found in family '{family}'")]
    NotFound { name: String, family: String },

    #[error("failed to compile template '{name}': {source}")]
    Compile {
        name: String,
        #[source]
        source: CompileError,
    },

    #[error("failed to persist compiled template to '{}': {source}", path.display())]
    Persist {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to read template '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a factory or registry `get`.
#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("invalid template name '{0}'")]
    InvalidName(String),

    #[error("invalid encoding '{0}'")]
    InvalidEncoding(String),

    #[error("unknown template family '{0}'")]
    UnknownFamily(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Configuration-time failure; raised while building factories and registries.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    InvalidFilterPattern(#[from] FilterError),

    #[error("resource bundle '{0}' could not be found")]
    MissingBundle(String),

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
