//! Error types for template value construction and rendering.

/// Failure raised by a [`Template`](crate::Template) operation.
///
/// Lookup, dispatch and localization failures are always surfaced to the
/// caller; none of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("value '{id}' is not declared in template '{template}'")]
    ValueUnknown { template: String, id: String },

    #[error("block '{id}' is not declared in template '{template}'")]
    BlockUnknown { template: String, id: String },

    #[error("value '{id}' in template '{template}' refers to itself")]
    CircularValue { template: String, id: String },

    #[error("no renderer component is registered under '{name}'")]
    RendererNotFound { name: String },

    #[error("component '{name}' does not provide the value renderer capability")]
    NotARenderer { name: String },

    #[error("renderer component '{name}' could not be instantiated: {reason}")]
    RendererInstantiation { name: String, reason: String },

    #[error("resource bundle '{name}' could not be found")]
    BundleNotFound { name: String },

    #[error("template '{template}' has no bean handler bound")]
    BeanHandlerUnsupported { template: String },

    #[error("bean cannot be bound: {0}")]
    InvalidBean(String),

    #[error("bean serialization failed: {0}")]
    BeanSerialization(#[from] serde_json::Error),

    #[error("template initializer failed: {0}")]
    Initialization(String),

    #[error("unsupported charset '{0}'")]
    UnsupportedCharset(String),

    #[error("character {character:?} cannot be written as {charset}")]
    Unmappable { charset: String, character: char },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the core crate.
pub type TemplateResult<T> = Result<T, TemplateError>;
