//! Error types for template compilation and filter construction.

/// Failure to turn a template source into a compiled artifact.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("{template}:{line}:{column}: {message}")]
    Syntax {
        template: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("{template}:{line}:{column}: included template '{include}' not found")]
    IncludeNotFound {
        template: String,
        include: String,
        line: usize,
        column: usize,
    },

    #[error("{template}:{line}:{column}: include cycle {}", chain.join(" -> "))]
    IncludeCycle {
        template: String,
        chain: Vec<String>,
        line: usize,
        column: usize,
    },

    #[error("failed to read included template '{name}': {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl CompileError {
    pub(crate) fn syntax(template: &str, (line, column): (usize, usize), message: impl Into<String>) -> Self {
        CompileError::Syntax {
            template: template.to_string(),
            line,
            column,
            message: message.into(),
        }
    }
}

/// A filter pattern that does not compile.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("invalid pattern for filter '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}
