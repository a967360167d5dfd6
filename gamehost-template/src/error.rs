use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for template operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Holds the source content and filename so error factories don't need
/// both passed separately.
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    /// Create a new source context.
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    /// Get the source content.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Get the filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// Create a parse error from a toml error.
    pub fn parse_error(&self, source: toml::de::Error) -> Box<Error> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Parse {
            src: self.named_source(),
            span,
            source,
        })
    }

    /// Create a validation error, optionally pointing at a span.
    pub fn validation_error(
        &self,
        message: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::Validation {
            src: self.named_source(),
            span,
            message: message.into(),
        })
    }

    /// Create an expression syntax error.
    pub fn expression_error(
        &self,
        location: impl Into<String>,
        message: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::Expression {
            src: self.named_source(),
            span,
            location: location.into(),
            message: message.into(),
        })
    }

    /// Create a reserved name error.
    pub fn reserved_name_error(
        &self,
        name: impl Into<String>,
        context: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::ReservedName {
            src: self.named_source(),
            span,
            name: name.into(),
            context: context.into(),
        })
    }

    /// Create an invalid identifier error.
    pub fn invalid_identifier_error(
        &self,
        name: impl Into<String>,
        context: impl Into<String>,
        reason: impl Into<String>,
        span: Option<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::InvalidIdentifier {
            src: self.named_source(),
            span,
            name: name.into(),
            context: context.into(),
            reason: reason.into(),
        })
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(
        code(gamehost::io),
        help("run 'gamehost list' to see the built-in templates")
    )]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown built-in template '{name}'")]
    #[diagnostic(code(gamehost::unknown_builtin), help("available templates: {available}"))]
    UnknownBuiltin { name: String, available: String },

    #[error("failed to parse {}", src.name())]
    #[diagnostic(code(gamehost::parse_error))]
    Parse {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid expression in '{location}': {message}")]
    #[diagnostic(
        code(gamehost::expression),
        help("expressions are written as ${{...}}; use $${{ for a literal '${{'")
    )]
    Expression {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        location: String,
        message: String,
    },

    #[error("{message}")]
    #[diagnostic(code(gamehost::validation_error))]
    Validation {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },

    #[error("'{name}' is a reserved name")]
    #[diagnostic(
        code(gamehost::reserved_name),
        help("rename the {context} '{name}', e.g. '{name}Value'")
    )]
    ReservedName {
        #[source_code]
        src: NamedSource<String>,
        #[label("reserved name used here")]
        span: Option<SourceSpan>,
        name: String,
        context: String,
    },

    #[error("invalid {context} name '{name}'")]
    #[diagnostic(
        code(gamehost::invalid_identifier),
        help("{reason}. Use only letters, numbers, and underscores, starting with a letter.")
    )]
    InvalidIdentifier {
        #[source_code]
        src: NamedSource<String>,
        #[label("invalid identifier")]
        span: Option<SourceSpan>,
        name: String,
        context: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_carries_span() {
        let ctx = SourceContext::new("[template\nname = 1", "bad.toml");
        let toml_err = toml::from_str::<toml::Table>(ctx.src()).unwrap_err();
        let err = ctx.parse_error(toml_err);
        assert!(matches!(*err, Error::Parse { span: Some(_), .. }));
        assert_eq!(err.to_string(), "failed to parse bad.toml");
    }

    #[test]
    fn test_expression_error_message() {
        let ctx = SourceContext::new("", "template.toml");
        let err = ctx.expression_error("variables.maxMemory", "unknown function 'lower'", None);
        assert_eq!(
            err.to_string(),
            "invalid expression in 'variables.maxMemory': unknown function 'lower'"
        );
    }
}
