//! Validation context and utilities for template parsing.

use std::sync::Arc;

use miette::SourceSpan;

use crate::{Result, error::SourceContext, expr::CompileError};

/// Names an expression resolves on its own, so no declaration may use them.
pub const RESERVED_NAMES: &[&str] = &["true", "false", "null", "item", "index"];

/// Parsing and validation context that carries source information.
///
/// Holds the shared source plus the current path through the template
/// (e.g. `["resources", "share"]`) so nested checks can report where they
/// failed.
#[derive(Debug, Clone)]
pub struct ParseContext<'a> {
    source: Arc<SourceContext>,
    path: Vec<&'a str>,
}

impl<'a> ParseContext<'a> {
    pub fn new(src: &str, filename: &str) -> Self {
        Self {
            source: Arc::new(SourceContext::new(src, filename)),
            path: Vec::new(),
        }
    }

    pub fn src(&self) -> &str {
        self.source.src()
    }

    pub fn filename(&self) -> &str {
        self.source.filename()
    }

    /// Get the source context for error creation.
    pub fn source_context(&self) -> &SourceContext {
        &self.source
    }

    /// Push a path segment and return a new context.
    pub fn push(&self, segment: &'a str) -> Self {
        let mut path = self.path.clone();
        path.push(segment);
        Self {
            source: Arc::clone(&self.source),
            path,
        }
    }

    /// Current path joined with dots, e.g. `resources.share`.
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }

    /// Context description for error messages, e.g. "parameter" or
    /// "field in 'resources.share'".
    pub fn context_for(&self, kind: &str) -> String {
        if self.path.is_empty() {
            kind.to_string()
        } else {
            format!("{} in '{}'", kind, self.path_string())
        }
    }

    /// Path below this context, e.g. `resources.share.name`.
    pub fn location(&self, field: &str) -> String {
        if self.path.is_empty() {
            field.to_string()
        } else if field.is_empty() || field.starts_with('.') || field.starts_with('[') {
            format!("{}{}", self.path_string(), field)
        } else {
            format!("{}.{}", self.path_string(), field)
        }
    }

    pub fn find_span(&self, name: &str) -> Option<SourceSpan> {
        find_name_span(self.source.src(), name)
    }

    /// Validate that a name can be referenced from expressions.
    pub fn validate_name(&self, name: &str, kind: &str) -> Result<()> {
        if RESERVED_NAMES.contains(&name) {
            return Err(self.source.reserved_name_error(
                name,
                self.context_for(kind),
                self.find_span(name),
            ));
        }

        if let Some(reason) = validate_identifier(name) {
            return Err(self.source.invalid_identifier_error(
                name,
                self.context_for(kind),
                reason,
                self.find_span(name),
            ));
        }

        Ok(())
    }

    /// Create a validation error for this context, pointing at `name` if it
    /// can be found in the source.
    pub fn error(&self, message: impl Into<String>, name: &str) -> Box<crate::Error> {
        let span = self
            .path
            .last()
            .and_then(|last| find_key_span(self.source.src(), last, name))
            .or_else(|| self.find_span(name));
        self.source.validation_error(message, span)
    }

    /// Convert a compile failure for `field` into an error pointing into the
    /// offending string.
    pub fn compile_error(&self, field: &str, error: CompileError) -> Box<crate::Error> {
        let location = self.location(&format!("{}{}", field, error.path()));
        match &error {
            CompileError::Expression { text, error: e, .. } => {
                let span = find_string_span(self.source.src(), text).map(|start| {
                    SourceSpan::from((start + e.span.start, e.span.end - e.span.start))
                });
                self.source.expression_error(location, &e.message, span)
            }
            CompileError::Unsupported { .. } => {
                self.source
                    .expression_error(location, error.message(), self.find_span(field))
            }
        }
    }
}

/// Find the span of a declared name in the TOML source, e.g. `share` in
/// `[resources.share]`.
pub(crate) fn find_name_span(src: &str, name: &str) -> Option<SourceSpan> {
    let header_patterns = [format!(".{}]", name), format!(".{}.", name)];
    for pattern in &header_patterns {
        if let Some(pos) = src.find(pattern) {
            return Some(SourceSpan::from((pos + 1, name.len())));
        }
    }

    let key_patterns = [format!("\n{} =", name), format!("\n{}=", name)];
    for pattern in &key_patterns {
        if let Some(pos) = src.find(pattern) {
            return Some(SourceSpan::from((pos + 1, name.len())));
        }
    }

    None
}

/// Find `key` inside the table for `section`, e.g. `secure` under
/// `[parameters.curseForgeApiKey]`.
fn find_key_span(src: &str, section: &str, key: &str) -> Option<SourceSpan> {
    let header = format!(".{}]", section);
    let table_start = src.find(&header)? + header.len();
    let table = &src[table_start..];
    let table_end = table.find("\n[").unwrap_or(table.len());
    let body = &table[..table_end];

    let pattern = format!("\n{} ", key);
    let pos = body.find(&pattern).or_else(|| body.find(&format!("\n{}=", key)))?;
    Some(SourceSpan::from((table_start + pos + 1, key.len())))
}

/// Find the byte offset where the contents of a quoted string start.
fn find_string_span(src: &str, text: &str) -> Option<usize> {
    ['"', '\'']
        .iter()
        .find_map(|quote| src.find(&format!("{}{}{}", quote, text, quote)))
        .map(|pos| pos + 1)
}

/// Check that a name is a usable identifier. Returns the reason if not.
///
/// Names may contain letters, digits and underscores and must start with a
/// letter. Dashes are rejected because `a-b` reads as subtraction.
pub(crate) fn validate_identifier(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();

    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        Some(_) => return Some("name must start with a letter"),
        None => return Some("name cannot be empty"),
    }

    if chars.any(|c| c == '-') {
        return Some("name cannot contain dashes, they read as subtraction in expressions");
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Some("name must contain only letters, numbers, and underscores");
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_valid_identifiers() {
        assert!(validate_identifier("location").is_none());
        assert!(validate_identifier("memoryInGB").is_none());
        assert!(validate_identifier("file_share_2").is_none());
    }

    #[test]
    fn test_invalid_identifiers() {
        assert_eq!(validate_identifier(""), Some("name cannot be empty"));
        assert_eq!(
            validate_identifier("1share"),
            Some("name must start with a letter")
        );
        assert_eq!(
            validate_identifier("_hidden"),
            Some("name must start with a letter")
        );
        assert!(validate_identifier("file-share").is_some());
        assert!(validate_identifier("file.share").is_some());
    }

    #[test]
    fn test_reserved_name() {
        let src = "[parameters.item]\ntype = \"string\"\n";
        let ctx = ParseContext::new(src, "template.toml");
        let err = ctx.validate_name("item", "parameter").unwrap_err();
        let Error::ReservedName { span, .. } = *err else {
            panic!("expected reserved name error");
        };
        assert_eq!(span, Some(SourceSpan::from((12, 4))));
    }

    #[test]
    fn test_context_for_nested() {
        let ctx = ParseContext::new("", "template.toml");
        assert_eq!(ctx.context_for("parameter"), "parameter");
        let nested = ctx.push("resources").push("share");
        assert_eq!(nested.context_for("field"), "field in 'resources.share'");
        assert_eq!(nested.location("name"), "resources.share.name");
        assert_eq!(
            nested.location(".properties.osType"),
            "resources.share.properties.osType"
        );
    }

    #[test]
    fn test_find_name_span_header() {
        let src = "[resources.fileService]\ntype = \"x/y\"";
        let span = find_name_span(src, "fileService").unwrap();
        assert_eq!(span.offset(), 11);
        assert_eq!(span.len(), 11);
    }

    #[test]
    fn test_find_name_span_key() {
        let src = "[variables]\nmaxMemory = \"${memoryInGB - 1}G\"";
        let span = find_name_span(src, "maxMemory").unwrap();
        assert_eq!(span.offset(), 12);
    }

    #[test]
    fn test_find_key_span_within_section() {
        let src = "[parameters.a]\nsecure = true\n\n[parameters.b]\nsecure = true\n";
        let span = find_key_span(src, "b", "secure").unwrap();
        assert_eq!(span.offset(), 45);
    }

    #[test]
    fn test_find_string_span() {
        let src = "name = \"${toLower(x)}\"";
        assert_eq!(find_string_span(src, "${toLower(x)}"), Some(8));
        assert_eq!(find_string_span(src, "missing"), None);
    }
}
