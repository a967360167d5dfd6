//! Expression language for template values.
//!
//! A string containing `${...}` is an expression. When the string is exactly
//! one `${expr}` the value keeps the expression's type; otherwise the pieces
//! are joined as text. `$${` writes a literal `${`.

mod ast;
mod lexer;
mod parser;

pub use ast::{BinaryOp, Expr, Function, UnaryOp};
use gamehost_ir::Value;
use indexmap::IndexMap;
pub use lexer::Span;
pub use parser::parse_expression;

/// A syntax error inside an expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ExprError {
    pub message: String,
    /// Byte range within the string being compiled.
    pub span: Span,
}

impl ExprError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    fn shifted(mut self, offset: usize) -> Self {
        self.span = (self.span.start + offset)..(self.span.end + offset);
        self
    }
}

/// One piece of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Expr(Expr),
}

/// A template value: literal data with expressions compiled in place.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    Literal(Value),
    /// A whole-string `${expr}`; evaluates to the expression's own type.
    Expr(Expr),
    /// Text with embedded expressions; always evaluates to a string.
    Interpolated(Vec<Segment>),
    Array(Vec<TemplateValue>),
    Object(IndexMap<String, TemplateValue>),
}

impl TemplateValue {
    /// Compile a string, splitting out `${...}` expressions.
    pub fn compile_str(text: &str) -> Result<Self, ExprError> {
        let mut segments = split_interpolation(text)?;
        if segments.len() > 1 {
            return Ok(TemplateValue::Interpolated(segments));
        }
        Ok(match segments.pop() {
            None => TemplateValue::Literal(Value::String(String::new())),
            Some(Segment::Text(text)) => TemplateValue::Literal(Value::String(text)),
            Some(Segment::Expr(expr)) => TemplateValue::Expr(expr),
        })
    }

    /// Compile a TOML value. Returns the path of the offending element on failure.
    pub fn compile(value: &toml::Value) -> Result<Self, CompileError> {
        match value {
            toml::Value::String(s) => {
                Self::compile_str(s).map_err(|error| CompileError::Expression {
                    path: String::new(),
                    text: s.clone(),
                    error,
                })
            }
            toml::Value::Integer(i) => Ok(TemplateValue::Literal(Value::Int(*i))),
            toml::Value::Boolean(b) => Ok(TemplateValue::Literal(Value::Bool(*b))),
            toml::Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| Self::compile(item).map_err(|e| e.within(&format!("[{}]", i))))
                .collect::<Result<Vec<_>, _>>()
                .map(TemplateValue::Array),
            toml::Value::Table(table) => table
                .iter()
                .map(|(key, item)| {
                    Self::compile(item)
                        .map(|v| (key.clone(), v))
                        .map_err(|e| e.within(&format!(".{}", key)))
                })
                .collect::<Result<IndexMap<_, _>, _>>()
                .map(TemplateValue::Object),
            toml::Value::Float(_) => Err(CompileError::Unsupported {
                path: String::new(),
                kind: "float",
            }),
            toml::Value::Datetime(_) => Err(CompileError::Unsupported {
                path: String::new(),
                kind: "datetime",
            }),
        }
    }

    /// The literal value, if this contains no expressions.
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            TemplateValue::Literal(v) => Some(v),
            _ => None,
        }
    }

    /// Collect the root names referenced anywhere in this value.
    pub fn collect_references(&self, out: &mut Vec<String>) {
        match self {
            TemplateValue::Literal(_) => {}
            TemplateValue::Expr(expr) => expr.collect_references(out),
            TemplateValue::Interpolated(segments) => {
                for segment in segments {
                    if let Segment::Expr(expr) = segment {
                        expr.collect_references(out);
                    }
                }
            }
            TemplateValue::Array(items) => {
                for item in items {
                    item.collect_references(out);
                }
            }
            TemplateValue::Object(map) => {
                for item in map.values() {
                    item.collect_references(out);
                }
            }
        }
    }

    /// Root names referenced anywhere in this value, in first-use order.
    pub fn references(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }
}

/// Failure while compiling a TOML value into a [`TemplateValue`].
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    Expression {
        /// Path below the compiled value, e.g. `.properties.containers[0]`.
        path: String,
        /// The raw string that failed to compile.
        text: String,
        error: ExprError,
    },
    Unsupported {
        path: String,
        kind: &'static str,
    },
}

impl CompileError {
    fn within(self, prefix: &str) -> Self {
        match self {
            CompileError::Expression { path, text, error } => CompileError::Expression {
                path: format!("{}{}", prefix, path),
                text,
                error,
            },
            CompileError::Unsupported { path, kind } => CompileError::Unsupported {
                path: format!("{}{}", prefix, path),
                kind,
            },
        }
    }

    pub fn path(&self) -> &str {
        match self {
            CompileError::Expression { path, .. } | CompileError::Unsupported { path, .. } => path,
        }
    }

    pub fn message(&self) -> String {
        match self {
            CompileError::Expression { error, .. } => error.message.clone(),
            CompileError::Unsupported { kind, .. } => {
                format!("{} values are not supported in templates", kind)
            }
        }
    }
}

/// Convert a TOML value into a plain value without compiling expressions.
///
/// Used for parameter files, where `${` has no special meaning.
pub fn value_from_toml(value: &toml::Value) -> Option<Value> {
    match value {
        toml::Value::String(s) => Some(Value::String(s.clone())),
        toml::Value::Integer(i) => Some(Value::Int(*i)),
        toml::Value::Boolean(b) => Some(Value::Bool(*b)),
        toml::Value::Array(items) => items
            .iter()
            .map(value_from_toml)
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        toml::Value::Table(table) => table
            .iter()
            .map(|(k, v)| value_from_toml(v).map(|v| (k.clone(), v)))
            .collect::<Option<IndexMap<_, _>>>()
            .map(Value::Object),
        toml::Value::Float(_) | toml::Value::Datetime(_) => None,
    }
}

/// Split text into literal and expression segments.
fn split_interpolation(text: &str) -> Result<Vec<Segment>, ExprError> {
    let bytes = text.as_bytes();
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < bytes.len() {
        if text[i..].starts_with("$${") {
            literal.push_str("${");
            i += 3;
        } else if text[i..].starts_with("${") {
            let start = i + 2;
            let end = find_closing_brace(text, start)
                .ok_or_else(|| ExprError::new("unterminated '${' in string", i..text.len()))?;
            let source = &text[start..end];
            if source.trim().is_empty() {
                return Err(ExprError::new("empty expression", i..end + 1));
            }
            let expr = parse_expression(source).map_err(|e| e.shifted(start))?;
            if !literal.is_empty() {
                segments.push(Segment::Text(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Expr(expr));
            i = end + 1;
        } else {
            let ch = text[i..].chars().next().unwrap_or_default();
            literal.push(ch);
            i += ch.len_utf8().max(1);
        }
    }

    if !literal.is_empty() {
        segments.push(Segment::Text(literal));
    }
    Ok(segments)
}

/// Find the `}` closing an expression that starts at `start`, skipping quoted strings.
fn find_closing_brace(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '{' => depth += 1,
            '}' if depth == 0 => return Some(start + offset),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}
