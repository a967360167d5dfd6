//! Built-in template functions.

use gamehost_ir::{RuntimeRef, SecureValue, Value};
use gamehost_template::expr::{Expr, Function};
use indexmap::IndexMap;
use sha2::{Digest, Sha256};

use super::{Evaluator, Local, ops::TextBuilder};
use crate::{ResolveError, Result};

const UNIQUE_STRING_LEN: usize = 13;
const UNIQUE_STRING_ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

pub(super) fn call(
    ev: &mut Evaluator<'_>,
    function: Function,
    args: &[Expr],
    local: &Local,
) -> Result<Value> {
    let location = local.location();
    match function {
        Function::ListKeys => {
            let instance = ev.resource_argument(&args[0], function.name(), local)?;
            let id = ev.resource_id(&instance)?;
            let api_version = &ev.template.resources[&instance.symbol].api_version;
            return Ok(Value::Runtime(RuntimeRef::new(format!(
                "listKeys('{}', '{}')",
                id, api_version
            ))));
        }
        Function::ResourceId => {
            let instance = ev.resource_argument(&args[0], function.name(), local)?;
            return ev.resource_id(&instance).map(Value::String);
        }
        Function::ResourceGroup => {
            let scope = ev.scope();
            let mut group = IndexMap::new();
            group.insert("id".to_string(), Value::String(scope.resource_group_id()));
            group.insert("name".to_string(), Value::String(scope.resource_group.clone()));
            group.insert("location".to_string(), Value::String(scope.location.clone()));
            return Ok(Value::Object(group));
        }
        _ => {}
    }

    let values = args
        .iter()
        .map(|arg| ev.eval(arg, local))
        .collect::<Result<Vec<_>>>()?;
    apply(function, values, location)
}

fn wrong_type(function: Function, value: &Value, location: &str) -> ResolveError {
    ResolveError::type_mismatch(
        location,
        format!(
            "'{}' does not accept {}",
            function.name(),
            value.type_name()
        ),
    )
}

/// Apply a text transformation, keeping secure input secure.
fn map_text(
    function: Function,
    value: Value,
    location: &str,
    f: impl Fn(&str) -> String,
) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(f(&s))),
        Value::Secure(secure) => Ok(Value::Secure(SecureValue::derived(
            secure.sources().to_vec(),
            f(secure.secret().expose()),
        ))),
        other => Err(wrong_type(function, &other, location)),
    }
}

fn apply(function: Function, values: Vec<Value>, location: &str) -> Result<Value> {
    let mut args = values.into_iter();
    let mut next = || args.next().unwrap_or(Value::Null);

    match function {
        Function::ToLower => map_text(function, next(), location, str::to_lowercase),
        Function::ToUpper => map_text(function, next(), location, str::to_uppercase),

        Function::Concat => {
            let first = next();
            let rest: Vec<Value> = std::iter::from_fn(|| args.next()).collect();
            concat(first, rest, location)
        }

        Function::Union => {
            let first = next();
            let rest: Vec<Value> = std::iter::from_fn(|| args.next()).collect();
            union(first, rest, location)
        }

        Function::Join => {
            let items = next();
            let delimiter = next();
            let (Value::Array(items), Value::String(delimiter)) = (&items, &delimiter) else {
                return Err(ResolveError::type_mismatch(
                    location,
                    format!(
                        "'join' expects an array and a string, found {} and {}",
                        items.type_name(),
                        delimiter.type_name()
                    ),
                ));
            };
            let mut text = TextBuilder::default();
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    text.push_str(delimiter);
                }
                text.push(item, location)?;
            }
            Ok(text.finish())
        }

        Function::Length => match next() {
            Value::String(s) => Ok(Value::Int(s.chars().count() as i64)),
            Value::Array(items) => Ok(Value::Int(items.len() as i64)),
            Value::Object(map) => Ok(Value::Int(map.len() as i64)),
            other => Err(wrong_type(function, &other, location)),
        },

        Function::Take => {
            let collection = next();
            let count = match next() {
                Value::Int(n) => usize::try_from(n).unwrap_or(0),
                other => return Err(wrong_type(function, &other, location)),
            };
            match collection {
                Value::Array(items) => Ok(Value::Array(items.into_iter().take(count).collect())),
                Value::String(s) => Ok(Value::String(s.chars().take(count).collect())),
                other => Err(wrong_type(function, &other, location)),
            }
        }

        Function::Contains => {
            let container = next();
            let needle = next();
            match (&container, &needle) {
                (Value::Array(items), _) => Ok(Value::Bool(items.contains(&needle))),
                (Value::String(s), Value::String(n)) => Ok(Value::Bool(s.contains(n.as_str()))),
                (Value::Object(map), Value::String(key)) => Ok(Value::Bool(map.contains_key(key))),
                _ => Err(ResolveError::type_mismatch(
                    location,
                    format!(
                        "'contains' cannot look for {} in {}",
                        needle.type_name(),
                        container.type_name()
                    ),
                )),
            }
        }

        Function::Empty => match next() {
            Value::Null => Ok(Value::Bool(true)),
            Value::String(s) => Ok(Value::Bool(s.is_empty())),
            Value::Array(items) => Ok(Value::Bool(items.is_empty())),
            Value::Object(map) => Ok(Value::Bool(map.is_empty())),
            other => Err(wrong_type(function, &other, location)),
        },

        Function::Replace => {
            let input = next();
            let (Value::String(from), Value::String(to)) = (next(), next()) else {
                return Err(ResolveError::type_mismatch(
                    location,
                    "'replace' expects string arguments",
                ));
            };
            map_text(function, input, location, |s| s.replace(from.as_str(), &to))
        }

        Function::String => match next() {
            Value::Null => Ok(Value::String(String::new())),
            value @ (Value::String(_) | Value::Secure(_)) => Ok(value),
            Value::Int(i) => Ok(Value::String(i.to_string())),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            value @ (Value::Array(_) | Value::Object(_)) if !value.contains_secure() => {
                serde_json::to_string(&value)
                    .map(Value::String)
                    .map_err(|e| ResolveError::invalid_expression(location, e.to_string()))
            }
            other => Err(wrong_type(function, &other, location)),
        },

        Function::Int => match next() {
            Value::Int(i) => Ok(Value::Int(i)),
            Value::String(s) => s.trim().parse::<i64>().map(Value::Int).map_err(|_| {
                ResolveError::invalid_expression(location, format!("'{}' is not an integer", s))
            }),
            other => Err(wrong_type(function, &other, location)),
        },

        Function::UniqueString => {
            let mut parts = Vec::new();
            for value in std::iter::once(next()).chain(std::iter::from_fn(|| args.next())) {
                match value {
                    Value::String(s) => parts.push(s),
                    other => return Err(wrong_type(function, &other, location)),
                }
            }
            Ok(Value::String(unique_string(&parts)))
        }

        Function::ResourceGroup | Function::ResourceId | Function::ListKeys => {
            let message = format!("'{}' needs a resource", function.name());
            Err(ResolveError::invalid_expression(location, message))
        }
    }
}

fn concat(first: Value, rest: Vec<Value>, location: &str) -> Result<Value> {
    if let Value::Array(mut items) = first {
        for value in rest {
            match value {
                Value::Array(more) => items.extend(more),
                other => return Err(wrong_type(Function::Concat, &other, location)),
            }
        }
        return Ok(Value::Array(items));
    }

    let mut text = TextBuilder::default();
    for value in std::iter::once(first).chain(rest) {
        text.push(&value, location)?;
    }
    Ok(text.finish())
}

/// Set union. Arrays keep first-seen order without duplicates; objects
/// merge with later keys winning.
fn union(first: Value, rest: Vec<Value>, location: &str) -> Result<Value> {
    match first {
        Value::Array(items) => {
            let mut out: Vec<Value> = Vec::with_capacity(items.len());
            for value in std::iter::once(Value::Array(items)).chain(rest) {
                let Value::Array(items) = value else {
                    return Err(wrong_type(Function::Union, &value, location));
                };
                for item in items {
                    if !out.contains(&item) {
                        out.push(item);
                    }
                }
            }
            Ok(Value::Array(out))
        }
        Value::Object(mut map) => {
            for value in rest {
                let Value::Object(more) = value else {
                    return Err(wrong_type(Function::Union, &value, location));
                };
                map.extend(more);
            }
            Ok(Value::Object(map))
        }
        other => Err(wrong_type(Function::Union, &other, location)),
    }
}

/// Deterministic 13-character identifier derived from the inputs.
fn unique_string(parts: &[String]) -> String {
    let mut hasher = Sha256::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update([0u8]);
        }
        hasher.update(part.as_bytes());
    }
    let digest = hasher.finalize();

    (0..UNIQUE_STRING_LEN)
        .map(|n| {
            let bit = n * 5;
            let hi = u16::from(digest[bit / 8]) << 8;
            let lo = u16::from(digest[bit / 8 + 1]);
            let chunk = ((hi | lo) >> (11 - bit % 8)) & 0x1f;
            char::from(UNIQUE_STRING_ALPHABET[usize::from(chunk)])
        })
        .collect()
}
