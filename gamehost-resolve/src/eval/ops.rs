//! Operators and string building.

use gamehost_ir::{SecureValue, Value};
use gamehost_template::expr::{BinaryOp, UnaryOp};

use crate::{ResolveError, Result};

/// Builds interpolated text. Any secure piece makes the whole result secure.
#[derive(Default)]
pub(crate) struct TextBuilder {
    text: String,
    sources: Vec<String>,
}

impl TextBuilder {
    pub(crate) fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    pub(crate) fn push(&mut self, value: &Value, location: &str) -> Result<()> {
        match value {
            Value::Secure(secure) => {
                self.sources.extend(secure.sources().iter().cloned());
                self.text.push_str(secure.secret().expose());
                Ok(())
            }
            Value::Runtime(reference) => Err(ResolveError::type_mismatch(
                location,
                format!(
                    "{} is only known after deployment and cannot be embedded in a string",
                    reference
                ),
            )),
            other => match other.to_interpolated() {
                Some(text) => {
                    self.text.push_str(&text);
                    Ok(())
                }
                None => Err(ResolveError::type_mismatch(
                    location,
                    format!("cannot embed {} in a string", other.type_name()),
                )),
            },
        }
    }

    pub(crate) fn finish(self) -> Value {
        if self.sources.is_empty() {
            Value::String(self.text)
        } else {
            Value::Secure(SecureValue::derived(self.sources, self.text))
        }
    }
}

fn mismatch(op: &str, left: &Value, right: &Value, location: &str) -> ResolveError {
    ResolveError::type_mismatch(
        location,
        format!(
            "cannot apply '{}' to {} and {}",
            op,
            left.type_name(),
            right.type_name()
        ),
    )
}

fn checked(result: Option<i64>, op: BinaryOp, a: i64, b: i64, location: &str) -> Result<Value> {
    match result {
        Some(value) => Ok(Value::Int(value)),
        None if b == 0 && matches!(op, BinaryOp::Div | BinaryOp::Rem) => {
            Err(ResolveError::invalid_expression(location, "division by zero"))
        }
        None => Err(ResolveError::invalid_expression(
            location,
            format!("integer overflow in {} {} {}", a, op.symbol(), b),
        )),
    }
}

pub(crate) fn unary(op: UnaryOp, value: Value, location: &str) -> Result<Value> {
    match (op, value) {
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Neg, Value::Int(i)) => i.checked_neg().map(Value::Int).ok_or_else(|| {
            ResolveError::invalid_expression(location, format!("integer overflow in -{}", i))
        }),
        (UnaryOp::Not, other) => Err(ResolveError::type_mismatch(
            location,
            format!("cannot apply '!' to {}", other.type_name()),
        )),
        (UnaryOp::Neg, other) => Err(ResolveError::type_mismatch(
            location,
            format!("cannot apply '-' to {}", other.type_name()),
        )),
    }
}

pub(crate) fn binary(op: BinaryOp, left: Value, right: Value, location: &str) -> Result<Value> {
    use BinaryOp::*;

    if matches!(left, Value::Runtime(_)) || matches!(right, Value::Runtime(_)) {
        return Err(ResolveError::type_mismatch(
            location,
            format!(
                "runtime references are only known after deployment and cannot be used with '{}'",
                op.symbol()
            ),
        ));
    }

    match (op, &left, &right) {
        (Add, Value::Int(a), Value::Int(b)) => checked(a.checked_add(*b), op, *a, *b, location),
        (Sub, Value::Int(a), Value::Int(b)) => checked(a.checked_sub(*b), op, *a, *b, location),
        (Mul, Value::Int(a), Value::Int(b)) => checked(a.checked_mul(*b), op, *a, *b, location),
        (Div, Value::Int(a), Value::Int(b)) => checked(a.checked_div(*b), op, *a, *b, location),
        (Rem, Value::Int(a), Value::Int(b)) => checked(a.checked_rem(*b), op, *a, *b, location),

        (Add, Value::String(_) | Value::Secure(_), Value::String(_) | Value::Secure(_)) => {
            let mut text = TextBuilder::default();
            text.push(&left, location)?;
            text.push(&right, location)?;
            Ok(text.finish())
        }
        (Add, Value::Array(a), Value::Array(b)) => {
            Ok(Value::Array(a.iter().chain(b).cloned().collect()))
        }

        (Eq | Ne, Value::Secure(_), _) | (Eq | Ne, _, Value::Secure(_)) => {
            Err(ResolveError::type_mismatch(location, "secure values cannot be compared"))
        }
        (Eq, _, _) => Ok(Value::Bool(left == right)),
        (Ne, _, _) => Ok(Value::Bool(left != right)),

        (Lt | Le | Gt | Ge, Value::Int(a), Value::Int(b)) => Ok(Value::Bool(compare(op, a, b))),
        (Lt | Le | Gt | Ge, Value::String(a), Value::String(b)) => {
            Ok(Value::Bool(compare(op, a, b)))
        }

        (And, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(*a && *b)),
        (Or, Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(*a || *b)),

        _ => Err(mismatch(op.symbol(), &left, &right, location)),
    }
}

fn compare<T: Ord + ?Sized>(op: BinaryOp, a: &T, b: &T) -> bool {
    match op {
        BinaryOp::Lt => a < b,
        BinaryOp::Le => a <= b,
        BinaryOp::Gt => a > b,
        _ => a >= b,
    }
}
