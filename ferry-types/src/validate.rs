//! The validation and coercion engine.
//!
//! [`validate`] recursively checks a JSON value against a
//! [`TypeDescriptor`], tracking the path to every location so failures name
//! the exact offending spot (`items[1]`, `data.k`). The only coercion is
//! integer widening where a float is declared; everything else is an exact
//! structural check.
//!
//! Union matching is first-match-wins in declared member order. This is a
//! documented contract, not an implementation accident: reorderings change
//! error-message content but never the success/failure outcome, because at
//! most one member can structurally match a given JSON value in practice.

use serde_json::Value;

use crate::descriptor::TypeDescriptor;
use crate::error::CallError;

/// Validate `value` against `descriptor`, returning the (possibly widened)
/// value on success.
///
/// `path` seeds failure locations; pass the argument name at the top level.
///
/// # Errors
///
/// Returns a [`CallError::Type`] naming the offending path on mismatch.
pub fn validate(value: &Value, descriptor: &TypeDescriptor, path: &str) -> Result<Value, CallError> {
    // Rule 1: null is acceptable only for nullable descriptors.
    if value.is_null() {
        if descriptor.is_nullable() {
            return Ok(Value::Null);
        }
        return Err(CallError::type_mismatch(
            format!("expected {descriptor}, got None"),
            path,
        ));
    }

    match descriptor {
        // Rule 2: Any passes through unchecked.
        TypeDescriptor::Any => Ok(value.clone()),

        TypeDescriptor::Optional(inner) => validate(value, inner, path),

        // Rule 3: first non-null member that validates wins, in declared
        // order. On total failure, aggregate the attempted types.
        TypeDescriptor::Union(members) => {
            for member in members {
                if matches!(member, TypeDescriptor::None) {
                    continue;
                }
                if let Ok(validated) = validate(value, member, path) {
                    return Ok(validated);
                }
            }
            let attempted: Vec<String> = members
                .iter()
                .filter(|m| !matches!(m, TypeDescriptor::None))
                .map(ToString::to_string)
                .collect();
            Err(CallError::type_mismatch(
                format!(
                    "expected one of [{}], got {}",
                    attempted.join(", "),
                    value_type_name(value)
                ),
                path,
            ))
        }

        // Rule 4: lists validate every element; empty input is valid.
        TypeDescriptor::List(item) => {
            let Some(elements) = value.as_array() else {
                return Err(mismatch("list", value, path));
            };
            match item {
                Some(item) => {
                    let mut validated = Vec::with_capacity(elements.len());
                    for (i, element) in elements.iter().enumerate() {
                        validated.push(validate(element, item, &format!("{path}[{i}]"))?);
                    }
                    Ok(Value::Array(validated))
                }
                None => Ok(value.clone()),
            }
        }

        // Rule 5: dicts are string-keyed objects. JSON cannot carry a
        // non-string key, so the key rule holds by construction here.
        TypeDescriptor::Dict(value_type) => {
            let Some(entries) = value.as_object() else {
                return Err(mismatch("dict", value, path));
            };
            match value_type {
                Some(value_type) => {
                    let mut validated = serde_json::Map::with_capacity(entries.len());
                    for (key, entry) in entries {
                        validated.insert(
                            key.clone(),
                            validate(entry, value_type, &format!("{path}.{key}"))?,
                        );
                    }
                    Ok(Value::Object(validated))
                }
                None => Ok(value.clone()),
            }
        }

        // Rule 6: primitives. bool is deliberately rejected where int is
        // expected; int widens to float with no precision check.
        TypeDescriptor::Int => match value {
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
            other => Err(mismatch("int", other, path)),
        },
        TypeDescriptor::Float => match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::from(i as f64))
                } else if let Some(u) = n.as_u64() {
                    Ok(Value::from(u as f64))
                } else {
                    Ok(value.clone())
                }
            }
            other => Err(mismatch("float", other, path)),
        },
        TypeDescriptor::Str => match value {
            Value::String(_) => Ok(value.clone()),
            other => Err(mismatch("str", other, path)),
        },
        TypeDescriptor::Bool => match value {
            Value::Bool(_) => Ok(value.clone()),
            other => Err(mismatch("bool", other, path)),
        },
        TypeDescriptor::None => Err(mismatch("None", value, path)),
    }
}

/// Validate a function's own output against its declared return descriptor.
///
/// A mismatch here is the worker violating its own contract; the caller
/// surfaces it before anything is written to the success channel. Functions
/// declared with no return value (or an explicit `None` return) skip
/// validation, mirroring the declaration side where "no value" and "null"
/// are the same contract.
///
/// # Errors
///
/// Returns a [`CallError::Type`] with path `return` on mismatch.
pub fn validate_return(
    value: &Value,
    descriptor: Option<&TypeDescriptor>,
) -> Result<Value, CallError> {
    match descriptor {
        None | Some(TypeDescriptor::None) => Ok(value.clone()),
        Some(descriptor) => validate(value, descriptor, "return"),
    }
}

fn mismatch(expected: &str, got: &Value, path: &str) -> CallError {
    CallError::type_mismatch(
        format!("expected {expected}, got {}", value_type_name(got)),
        path,
    )
}

/// Descriptor-vocabulary name for a JSON value's runtime type.
fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "None",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
