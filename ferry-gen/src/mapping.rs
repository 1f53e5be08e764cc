//! Wire type to Rust type mapping.
//!
//! | wire | Rust |
//! |---|---|
//! | `int` | `i64` |
//! | `float` | `f64` |
//! | `str` | `String` |
//! | `bool` | `bool` |
//! | `List[T]` | `Vec<T>` |
//! | `List` | `Vec<serde_json::Value>` |
//! | `Dict` | `serde_json::Map<String, serde_json::Value>` |
//! | `Dict[str, T]` | `std::collections::HashMap<String, T>` |
//! | `Optional[T]` | `Option<T>` |
//! | `Any`, `Union[...]` | `serde_json::Value` |
//! | `None` | no value |
//!
//! Unparseable wire text falls back to `serde_json::Value` with a warning:
//! an unrecognized descriptor must never silently disappear, but a foreign
//! worker with a richer grammar should still get usable bindings.

use ferry_types::TypeDescriptor;
use tracing::warn;

/// Map a wire type string to a Rust type, or `None` for "no value".
#[must_use]
pub fn rust_type(wire: &str) -> Option<String> {
    match TypeDescriptor::parse_wire(wire) {
        Ok(descriptor) => descriptor_type(&descriptor),
        Err(err) => {
            warn!(wire, %err, "unrecognized wire type, mapping to serde_json::Value");
            Some("serde_json::Value".to_string())
        }
    }
}

/// Map a parsed descriptor to a Rust type, or `None` for "no value".
#[must_use]
pub fn descriptor_type(descriptor: &TypeDescriptor) -> Option<String> {
    let mapped = match descriptor {
        TypeDescriptor::Int => "i64".to_string(),
        TypeDescriptor::Float => "f64".to_string(),
        TypeDescriptor::Str => "String".to_string(),
        TypeDescriptor::Bool => "bool".to_string(),
        TypeDescriptor::None => return None,
        TypeDescriptor::Any | TypeDescriptor::Union(_) => "serde_json::Value".to_string(),
        TypeDescriptor::Optional(inner) => {
            let inner = descriptor_type(inner).unwrap_or_else(|| "serde_json::Value".to_string());
            format!("Option<{inner}>")
        }
        TypeDescriptor::List(None) => "Vec<serde_json::Value>".to_string(),
        TypeDescriptor::List(Some(item)) => {
            let item = descriptor_type(item).unwrap_or_else(|| "serde_json::Value".to_string());
            format!("Vec<{item}>")
        }
        TypeDescriptor::Dict(None) => "serde_json::Map<String, serde_json::Value>".to_string(),
        TypeDescriptor::Dict(Some(value)) => {
            let value = descriptor_type(value).unwrap_or_else(|| "serde_json::Value".to_string());
            format!("std::collections::HashMap<String, {value}>")
        }
    };
    Some(mapped)
}
