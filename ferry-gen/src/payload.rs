//! The introspection payload model.
//!
//! This is the deserialized form of what a worker's reserved
//! `__introspect__` function returns. Parameter maps keep the worker's
//! declared order; generated method signatures mirror it positionally.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Everything a worker exports, as data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Introspection {
    /// Exported functions in the worker's declaration order.
    #[serde(default)]
    pub functions: Vec<FunctionEntry>,
}

impl Introspection {
    /// Decode a raw introspection result value.
    ///
    /// # Errors
    ///
    /// Returns the underlying JSON error when the value does not have the
    /// introspection shape.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// One exported function's metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionEntry {
    /// The exported name.
    pub name: String,
    /// Parameter name to wire type string, in declared order.
    #[serde(default)]
    pub parameters: IndexMap<String, String>,
    /// Wire type string of the return value; `"None"` means no value.
    #[serde(default = "none_return")]
    pub return_type: String,
}

fn none_return() -> String {
    "None".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_order_survives_deserialization() {
        let payload: Introspection = serde_json::from_str(
            r#"{"functions":[{"name":"resize","parameters":{"width":"int","height":"int","mode":"str"},"return_type":"bool"}]}"#,
        )
        .unwrap();
        let names: Vec<_> = payload.functions[0].parameters.keys().collect();
        assert_eq!(names, vec!["width", "height", "mode"]);
    }

    #[test]
    fn missing_fields_default() {
        let payload: Introspection =
            serde_json::from_str(r#"{"functions":[{"name":"ping"}]}"#).unwrap();
        assert!(payload.functions[0].parameters.is_empty());
        assert_eq!(payload.functions[0].return_type, "None");
    }
}
