//! The introspection exporter.
//!
//! Every registry carries a reserved function returning all other
//! registered signatures as data. Hosts call it once to generate typed
//! bindings; the payload shape is stable:
//!
//! ```json
//! {"functions": [
//!   {"name": "sum",
//!    "parameters": {"a": "int", "b": "int"},
//!    "return_type": "int"}
//! ]}
//! ```
//!
//! Functions appear in declaration order and parameters in declared
//! positional order — generated bindings mirror both. A missing return
//! descriptor is reported as `"None"`.

use serde_json::{json, Value};

use ferry_types::{FunctionSignature, TypeDescriptor};

pub use ferry_types::INTROSPECT_NAME;

/// Signature of the reserved function: no parameters, `Dict[str, Any]`.
pub(crate) fn introspection_signature() -> FunctionSignature {
    FunctionSignature::new(INTROSPECT_NAME)
        .returns(TypeDescriptor::Dict(Some(Box::new(TypeDescriptor::Any))))
}

/// Serialize signatures into the introspection payload.
///
/// The reserved name itself is excluded; it describes the exporter, not an
/// exported function.
pub fn introspection_payload<'a>(
    signatures: impl IntoIterator<Item = &'a FunctionSignature>,
) -> Value {
    let functions: Vec<Value> = signatures
        .into_iter()
        .filter(|sig| sig.name != INTROSPECT_NAME)
        .map(signature_entry)
        .collect();
    json!({ "functions": functions })
}

fn signature_entry(signature: &FunctionSignature) -> Value {
    let mut parameters = serde_json::Map::with_capacity(signature.params.len());
    for param in &signature.params {
        parameters.insert(param.name.clone(), json!(param.descriptor.to_string()));
    }
    let return_type = signature
        .returns
        .as_ref()
        .map_or_else(|| "None".to_string(), ToString::to_string);
    json!({
        "name": signature.name,
        "parameters": parameters,
        "return_type": return_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_keeps_declared_parameter_order() {
        let sig = FunctionSignature::new("resize")
            .param("width", TypeDescriptor::Int)
            .param("height", TypeDescriptor::Int)
            .param("aspect", TypeDescriptor::Optional(Box::new(TypeDescriptor::Float)))
            .returns(TypeDescriptor::Bool);
        let payload = introspection_payload([&sig]);
        let text = serde_json::to_string(&payload).unwrap();
        // Declared order survives serialization, not alphabetical order.
        let width = text.find("width").unwrap();
        let height = text.find("height").unwrap();
        let aspect = text.find("aspect").unwrap();
        assert!(width < height && height < aspect);
    }

    #[test]
    fn missing_return_reported_as_none() {
        let sig = FunctionSignature::new("fire_and_forget").param("msg", TypeDescriptor::Str);
        let payload = introspection_payload([&sig]);
        assert_eq!(payload["functions"][0]["return_type"], "None");
    }

    #[test]
    fn exporter_excludes_itself() {
        let own = introspection_signature();
        let payload = introspection_payload([&own]);
        assert_eq!(payload["functions"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn wire_strings_parse_back() {
        let sig = FunctionSignature::new("tally")
            .param("counts", TypeDescriptor::Dict(Some(Box::new(TypeDescriptor::Int))))
            .returns(TypeDescriptor::List(Some(Box::new(TypeDescriptor::Str))));
        let payload = introspection_payload([&sig]);
        let wire = payload["functions"][0]["parameters"]["counts"]
            .as_str()
            .unwrap();
        assert_eq!(
            TypeDescriptor::parse_wire(wire).unwrap(),
            TypeDescriptor::Dict(Some(Box::new(TypeDescriptor::Int)))
        );
    }
}
