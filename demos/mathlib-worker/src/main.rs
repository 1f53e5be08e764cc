//! Demo worker exporting small arithmetic and string functions.
//!
//! Build and poke it with the `ferry` CLI:
//!
//! ```text
//! ferry build demos/mathlib-worker --output ./dist
//! ferry run ./dist/mathlib-worker sum '{"a": 1, "b": 2}'
//! ferry gen demos/mathlib-worker --client mathlib_client.rs
//! ```

use ferry_types::{CallError, FunctionSignature, TypeDescriptor};
use ferry_worker::{Registry, RegistryError};
use serde_json::json;

fn registry() -> Result<Registry, RegistryError> {
    let builder = Registry::builder()
        .register(
            FunctionSignature::new("sum")
                .param("a", TypeDescriptor::Int)
                .param("b", TypeDescriptor::Int)
                .returns(TypeDescriptor::Int),
            |args| {
                let a = args["a"].as_i64().unwrap_or_default();
                let b = args["b"].as_i64().unwrap_or_default();
                Ok(json!(a + b))
            },
        )?
        .register(
            FunctionSignature::new("multiply")
                .param("a", TypeDescriptor::Float)
                .param("b", TypeDescriptor::Float)
                .returns(TypeDescriptor::Float),
            |args| {
                let a = args["a"].as_f64().unwrap_or_default();
                let b = args["b"].as_f64().unwrap_or_default();
                Ok(json!(a * b))
            },
        )?
        .register(
            FunctionSignature::new("divide")
                .param("a", TypeDescriptor::Float)
                .param("b", TypeDescriptor::Float)
                .returns(TypeDescriptor::Float),
            |args| {
                let a = args["a"].as_f64().unwrap_or_default();
                let b = args["b"].as_f64().unwrap_or_default();
                if b == 0.0 {
                    return Err(CallError::validation_at("division by zero", "b"));
                }
                Ok(json!(a / b))
            },
        )?
        .register(
            FunctionSignature::new("greet")
                .param("name", TypeDescriptor::Str)
                .param(
                    "greeting",
                    TypeDescriptor::Optional(Box::new(TypeDescriptor::Str)),
                )
                .returns(TypeDescriptor::Str),
            |args| {
                let name = args["name"].as_str().unwrap_or_default();
                let greeting = args["greeting"].as_str().unwrap_or("Hello");
                Ok(json!(format!("{greeting}, {name}!")))
            },
        )?
        .register(
            FunctionSignature::new("get_stats")
                .param(
                    "numbers",
                    TypeDescriptor::List(Some(Box::new(TypeDescriptor::Float))),
                )
                .returns(TypeDescriptor::Dict(Some(Box::new(TypeDescriptor::Float)))),
            |args| {
                let numbers: Vec<f64> = args["numbers"]
                    .as_array()
                    .map(|values| values.iter().filter_map(serde_json::Value::as_f64).collect())
                    .unwrap_or_default();
                if numbers.is_empty() {
                    return Err(CallError::validation_at(
                        "numbers list cannot be empty",
                        "numbers",
                    ));
                }
                let count = numbers.len();
                let total: f64 = numbers.iter().sum();
                let mut sorted = numbers.clone();
                sorted.sort_by(f64::total_cmp);
                let median = if count % 2 == 0 {
                    (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
                } else {
                    sorted[count / 2]
                };
                Ok(json!({
                    "sum": total,
                    "count": count as f64,
                    "mean": total / count as f64,
                    "median": median,
                    "min": sorted[0],
                    "max": sorted[count - 1],
                }))
            },
        )?
        .register(
            FunctionSignature::new("concat")
                .param(
                    "strings",
                    TypeDescriptor::List(Some(Box::new(TypeDescriptor::Str))),
                )
                .returns(TypeDescriptor::Str),
            |args| {
                let joined: String = args["strings"]
                    .as_array()
                    .map(|values| {
                        values
                            .iter()
                            .filter_map(serde_json::Value::as_str)
                            .collect()
                    })
                    .unwrap_or_default();
                Ok(json!(joined))
            },
        )?
        .register(
            FunctionSignature::new("echo")
                .param("value", TypeDescriptor::Str)
                .returns(TypeDescriptor::Str),
            |args| Ok(args["value"].clone()),
        )?;
    Ok(builder.build())
}

fn main() {
    // Registration failures are fatal before any request is read.
    let registry = match registry() {
        Ok(registry) => registry,
        Err(err) => {
            eprintln!("invalid worker declaration: {err}");
            std::process::exit(2);
        }
    };
    std::process::exit(ferry_worker::run(&registry));
}
