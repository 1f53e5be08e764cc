//! End-to-end dispatch tests over an in-process registry.

use ferry_types::{CallError, ExitCode, FunctionSignature, TypeDescriptor};
use ferry_worker::{dispatch, Registry, INTROSPECT_NAME};
use serde_json::json;

fn mathlib() -> Registry {
    Registry::builder()
        .register(
            FunctionSignature::new("sum")
                .param("a", TypeDescriptor::Int)
                .param("b", TypeDescriptor::Int)
                .returns(TypeDescriptor::Int),
            |args| {
                let a = args["a"].as_i64().expect("validated");
                let b = args["b"].as_i64().expect("validated");
                Ok(json!(a + b))
            },
        )
        .unwrap()
        .register(
            FunctionSignature::new("divide")
                .param("a", TypeDescriptor::Float)
                .param("b", TypeDescriptor::Float)
                .returns(TypeDescriptor::Float),
            |args| {
                let a = args["a"].as_f64().expect("validated");
                let b = args["b"].as_f64().expect("validated");
                if b == 0.0 {
                    return Err(CallError::validation_at("division by zero", "b"));
                }
                Ok(json!(a / b))
            },
        )
        .unwrap()
        .register(
            FunctionSignature::new("greet")
                .param("name", TypeDescriptor::Str)
                .param(
                    "greeting",
                    TypeDescriptor::Optional(Box::new(TypeDescriptor::Str)),
                )
                .returns(TypeDescriptor::Str),
            |args| {
                let name = args["name"].as_str().expect("validated");
                let greeting = args["greeting"].as_str().unwrap_or("Hello");
                Ok(json!(format!("{greeting}, {name}!")))
            },
        )
        .unwrap()
        .register(
            FunctionSignature::new("explode").returns(TypeDescriptor::Int),
            |_args| panic!("boom"),
        )
        .unwrap()
        .register(
            FunctionSignature::new("liar").returns(TypeDescriptor::Int),
            |_args| Ok(json!("not an int")),
        )
        .unwrap()
        .build()
}

fn response_text(raw: &str) -> (String, ExitCode) {
    let registry = mathlib();
    let completed = dispatch(&registry, raw);
    (
        serde_json::to_string(&completed.response).unwrap(),
        completed.exit,
    )
}

#[test]
fn well_typed_call_succeeds() {
    let (text, exit) = response_text(r#"{"function":"sum","args":{"a":1,"b":2}}"#);
    assert_eq!(text, r#"{"ok":true,"result":{"value":3}}"#);
    assert_eq!(exit, ExitCode::Success);
}

#[test]
fn missing_required_argument_names_the_field() {
    let (text, exit) = response_text(r#"{"function":"sum","args":{"a":1}}"#);
    assert_eq!(
        text,
        r#"{"ok":false,"error":{"kind":"ValidationError","message":"missing required argument 'b'","field":"b"}}"#
    );
    assert_eq!(exit, ExitCode::HandledError);
}

#[test]
fn domain_rejection_from_function_body() {
    let (text, exit) = response_text(r#"{"function":"divide","args":{"a":1,"b":0}}"#);
    assert_eq!(
        text,
        r#"{"ok":false,"error":{"kind":"ValidationError","message":"division by zero","field":"b"}}"#
    );
    assert_eq!(exit, ExitCode::HandledError);
}

#[test]
fn unknown_function_is_not_found() {
    let (text, exit) = response_text(r#"{"function":"nope","args":{}}"#);
    assert_eq!(
        text,
        r#"{"ok":false,"error":{"kind":"FunctionNotFoundError","message":"function 'nope' not found"}}"#
    );
    assert_eq!(exit, ExitCode::HandledError);
}

#[test]
fn omitted_nullable_argument_arrives_as_null() {
    let (text, exit) = response_text(r#"{"function":"greet","args":{"name":"Ada"}}"#);
    assert_eq!(text, r#"{"ok":true,"result":{"value":"Hello, Ada!"}}"#);
    assert_eq!(exit, ExitCode::Success);
}

#[test]
fn provided_nullable_argument_is_used() {
    let (text, _) = response_text(r#"{"function":"greet","args":{"name":"Ada","greeting":"Hi"}}"#);
    assert_eq!(text, r#"{"ok":true,"result":{"value":"Hi, Ada!"}}"#);
}

#[test]
fn extra_arguments_rejected_in_one_sorted_batch() {
    let (text, exit) =
        response_text(r#"{"function":"sum","args":{"a":1,"b":2,"zz":1,"mm":2}}"#);
    assert_eq!(
        text,
        r#"{"ok":false,"error":{"kind":"ValidationError","message":"unexpected argument(s): mm, zz"}}"#
    );
    assert_eq!(exit, ExitCode::HandledError);
}

#[test]
fn type_mismatch_names_the_argument() {
    let (text, exit) = response_text(r#"{"function":"sum","args":{"a":true,"b":2}}"#);
    assert_eq!(
        text,
        r#"{"ok":false,"error":{"kind":"TypeError","message":"expected int, got bool","field":"a"}}"#
    );
    assert_eq!(exit, ExitCode::HandledError);
}

#[test]
fn int_arguments_widen_for_float_parameters() {
    let (text, _) = response_text(r#"{"function":"divide","args":{"a":7,"b":2}}"#);
    assert_eq!(text, r#"{"ok":true,"result":{"value":3.5}}"#);
}

#[test]
fn empty_input_is_a_validation_error() {
    for raw in ["", "   ", "\n"] {
        let (text, exit) = response_text(raw);
        assert_eq!(
            text,
            r#"{"ok":false,"error":{"kind":"ValidationError","message":"empty input"}}"#
        );
        assert_eq!(exit, ExitCode::HandledError);
    }
}

#[test]
fn malformed_json_is_a_validation_error() {
    let (text, exit) = response_text("{not json");
    assert!(text.contains(r#""kind":"ValidationError""#));
    assert!(text.contains("invalid JSON"));
    assert_eq!(exit, ExitCode::HandledError);
}

#[test]
fn non_object_request_is_rejected() {
    let (text, _) = response_text("[1,2,3]");
    assert!(text.contains("request must be a JSON object"));
}

#[test]
fn non_string_function_is_rejected() {
    let (text, _) = response_text(r#"{"function":42}"#);
    assert!(text.contains("'function' must be a string"));
}

#[test]
fn non_object_args_are_rejected() {
    let (text, _) = response_text(r#"{"function":"sum","args":[1,2]}"#);
    assert!(text.contains("'args' must be an object"));
}

#[test]
fn missing_args_object_defaults_to_empty() {
    // With no nullable params, that surfaces as a missing argument.
    let (text, _) = response_text(r#"{"function":"sum"}"#);
    assert!(text.contains("missing required argument 'a'"));
}

#[test]
fn panic_in_function_body_crashes_with_trace() {
    let registry = mathlib();
    let completed = dispatch(&registry, r#"{"function":"explode","args":{}}"#);
    assert_eq!(completed.exit, ExitCode::Crash);
    let error = completed.response.error.expect("error detail");
    assert_eq!(error.kind, "RuntimeError");
    assert!(error.message.starts_with("panic: boom"));
}

#[test]
fn return_contract_violation_is_surfaced() {
    let registry = mathlib();
    let completed = dispatch(&registry, r#"{"function":"liar","args":{}}"#);
    assert_eq!(completed.exit, ExitCode::HandledError);
    let error = completed.response.error.expect("error detail");
    assert_eq!(error.kind, "TypeError");
    assert_eq!(error.field.as_deref(), Some("return"));
}

#[test]
fn introspection_reports_signatures_in_order() {
    let registry = mathlib();
    let completed = dispatch(&registry, r#"{"function":"__introspect__","args":{}}"#);
    assert_eq!(completed.exit, ExitCode::Success);
    let value = completed.response.result.expect("result").value;
    let functions = value["functions"].as_array().expect("functions");
    let names: Vec<_> = functions
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["sum", "divide", "greet", "explode", "liar"]);

    let divide = &functions[1];
    assert_eq!(divide["parameters"]["a"], "float");
    assert_eq!(divide["parameters"]["b"], "float");
    assert_eq!(divide["return_type"], "float");

    let greet = &functions[2];
    assert_eq!(greet["parameters"]["greeting"], "Optional[str]");
}

#[test]
fn introspection_takes_no_arguments() {
    let registry = mathlib();
    let completed = dispatch(
        &registry,
        r#"{"function":"__introspect__","args":{"stray":1}}"#,
    );
    assert_eq!(completed.exit, ExitCode::HandledError);
    let error = completed.response.error.expect("error detail");
    assert_eq!(error.message, "unexpected argument(s): stray");
}

#[test]
fn introspection_is_always_present() {
    let registry = Registry::builder().build();
    assert!(registry.lookup(INTROSPECT_NAME).is_some());
    let completed = dispatch(&registry, r#"{"function":"__introspect__","args":{}}"#);
    assert_eq!(completed.exit, ExitCode::Success);
    let value = completed.response.result.expect("result").value;
    assert_eq!(value["functions"].as_array().unwrap().len(), 0);
}

#[test]
fn nested_argument_paths_reach_the_response() {
    let registry = Registry::builder()
        .register(
            FunctionSignature::new("tally")
                .param(
                    "items",
                    TypeDescriptor::List(Some(Box::new(TypeDescriptor::Int))),
                )
                .returns(TypeDescriptor::Int),
            |args| {
                let total: i64 = args["items"]
                    .as_array()
                    .expect("validated")
                    .iter()
                    .filter_map(serde_json::Value::as_i64)
                    .sum();
                Ok(json!(total))
            },
        )
        .unwrap()
        .build();
    let completed = dispatch(
        &registry,
        r#"{"function":"tally","args":{"items":[1,"two",3]}}"#,
    );
    let error = completed.response.error.expect("error detail");
    assert_eq!(error.field.as_deref(), Some("items[1]"));
    assert_eq!(error.message, "expected int, got str");
}
