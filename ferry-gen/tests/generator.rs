//! Generator behavior over realistic introspection payloads.

use ferry_gen::{Generator, Introspection};

fn mathlib_payload() -> Introspection {
    serde_json::from_str(
        r#"{"functions":[
            {"name":"sum","parameters":{"a":"int","b":"int"},"return_type":"int"},
            {"name":"divide","parameters":{"a":"float","b":"float"},"return_type":"float"},
            {"name":"greet","parameters":{"name":"str","greeting":"Optional[str]"},"return_type":"str"},
            {"name":"_internal_helper","parameters":{},"return_type":"int"},
            {"name":"notify","parameters":{"message":"str"},"return_type":"None"}
        ]}"#,
    )
    .unwrap()
}

#[test]
fn output_is_byte_identical_across_runs() {
    let payload = mathlib_payload();
    let generator = Generator::new("mathlib", "./dist/mathlib");
    let first = generator.generate(&payload);
    let second = generator.generate(&payload);
    let third = Generator::new("mathlib", "./dist/mathlib").generate(&payload);
    assert_eq!(first, second);
    assert_eq!(first, third);
}

#[test]
fn methods_are_sorted_by_exported_name() {
    let source = Generator::new("mathlib", "./dist/mathlib").generate(&mathlib_payload());
    let divide = source.find("pub async fn divide").unwrap();
    let greet = source.find("pub async fn greet").unwrap();
    let notify = source.find("pub async fn notify").unwrap();
    let sum = source.find("pub async fn sum").unwrap();
    assert!(divide < greet && greet < notify && notify < sum);
}

#[test]
fn typed_signatures_mirror_declared_order() {
    let source = Generator::new("mathlib", "./dist/mathlib").generate(&mathlib_payload());
    assert!(source.contains("pub async fn sum(&self, a: i64, b: i64) -> Result<i64, ClientError>"));
    assert!(source
        .contains("pub async fn divide(&self, a: f64, b: f64) -> Result<f64, ClientError>"));
    assert!(source.contains(
        "pub async fn greet(&self, name: String, greeting: Option<String>) -> Result<String, ClientError>"
    ));
}

#[test]
fn no_value_return_yields_unit_result() {
    let source = Generator::new("mathlib", "./dist/mathlib").generate(&mathlib_payload());
    assert!(source
        .contains("pub async fn notify(&self, message: String) -> Result<(), ClientError>"));
    assert!(source.contains("self.inner.call_raw(\"notify\", args).await?;"));
}

#[test]
fn internal_functions_get_no_bindings() {
    let source = Generator::new("mathlib", "./dist/mathlib").generate(&mathlib_payload());
    assert!(!source.contains("internal_helper"));
}

#[test]
fn client_type_and_default_path_come_from_inputs() {
    let source = Generator::new("image_tools", "./out/imgw").generate(&Introspection::default());
    assert!(source.contains("pub struct ImageToolsClient"));
    assert!(source.contains(r#"Self::with_binary("./out/imgw")"#));
    assert!(source.contains("impl Default for ImageToolsClient"));
}

#[test]
fn argument_map_uses_wire_names_not_rust_names() {
    let payload: Introspection = serde_json::from_str(
        r#"{"functions":[{"name":"render","parameters":{"pageCount":"int","type":"str"},"return_type":"str"}]}"#,
    )
    .unwrap();
    let source = Generator::new("docs", "./dist/docs").generate(&payload);
    // Rust-side identifiers are converted; wire keys stay as declared.
    assert!(source.contains("page_count: i64"));
    assert!(source.contains("type_: String"));
    assert!(source.contains(r#"args.insert("pageCount".to_string(), serde_json::json!(page_count));"#));
    assert!(source.contains(r#"args.insert("type".to_string(), serde_json::json!(type_));"#));
}

#[test]
fn empty_payload_still_generates_a_client() {
    let source = Generator::new("empty", "./dist/empty").generate(&Introspection::default());
    assert!(source.contains("pub struct EmptyClient"));
    assert!(!source.contains("pub async fn"));
}
