//! Source emission.
//!
//! [`Generator`] turns an [`Introspection`] payload into one Rust source
//! file defining a typed client. Output is deterministic: functions are
//! emitted sorted by exported name, parameters in declared order, and
//! nothing date- or environment-dependent is written, so repeated runs on
//! the same payload are byte-identical.

use crate::mapping::rust_type;
use crate::naming::{to_pascal_case, to_snake_case};
use crate::payload::{FunctionEntry, Introspection};

/// Generates typed client source from introspection data.
#[derive(Debug, Clone)]
pub struct Generator {
    module: String,
    binary: String,
}

impl Generator {
    /// A generator for the named worker module, whose binary lives at
    /// `binary` (embedded as the generated client's default path).
    #[must_use]
    pub fn new(module: impl Into<String>, binary: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            binary: binary.into(),
        }
    }

    /// Emit the complete source file.
    ///
    /// Functions whose exported name starts with `_` are internal and are
    /// not given bindings.
    #[must_use]
    pub fn generate(&self, introspection: &Introspection) -> String {
        let mut functions: Vec<&FunctionEntry> = introspection
            .functions
            .iter()
            .filter(|f| !f.name.starts_with('_'))
            .collect();
        functions.sort_by(|a, b| a.name.cmp(&b.name));

        let client = format!("{}Client", to_pascal_case(&self.module));
        let mut out = String::new();

        out.push_str("// Code generated by ferry gen. DO NOT EDIT.\n\n");
        out.push_str("use ferry_client::{Client, ClientError};\n");
        out.push_str("use ferry_types::ArgMap;\n\n");

        out.push_str(&format!(
            "/// Typed client for the `{}` worker.\n",
            self.module
        ));
        out.push_str("#[derive(Debug, Clone)]\n");
        out.push_str(&format!("pub struct {client} {{\n    inner: Client,\n}}\n\n"));

        out.push_str(&format!("impl {client} {{\n"));
        out.push_str("    /// A client for the worker binary at its build location.\n");
        out.push_str("    #[must_use]\n");
        out.push_str("    pub fn new() -> Self {\n");
        out.push_str(&format!(
            "        Self::with_binary({:?})\n    }}\n\n",
            self.binary
        ));
        out.push_str("    /// A client for a worker binary at `path`.\n");
        out.push_str("    #[must_use]\n");
        out.push_str("    pub fn with_binary(path: impl Into<std::path::PathBuf>) -> Self {\n");
        out.push_str("        Self {\n            inner: Client::new(path),\n        }\n    }\n\n");
        out.push_str("    /// The underlying untyped client.\n");
        out.push_str("    #[must_use]\n");
        out.push_str("    pub fn inner(&self) -> &Client {\n        &self.inner\n    }\n");

        for function in &functions {
            out.push('\n');
            emit_method(&mut out, function);
        }

        out.push_str("}\n\n");
        out.push_str(&format!(
            "impl Default for {client} {{\n    fn default() -> Self {{\n        Self::new()\n    }}\n}}\n"
        ));
        out
    }
}

fn emit_method(out: &mut String, function: &FunctionEntry) {
    let method = to_snake_case(&function.name);
    let returns = rust_type(&function.return_type);

    let params: Vec<(String, String)> = function
        .parameters
        .iter()
        .map(|(name, wire)| {
            let rust = rust_type(wire).unwrap_or_else(|| "serde_json::Value".to_string());
            (name.clone(), rust)
        })
        .collect();

    out.push_str(&format!(
        "    /// Calls the worker function `{}`.\n",
        function.name
    ));
    out.push_str(&format!("    pub async fn {method}(&self"));
    for (name, rust) in &params {
        out.push_str(&format!(", {}: {rust}", to_snake_case(name)));
    }
    match &returns {
        Some(rust) => out.push_str(&format!(") -> Result<{rust}, ClientError> {{\n")),
        None => out.push_str(") -> Result<(), ClientError> {\n"),
    }

    if params.is_empty() {
        out.push_str("        let args = ArgMap::new();\n");
    } else {
        out.push_str("        let mut args = ArgMap::new();\n");
        for (name, _) in &params {
            out.push_str(&format!(
                "        args.insert({:?}.to_string(), serde_json::json!({}));\n",
                name,
                to_snake_case(name)
            ));
        }
    }

    match &returns {
        Some(_) => {
            out.push_str(&format!(
                "        self.inner.call({:?}, args).await\n",
                function.name
            ));
        }
        None => {
            out.push_str(&format!(
                "        self.inner.call_raw({:?}, args).await?;\n        Ok(())\n",
                function.name
            ));
        }
    }
    out.push_str("    }\n");
}
