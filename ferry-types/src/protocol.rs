//! Wire protocol types for one-shot worker calls.
//!
//! A worker process reads exactly one [`Request`] from stdin, emits exactly
//! one [`Response`] — success on stdout, failure on stderr — and terminates
//! with the matching [`ExitCode`]. There is no streaming and no second
//! request; every call gets a fresh process.

use serde::{Deserialize, Serialize};

/// String-keyed JSON arguments, as carried in a request's `args` object.
pub type ArgMap = serde_json::Map<String, serde_json::Value>;

/// The reserved introspection function name, present in every worker.
pub const INTROSPECT_NAME: &str = "__introspect__";

/// Worker process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// The call succeeded; the response went to stdout.
    Success,
    /// A handled error (validation, type, unknown function); stderr.
    HandledError,
    /// An uncaught failure during invocation; stderr.
    Crash,
}

impl ExitCode {
    /// The numeric process exit code.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::HandledError => 1,
            Self::Crash => 2,
        }
    }
}

/// A single function invocation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// The exported function name to invoke.
    pub function: String,
    /// Named arguments. Missing nullable parameters arrive as null.
    #[serde(default)]
    pub args: ArgMap,
}

impl Request {
    /// A request with no arguments.
    #[must_use]
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            args: ArgMap::new(),
        }
    }

    /// Add a named argument.
    #[must_use]
    pub fn arg(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.args.insert(name.into(), value);
        self
    }
}

/// The one response a worker emits per process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Whether the call succeeded.
    pub ok: bool,
    /// The result envelope; present exactly when `ok` is true.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultEnvelope>,
    /// The error detail; present exactly when `ok` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

impl Response {
    /// A success response wrapping the validated result value.
    #[must_use]
    pub fn success(value: serde_json::Value) -> Self {
        Self {
            ok: true,
            result: Some(ResultEnvelope { value }),
            error: None,
        }
    }

    /// A failure response carrying the structured error.
    #[must_use]
    pub fn failure(error: ErrorDetail) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error),
        }
    }
}

/// Envelope around a successful result value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultEnvelope {
    /// The function's validated return value.
    pub value: serde_json::Value,
}

/// Structured error detail carried in a failure response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// The error kind string; one of the four closed kinds for workers
    /// built on this crate.
    pub kind: String,
    /// Human-readable message. Crash messages include a backtrace.
    pub message: String,
    /// The offending argument or field path, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}
