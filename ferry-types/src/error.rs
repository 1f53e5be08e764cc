//! Error taxonomy shared by workers and hosts.
//!
//! Call-level failures are one of four closed kinds, carried across the
//! process boundary as structured data rather than stack unwinding. The
//! worker converts every failure into exactly one error response; nothing
//! terminates a worker without a response.

use crate::protocol::{ErrorDetail, ExitCode};

/// The closed set of wire error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed request data, a missing required argument, or a domain
    /// rejection raised intentionally by the function body.
    Validation,
    /// A value that does not match its declared descriptor.
    Type,
    /// The requested function is not registered.
    FunctionNotFound,
    /// An uncaught failure during invocation.
    Runtime,
}

impl ErrorKind {
    /// The wire string for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "ValidationError",
            Self::Type => "TypeError",
            Self::FunctionNotFound => "FunctionNotFoundError",
            Self::Runtime => "RuntimeError",
        }
    }

    /// Parse a wire kind string. Unknown kinds yield `None`; hosts treat
    /// them as user-code errors rather than rejecting the response.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "ValidationError" => Some(Self::Validation),
            "TypeError" => Some(Self::Type),
            "FunctionNotFoundError" => Some(Self::FunctionNotFound),
            "RuntimeError" => Some(Self::Runtime),
            _ => None,
        }
    }
}

/// A call-level failure in one of the four wire kinds.
///
/// Dispatch propagates these by return value through every state of the
/// call; the terminal state serializes them into the error response and
/// selects the process exit code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    /// Malformed request data or a domain rejection from the function body.
    #[error("{message}")]
    Validation {
        /// Human-readable description.
        message: String,
        /// The offending argument or field path, when known.
        field: Option<String>,
    },
    /// A value that does not match its declared descriptor.
    #[error("{message}")]
    Type {
        /// Human-readable description.
        message: String,
        /// Path to the offending location (e.g. `items[1]`, `data.k`).
        field: Option<String>,
    },
    /// The requested function is not registered.
    #[error("function '{0}' not found")]
    FunctionNotFound(String),
    /// An uncaught failure during invocation.
    #[error("{message}")]
    Runtime {
        /// Description of the failure.
        message: String,
        /// Captured backtrace, when available.
        trace: Option<String>,
    },
}

impl CallError {
    /// A validation error with no field path.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// A validation error naming the offending field.
    #[must_use]
    pub fn validation_at(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// A type mismatch at the given path.
    #[must_use]
    pub fn type_mismatch(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Type {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// The kind this error maps to on the wire.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Type { .. } => ErrorKind::Type,
            Self::FunctionNotFound(_) => ErrorKind::FunctionNotFound,
            Self::Runtime { .. } => ErrorKind::Runtime,
        }
    }

    /// The worker exit code for this error: crashes exit 2, everything
    /// handled exits 1.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Runtime { .. } => ExitCode::Crash,
            _ => ExitCode::HandledError,
        }
    }

    /// Serialize into the wire error detail. Runtime traces are appended
    /// to the message, matching the diagnostic shape hosts expect.
    #[must_use]
    pub fn to_detail(&self) -> ErrorDetail {
        let (message, field) = match self {
            Self::Validation { message, field } | Self::Type { message, field } => {
                (message.clone(), field.clone())
            }
            Self::FunctionNotFound(_) => (self.to_string(), None),
            Self::Runtime { message, trace } => {
                let message = match trace {
                    Some(trace) => format!("{message}\n{trace}"),
                    None => message.clone(),
                };
                (message, None)
            }
        };
        ErrorDetail {
            kind: self.kind().as_str().to_string(),
            message,
            field,
        }
    }
}

/// Failure to parse a wire type expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorParseError {
    /// The text matches no production of the grammar.
    #[error("unrecognized type expression '{0}'")]
    Unrecognized(String),
    /// A `Dict[...]` form without exactly two type arguments.
    #[error("'{0}' must have exactly two type arguments")]
    DictArity(String),
    /// A `Dict[...]` form whose key type is not `str`.
    #[error("dict key type must be 'str', got '{0}'")]
    DictKey(String),
    /// A `Union[]` with no members.
    #[error("union must have at least one member")]
    EmptyUnion,
}
