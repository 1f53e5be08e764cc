//! Host-side error taxonomy.
//!
//! Wire errors arrive as structured `{kind, message, field}` detail plus a
//! process exit code; the combination decides the host error: handled
//! request-shape errors become [`ClientError::InvalidInput`], intentional
//! rejections from the function body become [`ClientError::UserCode`], and
//! crashes become [`ClientError::WorkerCrash`]. Everything the worker never
//! got a chance to answer — spawn failures, kills, garbled output — has its
//! own local variants.

use std::path::PathBuf;
use std::time::Duration;

use ferry_types::ErrorKind;

/// Any failure of a bridged call, local or remote.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The worker rejected the request shape: bad types, missing or
    /// unexpected arguments, or an unknown function.
    #[error("invalid input calling '{function}': {message}")]
    InvalidInput {
        /// Which handled kind the worker reported.
        kind: ErrorKind,
        /// The worker's message.
        message: String,
        /// The offending argument or field path, when named.
        field: Option<String>,
        /// The function that was being called.
        function: String,
    },
    /// The function body rejected the call intentionally, or reported an
    /// unrecognized error kind.
    #[error("'{function}' failed: {message}")]
    UserCode {
        /// The wire kind string as reported.
        kind: String,
        /// The worker's message.
        message: String,
        /// The function that was being called.
        function: String,
    },
    /// The worker crashed: an uncaught failure with a diagnostic trace.
    #[error("worker crashed in '{function}': {message}")]
    WorkerCrash {
        /// The wire kind string as reported.
        kind: String,
        /// The worker's message, trace included.
        message: String,
        /// The function that was being called.
        function: String,
    },
    /// The worker process misbehaved at the protocol level: unknown exit
    /// code, unreadable error payload, or termination by signal.
    #[error("worker process failed (exit {exit_code}): {message}")]
    ProcessFailed {
        /// What went wrong.
        message: String,
        /// The exit code, or -1 when unavailable.
        exit_code: i32,
        /// Raw stderr output, for diagnosis.
        stderr: String,
    },
    /// The worker binary could not be spawned at all.
    #[error("failed to spawn worker at {path}: {source}")]
    Spawn {
        /// The worker binary path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The request could not be encoded to JSON.
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),
    /// The response could not be decoded from JSON.
    #[error("failed to decode response: {source} (output: {output})")]
    Decode {
        /// The underlying JSON error.
        source: serde_json::Error,
        /// The undecodable text.
        output: String,
    },
    /// The host-imposed deadline elapsed; the worker was killed and no
    /// response exists. Protocol-equivalent to a crash.
    #[error("call timed out after {0:?}")]
    Timeout(Duration),
    /// The call was cancelled; the worker was killed and no response
    /// exists. Protocol-equivalent to a crash.
    #[error("call cancelled")]
    Cancelled,
}

impl ClientError {
    /// Whether the failure was produced by the worker's own error channel
    /// (as opposed to synthesized locally by the host).
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. } | Self::UserCode { .. } | Self::WorkerCrash { .. }
        )
    }
}
