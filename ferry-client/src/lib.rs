#![doc = include_str!("../README.md")]

pub mod error;

pub use error::ClientError;

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use ferry_types::{ArgMap, ErrorKind, Request, Response, INTROSPECT_NAME};

/// Exit code reported when the process yields none (killed by signal).
const EXIT_UNAVAILABLE: i32 = -1;

/// Calls functions exported by a ferry worker binary.
///
/// One worker process is spawned per call and terminates after its single
/// response; the client itself holds no connection state and is freely
/// shared across concurrent calls.
#[derive(Debug, Clone)]
pub struct Client {
    path: PathBuf,
    timeout: Option<Duration>,
    cancellation: CancellationToken,
}

impl Client {
    /// A client for the worker binary at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            timeout: None,
            cancellation: CancellationToken::new(),
        }
    }

    /// Kill the worker and fail with [`ClientError::Timeout`] if a call
    /// outlives `timeout`.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Cancel in-flight calls through `token`; a cancelled call kills its
    /// worker and fails with [`ClientError::Cancelled`].
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// The worker binary path this client spawns.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Invoke `function` and decode the result value into `T`.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`]; see the error taxonomy for the mapping from
    /// worker responses and process outcomes.
    pub async fn call<T: DeserializeOwned>(
        &self,
        function: &str,
        args: ArgMap,
    ) -> Result<T, ClientError> {
        let value = self.call_raw(function, args).await?;
        serde_json::from_value(value.clone()).map_err(|source| ClientError::Decode {
            source,
            output: value.to_string(),
        })
    }

    /// Invoke `function` and return the raw result value.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`]; see the error taxonomy for the mapping.
    pub async fn call_raw(&self, function: &str, args: ArgMap) -> Result<Value, ClientError> {
        let request = Request {
            function: function.to_string(),
            args,
        };
        let payload = serde_json::to_vec(&request).map_err(ClientError::Encode)?;
        let (stdout, stderr, exit_code) = self.exec(payload).await?;
        handle(function, &stdout, &stderr, exit_code)
    }

    /// Fetch the worker's introspection payload.
    ///
    /// # Errors
    ///
    /// Any [`ClientError`]. Workers not built on the ferry SDK typically
    /// fail here with a function-not-found error.
    pub async fn introspect(&self) -> Result<Value, ClientError> {
        self.call_raw(INTROSPECT_NAME, ArgMap::new()).await
    }

    /// Spawn the worker, feed it the request, and collect both channels
    /// and the exit code. Timeout and cancellation drop the wait future,
    /// which kills the child (`kill_on_drop`).
    async fn exec(&self, input: Vec<u8>) -> Result<(Vec<u8>, Vec<u8>, i32), ClientError> {
        debug!(path = %self.path.display(), "spawning worker");
        let mut child = Command::new(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ClientError::Spawn {
                path: self.path.clone(),
                source,
            })?;

        let wait = async move {
            if let Some(mut stdin) = child.stdin.take() {
                // A worker that fails fast may exit before consuming its
                // input; the response and exit code decide the outcome,
                // not the write.
                let _ = stdin.write_all(&input).await;
                let _ = stdin.shutdown().await;
            }
            child.wait_with_output().await
        };
        let deadline = async {
            match self.timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };

        let output = tokio::select! {
            output = wait => output.map_err(|source| ClientError::ProcessFailed {
                message: format!("worker I/O failed: {source}"),
                exit_code: EXIT_UNAVAILABLE,
                stderr: String::new(),
            })?,
            () = self.cancellation.cancelled() => {
                debug!(path = %self.path.display(), "call cancelled, killing worker");
                return Err(ClientError::Cancelled);
            }
            () = deadline => {
                let timeout = self.timeout.unwrap_or_default();
                debug!(path = %self.path.display(), ?timeout, "call timed out, killing worker");
                return Err(ClientError::Timeout(timeout));
            }
        };

        let exit_code = match output.status.code() {
            Some(code) => code,
            None => {
                return Err(ClientError::ProcessFailed {
                    message: "worker terminated by signal".to_string(),
                    exit_code: EXIT_UNAVAILABLE,
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                });
            }
        };
        Ok((output.stdout, output.stderr, exit_code))
    }
}

/// Map one (stdout, stderr, exit code) triple onto a result value or the
/// host error taxonomy.
fn handle(
    function: &str,
    stdout: &[u8],
    stderr: &[u8],
    exit_code: i32,
) -> Result<Value, ClientError> {
    match exit_code {
        0 => {
            let text = String::from_utf8_lossy(stdout);
            let response: Response =
                serde_json::from_str(&text).map_err(|source| ClientError::Decode {
                    source,
                    output: text.into_owned(),
                })?;
            Ok(response.result.map_or(Value::Null, |envelope| envelope.value))
        }
        1 | 2 => {
            let text = String::from_utf8_lossy(stderr);
            let response: Result<Response, _> = serde_json::from_str(&text);
            let detail = match response {
                Ok(response) => match response.error {
                    Some(detail) => detail,
                    None => {
                        return Err(ClientError::ProcessFailed {
                            message: "missing error details".to_string(),
                            exit_code,
                            stderr: text.into_owned(),
                        });
                    }
                },
                Err(_) => {
                    return Err(ClientError::ProcessFailed {
                        message: "invalid error response".to_string(),
                        exit_code,
                        stderr: text.into_owned(),
                    });
                }
            };

            if exit_code == 2 {
                return Err(ClientError::WorkerCrash {
                    kind: detail.kind,
                    message: detail.message,
                    function: function.to_string(),
                });
            }
            match ErrorKind::parse(&detail.kind) {
                Some(
                    kind @ (ErrorKind::Validation | ErrorKind::Type | ErrorKind::FunctionNotFound),
                ) => Err(ClientError::InvalidInput {
                    kind,
                    message: detail.message,
                    field: detail.field,
                    function: function.to_string(),
                }),
                _ => Err(ClientError::UserCode {
                    kind: detail.kind,
                    message: detail.message,
                    function: function.to_string(),
                }),
            }
        }
        other => Err(ClientError::ProcessFailed {
            message: "unknown exit code".to_string(),
            exit_code: other,
            stderr: String::from_utf8_lossy(stderr).into_owned(),
        }),
    }
}
