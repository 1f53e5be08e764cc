//! The one-shot dispatch protocol.
//!
//! A call moves through a fixed sequence of states — parse the request,
//! resolve the function, validate arguments, invoke, validate the return —
//! and terminates in exactly one of success, handled error, or crash.
//! Failures travel as [`CallError`] return values through every state;
//! the terminal state picks the output channel and the process exit code.
//!
//! Exactly one response is ever emitted, and nothing terminates the worker
//! without one: panics inside user callables are caught and converted into
//! `RuntimeError` responses with a captured backtrace.

use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::io::{Read, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use serde_json::Value;
use tracing::{debug, warn};

use ferry_types::{
    validate, validate_return, ArgMap, CallError, ExitCode, FunctionSignature, Response,
};

use crate::registry::{Registration, Registry};

/// The terminal outcome of one dispatched call.
#[derive(Debug, Clone)]
pub struct Completed {
    /// The single response to emit.
    pub response: Response,
    /// The process exit code; also selects stdout vs. stderr.
    pub exit: ExitCode,
}

/// Run one call against the registry and return its terminal outcome.
///
/// `raw` is the full request payload, read to EOF before processing
/// begins. This never panics and never returns more than one response.
#[must_use]
pub fn dispatch(registry: &Registry, raw: &str) -> Completed {
    match evaluate(registry, raw) {
        Ok(value) => Completed {
            response: Response::success(value),
            exit: ExitCode::Success,
        },
        Err(err) => {
            if err.kind() == ferry_types::ErrorKind::Runtime {
                warn!(error = %err, "call crashed");
            } else {
                debug!(error = %err, "call failed");
            }
            Completed {
                exit: err.exit_code(),
                response: Response::failure(err.to_detail()),
            }
        }
    }
}

/// Serve one request from stdin and emit the response.
///
/// Success goes to stdout, failure to stderr; the returned exit code is
/// meant for [`std::process::exit`]. Worker binaries end with:
///
/// ```rust,no_run
/// # let registry = ferry_worker::Registry::builder().build();
/// std::process::exit(ferry_worker::run(&registry));
/// ```
#[must_use]
pub fn run(registry: &Registry) -> i32 {
    let mut raw = String::new();
    let completed = match std::io::stdin().read_to_string(&mut raw) {
        Ok(_) => dispatch(registry, &raw),
        Err(err) => {
            let err = CallError::Runtime {
                message: format!("failed to read request: {err}"),
                trace: None,
            };
            Completed {
                exit: err.exit_code(),
                response: Response::failure(err.to_detail()),
            }
        }
    };

    let payload = serde_json::to_string(&completed.response).unwrap_or_else(|err| {
        // Response types contain nothing unserializable; this is a last
        // line of defense that still honors the one-response contract.
        format!(
            r#"{{"ok":false,"error":{{"kind":"RuntimeError","message":"failed to serialize response: {err}"}}}}"#
        )
    });

    let written = match completed.exit {
        ExitCode::Success => std::io::stdout()
            .write_all(payload.as_bytes())
            .and_then(|()| std::io::stdout().flush()),
        _ => std::io::stderr()
            .write_all(payload.as_bytes())
            .and_then(|()| std::io::stderr().flush()),
    };
    if written.is_err() {
        // The peer is gone; there is no channel left to report on.
        return ExitCode::Crash.code();
    }
    completed.exit.code()
}

/// The happy path through every state; any `Err` short-circuits into the
/// terminal error mapping.
fn evaluate(registry: &Registry, raw: &str) -> Result<Value, CallError> {
    // Parsing.
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CallError::validation("empty input"));
    }
    let parsed: Value = serde_json::from_str(raw)
        .map_err(|err| CallError::validation(format!("invalid JSON: {err}")))?;
    let request = parsed
        .as_object()
        .ok_or_else(|| CallError::validation("request must be a JSON object"))?;
    let function = request
        .get("function")
        .ok_or_else(|| CallError::validation("missing 'function' field in request"))?
        .as_str()
        .ok_or_else(|| CallError::validation("'function' must be a string"))?;

    // Resolving the function.
    debug!(function, "dispatching");
    let registration = registry
        .lookup(function)
        .ok_or_else(|| CallError::FunctionNotFound(function.to_string()))?;

    // Validating arguments.
    let empty = ArgMap::new();
    let args = match request.get("args") {
        None => &empty,
        Some(value) => value
            .as_object()
            .ok_or_else(|| CallError::validation("'args' must be an object"))?,
    };
    let validated = validate_args(&registration.signature, args)?;

    // Invoking.
    let result = invoke(registration, validated)?;

    // Validating the return value against the declared contract.
    validate_return(&result, registration.signature.returns.as_ref())
}

/// Check every declared parameter, then reject undeclared extras in one
/// batch, sorted for deterministic messages.
fn validate_args(signature: &FunctionSignature, args: &ArgMap) -> Result<ArgMap, CallError> {
    let mut validated = ArgMap::with_capacity(signature.params.len());
    for param in &signature.params {
        match args.get(&param.name) {
            Some(value) => {
                validated.insert(
                    param.name.clone(),
                    validate(value, &param.descriptor, &param.name)?,
                );
            }
            None if param.descriptor.is_nullable() => {
                validated.insert(param.name.clone(), Value::Null);
            }
            None => {
                return Err(CallError::validation_at(
                    format!("missing required argument '{}'", param.name),
                    param.name.clone(),
                ));
            }
        }
    }

    let mut unexpected: Vec<&str> = args
        .keys()
        .filter(|key| !signature.params.iter().any(|p| &p.name == *key))
        .map(String::as_str)
        .collect();
    if !unexpected.is_empty() {
        unexpected.sort_unstable();
        return Err(CallError::validation(format!(
            "unexpected argument(s): {}",
            unexpected.join(", ")
        )));
    }

    Ok(validated)
}

/// Call the function body, converting panics into `RuntimeError`.
fn invoke(registration: &Registration, args: ArgMap) -> Result<Value, CallError> {
    install_panic_recorder();
    CAPTURING.with(|flag| flag.set(true));
    CAPTURED_TRACE.with(|slot| slot.borrow_mut().take());
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| registration.call(args)));
    CAPTURING.with(|flag| flag.set(false));
    match outcome {
        Ok(result) => result,
        Err(payload) => {
            let trace = CAPTURED_TRACE.with(|slot| slot.borrow_mut().take());
            let message = panic_message(&payload);
            Err(CallError::Runtime {
                message: format!("panic: {message}"),
                trace,
            })
        }
    }
}

thread_local! {
    static CAPTURING: std::cell::Cell<bool> = const { std::cell::Cell::new(false) };
    static CAPTURED_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static PANIC_RECORDER: Once = Once::new();

/// Install a panic hook that records a backtrace from the panic site while
/// an invocation is in flight on the current thread, and defers to the
/// previous hook for every other panic.
fn install_panic_recorder() {
    PANIC_RECORDER.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let recording = CAPTURING.with(std::cell::Cell::get);
            if recording {
                CAPTURED_TRACE.with(|slot| {
                    *slot.borrow_mut() = Some(Backtrace::force_capture().to_string());
                });
            } else {
                previous(info);
            }
        }));
    });
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
