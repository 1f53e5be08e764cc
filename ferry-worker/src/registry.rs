//! The function registry.
//!
//! A [`Registry`] maps exported names to their declared signatures and
//! callables. It is an explicit value, built once at worker startup with
//! [`Registry::builder`] and read-only afterwards — there is no ambient
//! global and no deregistration. Registration failures (duplicate names,
//! use of the reserved introspection name) are startup errors, never
//! call-time errors.

use indexmap::IndexMap;
use serde_json::Value;

use ferry_types::{ArgMap, CallError, FunctionSignature};

use crate::introspect::{introspection_payload, introspection_signature, INTROSPECT_NAME};

/// A registered callable.
///
/// Callables receive validated, coerced arguments keyed by parameter name
/// (missing nullable parameters arrive as null) and return the raw result
/// value, which dispatch validates against the declared return descriptor
/// before it is serialized. A function body rejects bad domain input by
/// returning [`CallError::Validation`].
pub type WorkerFn = Box<dyn Fn(ArgMap) -> Result<Value, CallError> + Send + Sync>;

/// A signature paired with its callable.
pub struct Registration {
    /// The declared signature.
    pub signature: FunctionSignature,
    callable: WorkerFn,
}

impl Registration {
    /// Invoke the callable with validated arguments.
    pub(crate) fn call(&self, args: ArgMap) -> Result<Value, CallError> {
        (self.callable)(args)
    }
}

/// Registration-time failure. Fatal at startup; the worker never serves a
/// request from a registry that failed to build.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// The name is already registered.
    #[error("function '{0}' is already registered")]
    Duplicate(String),
    /// The name is reserved for the introspection exporter.
    #[error("function name '{0}' is reserved")]
    Reserved(String),
    /// The exported name is empty.
    #[error("function name must not be empty")]
    EmptyName,
}

/// Builder for a [`Registry`]. Declaration order is preserved and is the
/// order introspection reports.
#[derive(Default)]
pub struct RegistryBuilder {
    entries: IndexMap<String, Registration>,
}

impl RegistryBuilder {
    /// Register a function under its signature's name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the name is empty, reserved, or
    /// already taken.
    pub fn register(
        mut self,
        signature: FunctionSignature,
        callable: impl Fn(ArgMap) -> Result<Value, CallError> + Send + Sync + 'static,
    ) -> Result<Self, RegistryError> {
        let name = signature.name.clone();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if name == INTROSPECT_NAME {
            return Err(RegistryError::Reserved(name));
        }
        if self.entries.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.entries.insert(
            name,
            Registration {
                signature,
                callable: Box::new(callable),
            },
        );
        Ok(self)
    }

    /// Finish the registry, seeding the reserved introspection function.
    ///
    /// The registry is static from here on, so the introspection payload
    /// is a snapshot taken now; it is identical to what call-time
    /// reflection would produce.
    #[must_use]
    pub fn build(mut self) -> Registry {
        let snapshot = introspection_payload(self.entries.values().map(|r| &r.signature));
        self.entries.insert(
            INTROSPECT_NAME.to_string(),
            Registration {
                signature: introspection_signature(),
                callable: Box::new(move |_args| Ok(snapshot.clone())),
            },
        );
        Registry {
            entries: self.entries,
        }
    }
}

/// Read-only mapping from exported names to registrations.
pub struct Registry {
    entries: IndexMap<String, Registration>,
}

impl Registry {
    /// Start building a registry.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Look up a registration by exported name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Registration> {
        self.entries.get(name)
    }

    /// Exported names in declaration order, including the reserved
    /// introspection name (registered last).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Declared signatures in declaration order.
    pub fn signatures(&self) -> impl Iterator<Item = &FunctionSignature> {
        self.entries.values().map(|r| &r.signature)
    }

    /// Number of registered functions, introspection included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no functions at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
