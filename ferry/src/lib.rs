#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

pub use ferry_types;

#[cfg(feature = "client")]
pub use ferry_client;
#[cfg(feature = "gen")]
pub use ferry_gen;
#[cfg(feature = "worker")]
pub use ferry_worker;

/// Happy-path imports for both sides of the bridge.
pub mod prelude {
    pub use ferry_types::{
        ArgMap, CallError, ErrorKind, FunctionSignature, Request, Response, TypeDescriptor,
    };

    #[cfg(feature = "client")]
    pub use ferry_client::{Client, ClientError};

    #[cfg(feature = "gen")]
    pub use ferry_gen::{Generator, Introspection};

    #[cfg(feature = "worker")]
    pub use ferry_worker::{Registry, RegistryError};
}
