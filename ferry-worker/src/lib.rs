#![doc = include_str!("../README.md")]

pub mod dispatch;
pub mod introspect;
pub mod registry;

pub use dispatch::*;
pub use introspect::*;
pub use registry::*;
