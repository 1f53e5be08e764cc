#![doc = include_str!("../README.md")]

pub mod descriptor;
pub mod error;
pub mod protocol;
pub mod validate;

pub use descriptor::*;
pub use error::*;
pub use protocol::*;
pub use validate::*;
