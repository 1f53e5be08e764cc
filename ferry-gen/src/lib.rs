#![doc = include_str!("../README.md")]

pub mod generate;
pub mod mapping;
pub mod naming;
pub mod payload;

pub use generate::*;
pub use mapping::*;
pub use naming::*;
pub use payload::*;
