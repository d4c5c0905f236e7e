// src/lib.rs
//! Converts type-checked parser state machines into the flattened JSON
//! parser descriptor executed by a BMv2-style runtime.

pub mod config;
pub mod convert;
pub mod descriptor;
pub mod error;
pub mod ir;

pub use config::ConvertOptions;
pub use convert::{ConvertedParser, ProgramBuilder, convert_parser};
pub use descriptor::{ParserDescriptor, Program};
pub use error::{ConvertError, Result, Site};
