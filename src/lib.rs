//! Compiler for _Imp_, a minimal imperative expression language.
//!
//! Source text is compiled in three gated stages: parsing into an abstract
//! syntax tree, semantic analysis (type resolution over the tree), and code
//! generation into textual _x86-64_ assembly. A non-empty error list at any
//! stage stops the pipeline.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::cast_possible_truncation)]
#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]

pub mod args;
pub mod compiler;
pub mod error;

pub use compiler::codegen::Target;
pub use compiler::driver::compile;
pub use error::CompileError;
