//! Multi-stage pipeline for compiling _Imp_ source into textual assembly.

pub mod ast;
pub mod codegen;
pub mod driver;
pub mod lexer;
pub mod parser;
pub mod sema;
