//! Compiler driver that orchestrates the staged pipeline: tokens, AST,
//! annotated AST, assembly text.
//!
//! Each stage gates the next: a non-empty error list halts the pipeline and
//! is returned wholesale, so the caller sees every diagnostic the failing
//! stage collected.

use crate::compiler::codegen::{self, Target};
use crate::compiler::{parser, sema};
use crate::error::CompileError;

/// Compiles `source` into an assembly listing for `target`.
///
/// # Errors
///
/// Returns the full error list of the first stage that failed.
pub fn compile(source: &str, target: Target) -> Result<String, CompileError> {
    let mut program = parser::parse(source).map_err(CompileError::Syntax)?;

    sema::analyze(&mut program).map_err(CompileError::Type)?;

    codegen::generate(target, &program).map_err(CompileError::Codegen)
}
