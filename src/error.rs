//! Error types for each compilation stage.
//!
//! Every stage collects its errors into an ordered list rather than aborting
//! on the first failure, so one run surfaces as many diagnostics as possible.
//! The pipeline itself is gated: a non-empty list prevents later stages from
//! running.

use thiserror::Error;

use crate::compiler::ast::{BinaryOperator, Ty};
use crate::compiler::lexer::TokenKind;

/// Errors produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// A required token did not match the peeked token.
    #[error("{line}:{col}: expected {expected}, found {found} ('{literal}')")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        literal: String,
        line: usize,
        col: usize,
    },
    /// No rule can begin an expression with this token.
    #[error("{line}:{col}: '{literal}' ({kind}) cannot start an expression")]
    NoPrefixRule {
        kind: TokenKind,
        literal: String,
        line: usize,
        col: usize,
    },
    /// Integer literal that does not fit a 64-bit signed integer.
    #[error("{line}:{col}: integer literal '{literal}' is too large (64-bit signed)")]
    IntLiteralOutOfRange {
        literal: String,
        line: usize,
        col: usize,
    },
}

/// Errors produced during semantic analysis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// Identifier referenced before its first assignment.
    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),
    /// Assignment whose value type differs from the variable's declared type.
    #[error("type mismatch: variable '{name}' has type {declared}, assigned value of type {found}")]
    TypeMismatch {
        name: String,
        declared: Ty,
        found: Ty,
    },
    /// Assignment whose value never resolved to a valid type.
    #[error("cannot assign unresolved value to variable '{0}'")]
    UnresolvedValue(String),
    /// Arithmetic operator applied to non-integer operands.
    #[error("operator '{0}' expects integer operands")]
    NonIntegerOperand(BinaryOperator),
    /// Division whose right operand is the literal zero.
    #[error("division by zero")]
    DivisionByZero,
    /// `print` applied to an expression that never resolved.
    #[error("print argument did not resolve to a type")]
    UnresolvedPrintArgument,
}

/// Errors produced during code generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    /// A storage slot was allocated twice for the same variable.
    #[error("storage slot for variable '{0}' allocated twice")]
    SlotRedefined(String),
    /// Identifier with no backend storage slot reached a load.
    #[error("variable '{0}' has no storage slot")]
    UndefinedVariable(String),
    /// `print` argument whose type has no runtime print helper.
    #[error("no print helper for value of type {0}")]
    UnsupportedPrintType(Ty),
}

/// Failure of the compilation pipeline, carrying the full error list of the
/// stage that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The parse stage failed.
    #[error("{} syntax error(s)", .0.len())]
    Syntax(Vec<SyntaxError>),
    /// The semantic analysis stage failed.
    #[error("{} type error(s)", .0.len())]
    Type(Vec<TypeError>),
    /// The code generation stage failed.
    #[error("{} code generation error(s)", .0.len())]
    Codegen(Vec<CodegenError>),
}

impl CompileError {
    /// Returns the rendered message of each collected error, in order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            CompileError::Syntax(errs) => errs.iter().map(ToString::to_string).collect(),
            CompileError::Type(errs) => errs.iter().map(ToString::to_string).collect(),
            CompileError::Codegen(errs) => errs.iter().map(ToString::to_string).collect(),
        }
    }

    /// Short name of the stage that failed.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            CompileError::Syntax(_) => "parse",
            CompileError::Type(_) => "check",
            CompileError::Codegen(_) => "codegen",
        }
    }
}
