//! Abstract syntax tree for _Imp_ programs.
//!
//! The tree is fully owned: each composite node boxes its children, with no
//! sharing and no cycles. Node shape is fixed once parsed; the only field
//! that changes afterwards is the `ty` annotation, written during semantic
//! analysis.

use std::fmt;

/// Resolved type of an expression node.
///
/// Nodes start out `Unresolved`; semantic analysis replaces the sentinel
/// with `Int`, `Bool`, or `Invalid` (the error sentinel) exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ty {
    /// Not yet visited by semantic analysis.
    Unresolved,
    /// Visited, but no valid type could be assigned.
    Invalid,
    /// Signed integer.
    Int,
    /// Boolean.
    Bool,
}

impl Ty {
    /// Returns `true` for `Int` and `Bool`.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Ty::Int | Ty::Bool)
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Ty::Unresolved => "<unresolved>",
            Ty::Invalid => "<invalid>",
            Ty::Int => "int",
            Ty::Bool => "bool",
        };
        f.write_str(s)
    }
}

/// _AST_ binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// `+` binary operator.
    Add,
    /// `-` binary operator.
    Subtract,
    /// `*` binary operator.
    Multiply,
    /// `/` binary operator.
    Divide,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
        };
        f.write_str(s)
    }
}

/// Root of a parsed compilation unit: an ordered sequence of statements.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

/// _AST_ statements.
#[derive(Debug, PartialEq, Eq)]
pub enum Statement {
    /// Bare expression evaluated for nothing but its (discarded) value.
    Expression(Expression),
    /// `name = expr;` — first assignment implicitly declares the variable.
    Assignment {
        target: Identifier,
        value: Expression,
    },
    /// `print expr;`
    Print(Expression),
}

/// Assignment target. Carries its own type annotation so semantic analysis
/// can mark an individual use invalid without touching the declared type
/// stored in the symbol table.
#[derive(Debug, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub ty: Ty,
}

impl Identifier {
    #[must_use]
    pub const fn new(name: String) -> Self {
        Identifier {
            name,
            ty: Ty::Unresolved,
        }
    }
}

/// _AST_ expression: a kind plus the type annotation resolved during
/// semantic analysis.
#[derive(Debug, PartialEq, Eq)]
pub struct Expression {
    pub kind: ExprKind,
    pub ty: Ty,
}

impl Expression {
    /// Returns a new expression with an unresolved type annotation.
    #[must_use]
    pub const fn new(kind: ExprKind) -> Self {
        Expression {
            kind,
            ty: Ty::Unresolved,
        }
    }
}

/// _AST_ expression kinds.
#[derive(Debug, PartialEq, Eq)]
pub enum ExprKind {
    /// Integer literal.
    IntLiteral(i64),
    /// Boolean literal.
    BoolLiteral(bool),
    /// Variable reference.
    Ident(String),
    /// Binary operator applied to two sub-expressions.
    Binary {
        op: BinaryOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Program")?;
        for stmt in &self.statements {
            fmt_statement(f, stmt, 1)?;
        }
        Ok(())
    }
}

fn fmt_statement(f: &mut fmt::Formatter<'_>, stmt: &Statement, depth: usize) -> fmt::Result {
    let pad = "  ".repeat(depth);

    match stmt {
        Statement::Expression(expr) => {
            writeln!(f, "{pad}ExpressionStatement")?;
            fmt_expression(f, expr, depth + 1)
        }
        Statement::Assignment { target, value } => {
            writeln!(f, "{pad}Assignment '{}' : {}", target.name, target.ty)?;
            fmt_expression(f, value, depth + 1)
        }
        Statement::Print(expr) => {
            writeln!(f, "{pad}Print")?;
            fmt_expression(f, expr, depth + 1)
        }
    }
}

fn fmt_expression(f: &mut fmt::Formatter<'_>, expr: &Expression, depth: usize) -> fmt::Result {
    let pad = "  ".repeat(depth);

    match &expr.kind {
        ExprKind::IntLiteral(v) => writeln!(f, "{pad}IntLiteral {v} : {}", expr.ty),
        ExprKind::BoolLiteral(v) => writeln!(f, "{pad}BoolLiteral {v} : {}", expr.ty),
        ExprKind::Ident(name) => writeln!(f, "{pad}Ident '{name}' : {}", expr.ty),
        ExprKind::Binary { op, lhs, rhs } => {
            writeln!(f, "{pad}Binary '{op}' : {}", expr.ty)?;
            fmt_expression(f, lhs, depth + 1)?;
            fmt_expression(f, rhs, depth + 1)
        }
    }
}
