//! Semantic Analysis
//!
//! Single depth-first pass over the AST that resolves every expression's
//! type and binds variables in a chained symbol table. Children are visited
//! before their parent's type is computed (post-order). The pass never
//! aborts early: the whole tree is analyzed so all detectable errors are
//! reported in one run.
//!
//! Binding rule: the first assignment to a name implicitly declares it with
//! the type of its right-hand side, and that declared type is fixed forever.
//! Later assignments are checked against it but never overwrite it.

use std::collections::HashMap;

use crate::compiler::ast::{BinaryOperator, ExprKind, Expression, Program, Statement, Ty};
use crate::error::TypeError;

/// A declared variable.
#[derive(Debug, Clone, Copy)]
pub struct Symbol {
    /// Type fixed by the variable's first assignment.
    pub ty: Ty,
}

/// A chain of scopes mapping variable names to their declared types.
///
/// The current grammar only ever opens the global scope, but the chain
/// supports nesting for when block scoping is added.
#[derive(Debug, Default)]
pub struct SymbolTable {
    store: HashMap<String, Symbol>,
    outer: Option<Box<SymbolTable>>,
}

impl SymbolTable {
    /// Binds `name` in the innermost scope. Returns `false` if the name is
    /// already bound there.
    pub fn define(&mut self, name: &str, ty: Ty) -> bool {
        if self.store.contains_key(name) {
            return false;
        }

        self.store.insert(name.into(), Symbol { ty });
        true
    }

    /// Looks `name` up through the scope chain, innermost first.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Symbol> {
        match self.store.get(name) {
            Some(sym) => Some(*sym),
            None => self.outer.as_ref().and_then(|outer| outer.resolve(name)),
        }
    }

    /// Opens a new innermost scope.
    pub fn enter_scope(&mut self) {
        let outer = std::mem::take(self);
        *self = SymbolTable {
            store: HashMap::new(),
            outer: Some(Box::new(outer)),
        };
    }

    /// Closes the innermost scope, discarding its bindings. A no-op at the
    /// global scope.
    pub fn exit_scope(&mut self) {
        if let Some(outer) = self.outer.take() {
            *self = *outer;
        }
    }
}

/// Semantic analysis pass state.
#[derive(Debug, Default)]
pub struct Analyzer {
    scope: SymbolTable,
    errors: Vec<TypeError>,
}

impl Analyzer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyzes `program` in place, annotating every expression node with
    /// its resolved type and returning the ordered error list.
    pub fn analyze(mut self, program: &mut Program) -> Vec<TypeError> {
        for stmt in &mut program.statements {
            self.statement(stmt);
        }

        self.errors
    }

    fn statement(&mut self, stmt: &mut Statement) {
        match stmt {
            Statement::Expression(expr) => self.expression(expr),
            Statement::Assignment { target, value } => {
                // The right-hand side resolves first; its type drives the
                // implicit declaration.
                self.expression(value);

                match self.scope.resolve(&target.name) {
                    None => {
                        if value.ty.is_valid() {
                            self.scope.define(&target.name, value.ty);
                            target.ty = value.ty;
                        } else {
                            // Still declare the name so later uses don't all
                            // report it as undefined, but as invalid.
                            self.scope.define(&target.name, Ty::Invalid);
                            self.errors
                                .push(TypeError::UnresolvedValue(target.name.clone()));
                            target.ty = Ty::Invalid;
                        }
                    }
                    Some(sym) => {
                        if value.ty == sym.ty {
                            target.ty = sym.ty;
                        } else if !value.ty.is_valid() {
                            // The stored declared type is never touched.
                            self.errors
                                .push(TypeError::UnresolvedValue(target.name.clone()));
                            target.ty = Ty::Invalid;
                        } else {
                            self.errors.push(TypeError::TypeMismatch {
                                name: target.name.clone(),
                                declared: sym.ty,
                                found: value.ty,
                            });
                            target.ty = Ty::Invalid;
                        }
                    }
                }
            }
            Statement::Print(expr) => {
                self.expression(expr);

                if !expr.ty.is_valid() {
                    self.errors.push(TypeError::UnresolvedPrintArgument);
                }
            }
        }
    }

    fn expression(&mut self, expr: &mut Expression) {
        match &mut expr.kind {
            ExprKind::IntLiteral(_) => expr.ty = Ty::Int,
            ExprKind::BoolLiteral(_) => expr.ty = Ty::Bool,
            ExprKind::Ident(name) => match self.scope.resolve(name) {
                Some(sym) => expr.ty = sym.ty,
                None => {
                    self.errors.push(TypeError::UndefinedVariable(name.clone()));
                    expr.ty = Ty::Invalid;
                }
            },
            ExprKind::Binary { op, lhs, rhs } => {
                let op = *op;

                self.expression(lhs);
                self.expression(rhs);

                if !lhs.ty.is_valid() || !rhs.ty.is_valid() {
                    // An operand already failed; its error was reported at
                    // the inner node. Poison without re-reporting.
                    expr.ty = Ty::Invalid;
                } else if lhs.ty != Ty::Int || rhs.ty != Ty::Int {
                    self.errors.push(TypeError::NonIntegerOperand(op));
                    expr.ty = Ty::Invalid;
                } else {
                    expr.ty = Ty::Int;
                }

                // Static check, independent of operand types: a literal zero
                // divisor is always an error.
                if op == BinaryOperator::Divide
                    && matches!(rhs.kind, ExprKind::IntLiteral(0))
                {
                    self.errors.push(TypeError::DivisionByZero);
                    expr.ty = Ty::Invalid;
                }
            }
        }
    }
}

/// Analyzes `program` in place, returning the full type error list.
///
/// # Errors
///
/// Returns every type error encountered, in source order.
pub fn analyze(program: &mut Program) -> Result<(), Vec<TypeError>> {
    let errors = Analyzer::new().analyze(program);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::parser;

    fn parsed(source: &str) -> Program {
        parser::parse(source).expect("source should parse")
    }

    fn errors_of(source: &str) -> (Program, Vec<TypeError>) {
        let mut program = parsed(source);
        let errors = Analyzer::new().analyze(&mut program);
        (program, errors)
    }

    #[test]
    fn sema_literals_resolve_intrinsically() {
        let (program, errors) = errors_of("x = 1; y = true;");

        assert!(errors.is_empty());

        let Statement::Assignment { target, value } = &program.statements[0] else {
            panic!("expected assignment");
        };
        assert_eq!(value.ty, Ty::Int);
        assert_eq!(target.ty, Ty::Int);

        let Statement::Assignment { target, value } = &program.statements[1] else {
            panic!("expected assignment");
        };
        assert_eq!(value.ty, Ty::Bool);
        assert_eq!(target.ty, Ty::Bool);
    }

    #[test]
    fn sema_print_boolean_resolves() {
        let (program, errors) = errors_of("print true;");

        assert!(errors.is_empty());

        let Statement::Print(expr) = &program.statements[0] else {
            panic!("expected print");
        };
        assert_eq!(expr.ty, Ty::Bool);
    }

    #[test]
    fn sema_undefined_variable_single_error() {
        let (_, errors) = errors_of("print x;");

        // Exactly one undefined-variable error; the print statement also
        // reports its now-unresolvable argument.
        assert_eq!(
            errors,
            vec![
                TypeError::UndefinedVariable("x".into()),
                TypeError::UnresolvedPrintArgument,
            ]
        );
        assert_eq!(
            errors
                .iter()
                .filter(|e| matches!(e, TypeError::UndefinedVariable(_)))
                .count(),
            1
        );
    }

    #[test]
    fn sema_first_definition_fixes_type() {
        let (_, errors) = errors_of("y = 1; y = true;");

        assert_eq!(
            errors,
            vec![TypeError::TypeMismatch {
                name: "y".into(),
                declared: Ty::Int,
                found: Ty::Bool,
            }]
        );
    }

    #[test]
    fn sema_declared_type_survives_mismatch() {
        // After the mismatched assignment, `y` is still an int: assigning
        // an int again is fine.
        let (_, errors) = errors_of("y = 1; y = true; y = 2;");

        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn sema_division_by_literal_zero() {
        let (program, errors) = errors_of("z = 5 / 0;");

        // Exactly one division-by-zero error; the assignment then reports
        // its unresolvable value.
        assert_eq!(
            errors,
            vec![
                TypeError::DivisionByZero,
                TypeError::UnresolvedValue("z".into()),
            ]
        );
        assert_eq!(
            errors
                .iter()
                .filter(|e| matches!(e, TypeError::DivisionByZero))
                .count(),
            1
        );

        let Statement::Assignment { value, .. } = &program.statements[0] else {
            panic!("expected assignment");
        };
        assert_eq!(value.ty, Ty::Invalid);
    }

    #[test]
    fn sema_division_by_zero_reported_even_for_bool_operand() {
        // The static divisor check is independent of operand typing.
        let (_, errors) = errors_of("z = true / 0;");

        assert!(errors.contains(&TypeError::DivisionByZero));
    }

    #[test]
    fn sema_non_integer_operand() {
        let (_, errors) = errors_of("x = true + 1;");

        assert_eq!(
            errors,
            vec![TypeError::NonIntegerOperand(BinaryOperator::Add)]
        );
    }

    #[test]
    fn sema_invalid_operand_not_reported_twice() {
        // `q` is undefined (one error); the enclosing additions are
        // poisoned without further reports.
        let (_, errors) = errors_of("x = q + 1 + 2;");

        assert_eq!(errors, vec![TypeError::UndefinedVariable("q".into())]);
    }

    #[test]
    fn sema_unresolved_value_assignment() {
        // `q` is undefined, so `x` is declared invalid with an extra error.
        let (_, errors) = errors_of("x = q;");

        assert_eq!(
            errors,
            vec![
                TypeError::UndefinedVariable("q".into()),
                TypeError::UnresolvedValue("x".into()),
            ]
        );
    }

    #[test]
    fn sema_unresolved_print_argument() {
        let (_, errors) = errors_of("x = true + 1; print x;");

        assert_eq!(
            errors,
            vec![
                TypeError::NonIntegerOperand(BinaryOperator::Add),
                TypeError::UnresolvedValue("x".into()),
                TypeError::UnresolvedPrintArgument,
            ]
        );
    }

    #[test]
    fn sema_reanalysis_is_idempotent() {
        let mut program = parsed("a = 1; b = a + 2; print b; c = true;");

        let errors = Analyzer::new().analyze(&mut program);
        assert!(errors.is_empty());

        let first = format!("{program}");

        let errors = Analyzer::new().analyze(&mut program);
        assert!(errors.is_empty());

        assert_eq!(first, format!("{program}"));
    }

    #[test]
    fn sema_scope_chain_resolves_outer() {
        let mut table = SymbolTable::default();
        table.define("a", Ty::Int);

        table.enter_scope();
        table.define("b", Ty::Bool);

        assert_eq!(table.resolve("a").map(|s| s.ty), Some(Ty::Int));
        assert_eq!(table.resolve("b").map(|s| s.ty), Some(Ty::Bool));

        table.exit_scope();
        assert!(table.resolve("b").is_none());
        assert_eq!(table.resolve("a").map(|s| s.ty), Some(Ty::Int));
    }

    #[test]
    fn sema_shadowing_in_inner_scope() {
        let mut table = SymbolTable::default();
        table.define("a", Ty::Int);

        table.enter_scope();
        assert!(table.define("a", Ty::Bool));
        assert_eq!(table.resolve("a").map(|s| s.ty), Some(Ty::Bool));

        table.exit_scope();
        assert_eq!(table.resolve("a").map(|s| s.ty), Some(Ty::Int));
    }
}
