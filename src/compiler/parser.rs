//! Syntax Analysis
//!
//! Compiler pass that parses a token stream into an abstract syntax tree,
//! using two tokens of lookahead and `precedence climbing` for expressions.
//!
//! Errors accumulate rather than aborting the parse. After a statement fails,
//! the parser resynchronizes by skipping to just past the next `;` (or end of
//! input), so one early mistake does not cascade into spurious errors for
//! every following token.

use crate::compiler::ast::{BinaryOperator, Expression, ExprKind, Identifier, Program, Statement};
use crate::compiler::lexer::{Lexer, Token, TokenKind};
use crate::error::SyntaxError;

/// Binding powers, lowest to highest. Operators only combine when the
/// upcoming token binds strictly tighter than the caller's minimum, which
/// also makes `+ - * /` left-associate among themselves.
const LOWEST: u8 = 0;
/// Reserved for `=` in expression position; no infix rule is registered for
/// it, so the level only keeps the ladder explicit.
const ASSIGN: u8 = 1;
const SUM: u8 = 2;
const PRODUCT: u8 = 3;

/// Returns the binding power of `kind` as an infix operator.
const fn precedence(kind: TokenKind) -> u8 {
    match kind {
        TokenKind::Assign => ASSIGN,
        TokenKind::Plus | TokenKind::Minus => SUM,
        TokenKind::Asterisk | TokenKind::Slash => PRODUCT,
        _ => LOWEST,
    }
}

/// Returns the infix rule for `kind`: the binary operator it builds, or
/// `None` if no rule is registered.
const fn infix_op(kind: TokenKind) -> Option<BinaryOperator> {
    match kind {
        TokenKind::Plus => Some(BinaryOperator::Add),
        TokenKind::Minus => Some(BinaryOperator::Subtract),
        TokenKind::Asterisk => Some(BinaryOperator::Multiply),
        TokenKind::Slash => Some(BinaryOperator::Divide),
        _ => None,
    }
}

/// Comment node produced for a comment surfacing at the top level. Parsed
/// so the stream advances, then dropped; comments never reach the statement
/// list.
#[derive(Debug)]
struct Comment {
    #[allow(dead_code)]
    text: String,
}

/// Parses a `Program` from a pull-based token source, buffering exactly two
/// tokens of lookahead.
#[derive(Debug)]
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    cur: Token,
    peek: Token,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    /// Returns a new `Parser` over `lexer`.
    ///
    /// The first token is taken as-is (so a leading comment can surface at
    /// the top level); from then on `advance` keeps comments out of the
    /// lookahead, so expression contexts never see them.
    #[must_use]
    pub fn new(mut lexer: Lexer<'a>) -> Self {
        let cur = lexer.next_token();

        let mut peek = lexer.next_token();
        while peek.kind.is_comment() {
            peek = lexer.next_token();
        }

        Self {
            lexer,
            cur,
            peek,
            errors: vec![],
        }
    }

    /// Parses the whole token stream, returning the program and every syntax
    /// error encountered.
    pub fn parse_program(mut self) -> (Program, Vec<SyntaxError>) {
        let mut program = Program::default();

        while self.cur.kind != TokenKind::Eof {
            if self.cur.kind.is_comment() {
                // Parsed but never added to the statement list.
                let _comment = Comment {
                    text: self.cur.literal.clone(),
                };

                self.advance();
                continue;
            }

            match self.parse_statement() {
                Some(stmt) => {
                    program.statements.push(stmt);
                    self.advance();
                }
                None => self.synchronize(),
            }
        }

        (program, self.errors)
    }

    /// Parses one statement. On entry `cur` is the statement's first token;
    /// on success `cur` is its last token (terminator included, if present).
    ///
    /// No two statement forms are ambiguous given one token of lookahead.
    fn parse_statement(&mut self) -> Option<Statement> {
        match self.cur.kind {
            TokenKind::Print => self.parse_print_statement(),
            TokenKind::Ident if self.peek.kind == TokenKind::Assign => {
                self.parse_assignment_statement()
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_print_statement(&mut self) -> Option<Statement> {
        // Move past the `print` keyword to the expression's first token.
        self.advance();

        let expr = self.parse_expression(LOWEST)?;
        self.consume_optional_semicolon();

        Some(Statement::Print(expr))
    }

    fn parse_assignment_statement(&mut self) -> Option<Statement> {
        let target = Identifier::new(self.cur.literal.clone());

        if !self.expect_peek(TokenKind::Assign) {
            return None;
        }

        // Move past the `=` to the value expression's first token.
        self.advance();

        let value = self.parse_expression(LOWEST)?;
        self.consume_optional_semicolon();

        Some(Statement::Assignment { target, value })
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expr = self.parse_expression(LOWEST)?;
        self.consume_optional_semicolon();

        Some(Statement::Expression(expr))
    }

    /// Parses an expression whose operators all bind tighter than
    /// `min_prec`. On entry `cur` is the expression's first token; on exit
    /// `cur` is its last.
    fn parse_expression(&mut self, min_prec: u8) -> Option<Expression> {
        let mut left = self.parse_prefix()?;

        while self.peek.kind != TokenKind::Semicolon && min_prec < precedence(self.peek.kind) {
            let Some(op) = infix_op(self.peek.kind) else {
                // Upcoming token has a binding power but no infix rule
                // (`=` in expression position); the expression ends here.
                return Some(left);
            };

            // Consume the operator, then parse the right-hand side with the
            // operator's own binding power so equal levels left-associate.
            self.advance();
            let prec = precedence(self.cur.kind);
            self.advance();

            let rhs = self.parse_expression(prec)?;

            left = Expression::new(ExprKind::Binary {
                op,
                lhs: Box::new(left),
                rhs: Box::new(rhs),
            });
        }

        Some(left)
    }

    /// Dispatches on the token kinds that can start an expression.
    fn parse_prefix(&mut self) -> Option<Expression> {
        match self.cur.kind {
            TokenKind::Int => self.parse_int_literal(),
            TokenKind::True => Some(Expression::new(ExprKind::BoolLiteral(true))),
            TokenKind::False => Some(Expression::new(ExprKind::BoolLiteral(false))),
            TokenKind::Ident => Some(Expression::new(ExprKind::Ident(self.cur.literal.clone()))),
            TokenKind::ParenOpen => self.parse_grouped_expression(),
            kind => {
                self.errors.push(SyntaxError::NoPrefixRule {
                    kind,
                    literal: self.cur.literal.clone(),
                    line: self.cur.line,
                    col: self.cur.col,
                });
                None
            }
        }
    }

    fn parse_int_literal(&mut self) -> Option<Expression> {
        match self.cur.literal.parse::<i64>() {
            Ok(value) => Some(Expression::new(ExprKind::IntLiteral(value))),
            Err(_) => {
                self.errors.push(SyntaxError::IntLiteralOutOfRange {
                    literal: self.cur.literal.clone(),
                    line: self.cur.line,
                    col: self.cur.col,
                });
                None
            }
        }
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        // Move past the `(`.
        self.advance();

        let inner = self.parse_expression(LOWEST)?;

        if !self.expect_peek(TokenKind::ParenClose) {
            return None;
        }

        Some(inner)
    }

    /// Advances the lookahead if `peek` matches, otherwise records a
    /// descriptive mismatch error.
    fn expect_peek(&mut self, expected: TokenKind) -> bool {
        if self.peek.kind == expected {
            self.advance();
            true
        } else {
            self.errors.push(SyntaxError::UnexpectedToken {
                expected,
                found: self.peek.kind,
                literal: self.peek.literal.clone(),
                line: self.peek.line,
                col: self.peek.col,
            });
            false
        }
    }

    /// Consumes a statement terminator if one follows; terminators are
    /// optional before end of input.
    fn consume_optional_semicolon(&mut self) {
        if self.peek.kind == TokenKind::Semicolon {
            self.advance();
        }
    }

    /// Skips to just past the next statement terminator (or to end of
    /// input) so parsing can resume at a statement boundary.
    fn synchronize(&mut self) {
        while self.cur.kind != TokenKind::Semicolon && self.cur.kind != TokenKind::Eof {
            self.advance();
        }

        if self.cur.kind == TokenKind::Semicolon {
            self.advance();
        }
    }

    /// Advances the two-token lookahead, transparently skipping comment
    /// tokens so `cur`/`peek` are never comments inside expression contexts.
    fn advance(&mut self) {
        self.cur = std::mem::replace(&mut self.peek, self.lexer.next_token());

        while self.peek.kind.is_comment() {
            self.peek = self.lexer.next_token();
        }
    }
}

/// Parses `source` into a `Program`, or the full list of syntax errors.
///
/// # Errors
///
/// Returns every syntax error encountered, in source order.
pub fn parse(source: &str) -> Result<Program, Vec<SyntaxError>> {
    let (program, errors) = Parser::new(Lexer::new(source)).parse_program();

    if errors.is_empty() {
        Ok(program)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ast::Ty;

    fn parse_ok(source: &str) -> Program {
        match parse(source) {
            Ok(program) => program,
            Err(errors) => panic!("unexpected syntax errors: {errors:?}"),
        }
    }

    fn int(value: i64) -> Expression {
        Expression::new(ExprKind::IntLiteral(value))
    }

    fn binary(op: BinaryOperator, lhs: Expression, rhs: Expression) -> Expression {
        Expression::new(ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    #[test]
    fn parser_assignment_statement() {
        let program = parse_ok("x = 5;");

        assert_eq!(program.statements.len(), 1);
        assert_eq!(
            program.statements[0],
            Statement::Assignment {
                target: Identifier::new("x".into()),
                value: int(5),
            }
        );
    }

    #[test]
    fn parser_multiplication_binds_tighter_than_addition() {
        let program = parse_ok("x = 1 + 2 * 3;");

        let expected = binary(
            BinaryOperator::Add,
            int(1),
            binary(BinaryOperator::Multiply, int(2), int(3)),
        );

        assert_eq!(
            program.statements[0],
            Statement::Assignment {
                target: Identifier::new("x".into()),
                value: expected,
            }
        );
    }

    #[test]
    fn parser_subtraction_left_associates() {
        let program = parse_ok("1 - 2 - 3;");

        let expected = binary(
            BinaryOperator::Subtract,
            binary(BinaryOperator::Subtract, int(1), int(2)),
            int(3),
        );

        assert_eq!(program.statements[0], Statement::Expression(expected));
    }

    #[test]
    fn parser_division_left_associates() {
        let program = parse_ok("8 / 4 / 2;");

        let expected = binary(
            BinaryOperator::Divide,
            binary(BinaryOperator::Divide, int(8), int(4)),
            int(2),
        );

        assert_eq!(program.statements[0], Statement::Expression(expected));
    }

    #[test]
    fn parser_parens_override_precedence() {
        let program = parse_ok("(1 + 2) * 3;");

        let expected = binary(
            BinaryOperator::Multiply,
            binary(BinaryOperator::Add, int(1), int(2)),
            int(3),
        );

        assert_eq!(program.statements[0], Statement::Expression(expected));
    }

    #[test]
    fn parser_print_boolean_literal() {
        let program = parse_ok("print true;");

        assert_eq!(
            program.statements[0],
            Statement::Print(Expression::new(ExprKind::BoolLiteral(true)))
        );
    }

    #[test]
    fn parser_trailing_semicolon_optional() {
        let program = parse_ok("x = 1");

        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn parser_parsed_nodes_are_unresolved() {
        let program = parse_ok("x = 1 + 2;");

        let Statement::Assignment { target, value } = &program.statements[0] else {
            panic!("expected assignment");
        };

        assert_eq!(target.ty, Ty::Unresolved);
        assert_eq!(value.ty, Ty::Unresolved);
    }

    #[test]
    fn parser_comments_are_dropped() {
        let program = parse_ok("// leading\nx = 1; /* between */ y = 2; // trailing");

        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn parser_comment_inside_expression_is_skipped() {
        let program = parse_ok("x = 1 + /* two */ 2;");

        let expected = binary(BinaryOperator::Add, int(1), int(2));

        assert_eq!(
            program.statements[0],
            Statement::Assignment {
                target: Identifier::new("x".into()),
                value: expected,
            }
        );
    }

    #[test]
    fn parser_no_prefix_rule_error() {
        let errors = parse(")").expect_err("expected syntax errors");

        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], SyntaxError::NoPrefixRule { .. }));
    }

    #[test]
    fn parser_missing_paren_error() {
        let errors = parse("x = (1 + 2;").expect_err("expected syntax errors");

        assert!(matches!(
            errors[0],
            SyntaxError::UnexpectedToken {
                expected: TokenKind::ParenClose,
                ..
            }
        ));
    }

    #[test]
    fn parser_resynchronizes_after_error() {
        // The first statement is broken; the parser should skip past its
        // terminator and still parse the second statement cleanly.
        let (program, errors) = Parser::new(Lexer::new("x = ); y = 2;")).parse_program();

        assert_eq!(errors.len(), 1);
        assert_eq!(program.statements.len(), 1);
        assert!(matches!(
            program.statements[0],
            Statement::Assignment { ref target, .. } if target.name == "y"
        ));
    }

    #[test]
    fn parser_int_literal_out_of_range() {
        let errors = parse("x = 99999999999999999999;").expect_err("expected syntax errors");

        assert!(matches!(
            errors[0],
            SyntaxError::IntLiteralOutOfRange { .. }
        ));
    }

    #[test]
    fn parser_assignment_in_expression_position_ends_expression() {
        // `y = 2` after `x = y` cannot continue the value expression; the
        // `=` has a binding power but no infix rule.
        let errors = parse("x = y = 2;").expect_err("expected syntax errors");

        assert!(matches!(errors[0], SyntaxError::NoPrefixRule { .. }));
    }
}
