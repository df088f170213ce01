// Copyright 2025 the gf-sdk authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Recursive-descent parser for formula source.
//!
//! Grammar, in order of binding strength:
//!
//! ```text
//! program   := statement*
//! statement := ident '=' expr ';'
//! expr      := term (('+' | '-') term)*
//! term      := unary (('*' | '/') unary)*
//! unary     := '-' unary | primary
//! primary   := number | ident | call | '(' expr ')'
//! call      := builtin '(' expr (',' expr)* ')'
//! ```
//!
//! Calls are checked against the built-in table here, so unknown
//! function names and wrong arities fail at parse time with a position.

use crate::error::{FormulaError, FormulaResult};
use crate::token::{Token, TokenKind};

/// Functions callable from formula source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `min(a, b)` — the smaller of two values.
    Min,
    /// `max(a, b)` — the larger of two values.
    Max,
    /// `clamp(x, lo, hi)` — `x` limited to `[lo, hi]`.
    Clamp,
}

impl Builtin {
    fn resolve(name: &str) -> Option<Self> {
        match name {
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "clamp" => Some(Self::Clamp),
            _ => None,
        }
    }

    /// Number of arguments the builtin takes.
    pub fn arity(self) -> usize {
        match self {
            Self::Min | Self::Max => 2,
            Self::Clamp => 3,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Clamp => "clamp",
        }
    }
}

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
}

/// An expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A number literal.
    Number(f64),
    /// An identifier; resolution happens at compile time.
    Ident(String),
    /// Arithmetic negation.
    Neg(Box<Expr>),
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// A builtin call with arity already checked.
    Call {
        /// Which builtin.
        builtin: Builtin,
        /// Arguments in source order.
        args: Vec<Expr>,
    },
}

/// One `target = expr;` statement with the target's position.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Assignment target name.
    pub target: String,
    /// 1-based line of the target.
    pub line: u32,
    /// 1-based column of the target.
    pub column: u32,
    /// Right-hand side.
    pub expr: Expr,
}

/// Parses a token stream into statements.
pub fn parse(tokens: &[Token]) -> FormulaResult<Vec<Statement>> {
    let mut parser = Parser { tokens, pos: 0 };
    let mut statements = Vec::new();
    while parser.pos < parser.tokens.len() {
        statements.push(parser.statement()?);
    }
    Ok(statements)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl Parser<'_> {
    fn statement(&mut self) -> FormulaResult<Statement> {
        let (target, line, column) = match self.advance() {
            Some(Token {
                kind: TokenKind::Ident(name),
                line,
                column,
            }) => (name.clone(), *line, *column),
            _ => return Err(self.error_here("expected an assignment target")),
        };
        self.expect(&TokenKind::Equals, "expected '=' after the target")?;
        let expr = self.expr()?;
        self.expect(&TokenKind::Semicolon, "expected ';' after the expression")?;
        Ok(Statement {
            target,
            line,
            column,
            expr,
        })
    }

    fn expr(&mut self) -> FormulaResult<Expr> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.term()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn term(&mut self) -> FormulaResult<Expr> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek_kind() {
                Some(TokenKind::Star) => BinOp::Mul,
                Some(TokenKind::Slash) => BinOp::Div,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.unary()?;
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            };
        }
        Ok(lhs)
    }

    fn unary(&mut self) -> FormulaResult<Expr> {
        if self.peek_kind() == Some(&TokenKind::Minus) {
            self.pos += 1;
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> FormulaResult<Expr> {
        match self.advance() {
            Some(Token {
                kind: TokenKind::Number(value),
                ..
            }) => Ok(Expr::Number(*value)),
            Some(Token {
                kind: TokenKind::Ident(name),
                line,
                column,
            }) => {
                let (name, line, column) = (name.clone(), *line, *column);
                if self.peek_kind() == Some(&TokenKind::LParen) {
                    self.call(&name, line, column)
                } else {
                    Ok(Expr::Ident(name))
                }
            }
            Some(Token {
                kind: TokenKind::LParen,
                ..
            }) => {
                let inner = self.expr()?;
                self.expect(&TokenKind::RParen, "expected ')' to close the group")?;
                Ok(inner)
            }
            _ => Err(self.error_here("expected a number, name, call or '('")),
        }
    }

    fn call(&mut self, name: &str, line: u32, column: u32) -> FormulaResult<Expr> {
        let Some(builtin) = Builtin::resolve(name) else {
            return Err(FormulaError::Parse {
                line,
                column,
                message: format!("unknown function '{name}'"),
            });
        };
        self.expect(&TokenKind::LParen, "expected '(' after the function name")?;
        let mut args = vec![self.expr()?];
        while self.peek_kind() == Some(&TokenKind::Comma) {
            self.pos += 1;
            args.push(self.expr()?);
        }
        self.expect(&TokenKind::RParen, "expected ')' to close the call")?;
        if args.len() != builtin.arity() {
            return Err(FormulaError::Parse {
                line,
                column,
                message: format!(
                    "{} expects {} arguments, got {}",
                    builtin.name(),
                    builtin.arity(),
                    args.len()
                ),
            });
        }
        Ok(Expr::Call { builtin, args })
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|token| &token.kind)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn expect(&mut self, kind: &TokenKind, message: &str) -> FormulaResult<()> {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error_here(message))
        }
    }

    /// A parse error at the current token, or just past the last one
    /// when the stream ended early.
    fn error_here(&self, message: &str) -> FormulaError {
        let (line, column) = match self.tokens.get(self.pos) {
            Some(token) => (token.line, token.column),
            None => match self.tokens.last() {
                Some(token) => (token.line, token.column + 1),
                None => (1, 1),
            },
        };
        FormulaError::Parse {
            line,
            column,
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;

    fn statements(source: &str) -> Vec<Statement> {
        parse(&tokenize(source).expect("source should lex")).expect("source should parse")
    }

    fn parse_err(source: &str) -> FormulaError {
        parse(&tokenize(source).expect("source should lex")).expect_err("parse should fail")
    }

    #[test]
    fn single_assignment_shape() {
        let parsed = statements("drop_fps = 30;");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].target, "drop_fps");
        assert_eq!((parsed[0].line, parsed[0].column), (1, 1));
        assert_eq!(parsed[0].expr, Expr::Number(30.0));
    }

    #[test]
    fn product_binds_tighter_than_sum() {
        let parsed = statements("target_fps = 2 + 3 * 4;");
        let Expr::Binary { op: BinOp::Add, rhs, .. } = &parsed[0].expr else {
            panic!("expected the sum at the root, got {:?}", parsed[0].expr);
        };
        assert!(
            matches!(**rhs, Expr::Binary { op: BinOp::Mul, .. }),
            "the product should hang off the sum"
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        let parsed = statements("target_fps = (2 + 3) * 4;");
        let Expr::Binary { op: BinOp::Mul, lhs, .. } = &parsed[0].expr else {
            panic!("expected the product at the root, got {:?}", parsed[0].expr);
        };
        assert!(matches!(**lhs, Expr::Binary { op: BinOp::Add, .. }));
    }

    #[test]
    fn unary_minus_nests() {
        let parsed = statements("ema_alpha = --0.2;");
        let Expr::Neg(inner) = &parsed[0].expr else {
            panic!("expected a negation, got {:?}", parsed[0].expr);
        };
        assert_eq!(**inner, Expr::Neg(Box::new(Expr::Number(0.2))));
    }

    #[test]
    fn calls_carry_their_arguments() {
        let parsed = statements("ema_alpha = clamp(alpha, 0.05, 0.5);");
        let Expr::Call { builtin, args } = &parsed[0].expr else {
            panic!("expected a call, got {:?}", parsed[0].expr);
        };
        assert_eq!(*builtin, Builtin::Clamp);
        assert_eq!(args.len(), 3);
        assert_eq!(args[0], Expr::Ident("alpha".to_string()));
    }

    #[test]
    fn unknown_functions_fail_at_the_call_site() {
        let err = parse_err("target_fps = sqrt(2);");
        match err {
            FormulaError::Parse { line, column, message } => {
                assert_eq!((line, column), (1, 14));
                assert!(message.contains("sqrt"), "got {message:?}");
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn wrong_arity_fails_with_the_expected_count() {
        let err = parse_err("target_fps = min(1, 2, 3);");
        match err {
            FormulaError::Parse { message, .. } => {
                assert!(message.contains("min expects 2 arguments, got 3"), "got {message:?}");
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn missing_semicolon_points_past_the_expression() {
        let err = parse_err("target_fps = 60");
        match err {
            FormulaError::Parse { message, .. } => {
                assert!(message.contains(';'), "got {message:?}");
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn several_statements_parse_in_order() {
        let parsed = statements("target_fps = 120;\ndrop_fps = target_fps / 4;\n");
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].target, "target_fps");
        assert_eq!(parsed[1].target, "drop_fps");
        assert_eq!((parsed[1].line, parsed[1].column), (2, 1));
    }
}
