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

//! Lexer for formula source.
//!
//! Produces a flat token stream with 1-based line/column positions for
//! error reporting. Line comments start with `//` and run to the end of
//! the line; whitespace only separates tokens.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::{FormulaError, FormulaResult};

/// What a token is, independent of where it sits.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// An identifier or keyword-like name.
    Ident(String),
    /// A decimal number literal.
    Number(f64),
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `=`
    Equals,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `(`
    LParen,
    /// `)`
    RParen,
}

/// One token with its source position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The token itself.
    pub kind: TokenKind,
    /// 1-based source line.
    pub line: u32,
    /// 1-based source column.
    pub column: u32,
}

/// Tokenizes a complete formula source.
pub fn tokenize(source: &str) -> FormulaResult<Vec<Token>> {
    Lexer::new(source).run()
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn run(mut self) -> FormulaResult<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.bump();
                continue;
            }
            // Position of the token's first character.
            let line = self.line;
            let column = self.column;
            let kind = match c {
                '/' => {
                    self.bump();
                    if self.chars.peek() == Some(&'/') {
                        self.skip_comment();
                        continue;
                    }
                    TokenKind::Slash
                }
                '+' => self.single(TokenKind::Plus),
                '-' => self.single(TokenKind::Minus),
                '*' => self.single(TokenKind::Star),
                '=' => self.single(TokenKind::Equals),
                ',' => self.single(TokenKind::Comma),
                ';' => self.single(TokenKind::Semicolon),
                '(' => self.single(TokenKind::LParen),
                ')' => self.single(TokenKind::RParen),
                _ if c.is_ascii_digit() => self.scan_number(line, column)?,
                _ if c.is_ascii_alphabetic() || c == '_' => self.scan_ident(),
                _ => {
                    return Err(FormulaError::Lex {
                        line,
                        column,
                        message: format!("unexpected character {c:?}"),
                    });
                }
            };
            tokens.push(Token { kind, line, column });
        }
        Ok(tokens)
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.bump();
        kind
    }

    fn skip_comment(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn scan_number(&mut self, line: u32, column: u32) -> FormulaResult<TokenKind> {
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            // One decimal point at most; a second one ends the literal
            // and the main loop rejects it.
            if c.is_ascii_digit() || (c == '.' && !text.contains('.')) {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        let value = text.parse::<f64>().map_err(|_| FormulaError::Lex {
            line,
            column,
            message: format!("malformed number {text:?}"),
        })?;
        Ok(TokenKind::Number(value))
    }

    fn scan_ident(&mut self) -> TokenKind {
        let mut text = String::new();
        while let Some(&c) = self.chars.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        TokenKind::Ident(text)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("source should lex")
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn statement_tokens_in_order() {
        assert_eq!(
            kinds("target_fps = 60;"),
            vec![
                TokenKind::Ident("target_fps".to_string()),
                TokenKind::Equals,
                TokenKind::Number(60.0),
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn numbers_parse_integer_and_fractional_forms() {
        assert_eq!(
            kinds("0 42 0.25 3.5"),
            vec![
                TokenKind::Number(0.0),
                TokenKind::Number(42.0),
                TokenKind::Number(0.25),
                TokenKind::Number(3.5),
            ]
        );
    }

    #[test]
    fn comments_vanish_but_division_survives() {
        assert_eq!(
            kinds("a / b // the rest is gone / * ;\nc"),
            vec![
                TokenKind::Ident("a".to_string()),
                TokenKind::Slash,
                TokenKind::Ident("b".to_string()),
                TokenKind::Ident("c".to_string()),
            ]
        );
    }

    #[test]
    fn positions_are_one_based_and_track_lines() {
        let tokens = tokenize("a = 1;\n  b = 2;").expect("source should lex");
        let a = &tokens[0];
        assert_eq!((a.line, a.column), (1, 1));
        let one = &tokens[2];
        assert_eq!((one.line, one.column), (1, 5));
        let b = &tokens[4];
        assert_eq!((b.line, b.column), (2, 3));
    }

    #[test]
    fn stray_characters_fail_with_their_position() {
        let err = tokenize("a = 1;\nb = @;").expect_err("lex should fail");
        match err {
            FormulaError::Lex { line, column, .. } => {
                assert_eq!((line, column), (2, 5));
            }
            other => panic!("expected a lex error, got {other:?}"),
        }
    }

    #[test]
    fn second_decimal_point_is_rejected() {
        let err = tokenize("a = 1.2.3;").expect_err("lex should fail");
        assert!(matches!(err, FormulaError::Lex { .. }));
    }
}
