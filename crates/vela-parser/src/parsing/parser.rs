//! Core parser structure and helper methods.

use vela_core::{Error, Result, Span};
use vela_lexer::{Token, TokenKind};

/// Parser for Vela source code.
pub struct Parser<'a> {
    tokens: &'a [(Token, Span)],
    current: usize,
    interactive: bool,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given token stream.
    pub fn new(tokens: &'a [(Token, Span)], interactive: bool) -> Self {
        Self {
            tokens,
            current: 0,
            interactive,
        }
    }

    // ==================== Helper Methods ====================

    pub(crate) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len()
    }

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.current).map(|(t, _)| t)
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.peek().is_some_and(|t| &t.kind == kind)
    }

    pub(crate) fn check_ahead(&self, offset: usize, kind: &TokenKind) -> bool {
        self.tokens
            .get(self.current + offset)
            .is_some_and(|t| &t.0.kind == kind)
    }

    pub(crate) fn advance(&mut self) {
        if !self.is_at_end() {
            self.current += 1;
        }
    }

    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind) -> Result<Span> {
        if self.check(kind) {
            let span = self.current_span();
            self.advance();
            Ok(span)
        } else {
            Err(self.unexpected(&format!("'{kind}'")))
        }
    }

    /// A definable function name: an identifier or an overloadable
    /// operator symbol.
    pub(crate) fn expect_function_name(&mut self) -> Result<String> {
        const OPERATORS: &[TokenKind] = &[
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Percent,
            TokenKind::Less,
            TokenKind::LessEqual,
            TokenKind::Greater,
            TokenKind::GreaterEqual,
            TokenKind::EqualEqual,
            TokenKind::BangEqual,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Not,
        ];
        if let Some(token) = self.peek() {
            if OPERATORS.contains(&token.kind) {
                let text = token.text.clone();
                self.advance();
                return Ok(text);
            }
        }
        self.expect_identifier()
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String> {
        if self.check(&TokenKind::Identifier) {
            let name = self.peek().expect("checked").text.clone();
            self.advance();
            Ok(name)
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    /// Consumes any run of newline/semicolon separators.
    pub(crate) fn skip_separators(&mut self) {
        while self.match_token(&TokenKind::Newline) || self.match_token(&TokenKind::Semicolon) {}
    }

    /// Consumes newlines only (used after `:` and `,` inside blocks).
    pub(crate) fn skip_newlines(&mut self) {
        while self.match_token(&TokenKind::Newline) {}
    }

    pub(crate) fn current_span(&self) -> Span {
        match self.tokens.get(self.current).or_else(|| self.tokens.last()) {
            Some((_, span)) => *span,
            None => Span::from_range(0, 0),
        }
    }

    /// Builds an "expected X, found Y" parse error at the current token.
    pub(crate) fn unexpected(&self, expected: &str) -> Error {
        let span = self.current_span();
        match self.peek() {
            Some(token) => {
                let found = if token.kind == TokenKind::Newline {
                    "end of line".to_string()
                } else {
                    format!("'{}'", token.text)
                };
                Error::Parser(format!("Expected {expected}, found {found}"), span)
            }
            None if self.interactive => {
                Error::Parser(format!("Expected {expected} (unexpected end of input)"), span)
            }
            None => Error::Parser(format!("Expected {expected}, found end of file"), span),
        }
    }
}
