//! Lexical analysis for the Vela language.
//!
//! This crate provides tokenization of Vela source code into a stream of
//! tokens. Newlines are tokens (they separate statements) except inside
//! parentheses or brackets, where they are dropped so expressions can span
//! lines.

mod token;

pub use token::{Token, TokenKind};

use logos::Logos;
use vela_core::{Error, Result, Span};

/// Tokenizes Vela source code into a vector of tokens.
///
/// # Arguments
/// * `source` - The source code to tokenize
///
/// # Returns
/// A vector of tokens with their spans
///
/// # Errors
/// Returns an error if the source contains invalid tokens
///
/// # Examples
/// ```
/// use vela_lexer::tokenize;
///
/// let source = "a := 3";
/// let tokens = tokenize(source).unwrap();
/// ```
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(source);
    let mut bracket_depth = 0usize;

    while let Some(result) = lexer.next() {
        let kind = result.map_err(|()| {
            Error::Lexer(
                format!("Invalid token at position {}", lexer.span().start),
                Span::from_range(lexer.span().start, lexer.span().end),
            )
        })?;

        match kind {
            TokenKind::LeftParen | TokenKind::LeftBracket => bracket_depth += 1,
            TokenKind::RightParen | TokenKind::RightBracket => {
                bracket_depth = bracket_depth.saturating_sub(1);
            }
            TokenKind::Newline if bracket_depth > 0 => continue,
            _ => {}
        }

        let span = lexer.span();
        let text = lexer.slice().to_string();

        tokens.push((Token { kind, text }, Span::from_range(span.start, span.end)));
    }

    Ok(tokens)
}
