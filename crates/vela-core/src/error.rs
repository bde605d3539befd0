//! Error types and result aliases for the Vela compiler.

use crate::Span;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Main error type for the Vela compiler.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lexer error: {0}")]
    #[diagnostic(code(vela::lexer))]
    Lexer(String, #[label("here")] Span),

    #[error("Parser error: {0}")]
    #[diagnostic(code(vela::parser))]
    Parser(String, #[label("here")] Span),

    /// Accumulated semantic diagnostics, one "Error: ..." line each.
    #[error("{0}")]
    #[diagnostic(code(vela::semantic))]
    Semantic(String),

    #[error("Not yet implemented: {0}")]
    Unsupported(String),

    #[error("Code generation error: {0}")]
    Codegen(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Table inference error: {0}")]
    Table(String),
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::from(span.start.offset..span.end.offset)
    }
}

/// Result type alias using the Vela Error type.
pub type Result<T> = std::result::Result<T, Error>;
