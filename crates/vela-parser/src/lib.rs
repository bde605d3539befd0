//! AST definitions and parser for the Vela language.

pub mod ast;
mod parsing;

pub use ast::{
    Alias, BinOpKind, DeclKind, Declaration, Expr, FunctionDef, JoinDirection, Module, Slice, Stmt,
    UnaryOpKind,
};
pub use parsing::Parser;

use vela_core::Result;

/// Parses Vela source code into an AST module.
///
/// # Arguments
/// * `source` - The source code to parse
/// * `interactive` - Report truncated input as such (REPL continuation)
/// * `dump_ast` - Print the parsed AST to stdout
///
/// # Errors
/// Returns an error if tokenization or parsing fails.
pub fn parse(source: &str, interactive: bool, dump_ast: bool) -> Result<Module> {
    let tokens = vela_lexer::tokenize(source)?;
    let mut parser = Parser::new(&tokens, interactive);
    let module = parser.parse_module()?;
    if dump_ast {
        println!("{module:#?}");
    }
    Ok(module)
}
