//! HIR statement and module nodes.

use crate::definitions::{DataId, DeclId, FuncId, GenericId};
use crate::expression::Expr;
use vela_parser::ast::DeclKind;

/// A statement in analyzed form. Definitions are arena ids; their nodes
/// live in [`crate::Definitions`].
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Decl { kind: DeclKind, decls: Vec<DeclId> },
    Assign { target: Expr, value: Expr },
    Del(Vec<Expr>),
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    While { test: Expr, body: Vec<Stmt> },
    Return(Option<Expr>),
    Data(DataId),
    Func(FuncId),
    Generic(GenericId),
}

/// An analyzed module.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub body: Vec<Stmt>,
    pub docstring: String,
}
