//! High-level IR (HIR) for the Vela compiler.
//!
//! HIR is the output of semantic analysis: the AST with every identifier
//! resolved to a definition and every expression carrying a concrete type.
//! Definitions (declarations, functions, generics, record types) live in a
//! [`Definitions`] arena and are referenced by typed indices, so the
//! cyclic references that recursion and self-referential record types
//! create never need shared ownership.

mod definitions;
mod display;
mod expression;
mod statement;
mod types;

pub use definitions::{
    DataDef, DataId, DeclId, Declaration, Definitions, FuncId, FunctionDef, GenericFunctionDef,
    GenericId,
};
pub use vela_parser::ast::{BinOpKind, DeclKind, JoinDirection, UnaryOpKind};
pub use display::print_module;
pub use expression::{Alias, Expr, ExprKind, Slice};
pub use statement::{Module, Stmt};
pub use types::{
    CompilerCode, DataType, Resolved, argtypes, data_def_id, function_type, is_array, is_boolean,
    is_callable, is_dataframe, is_indexable, is_kind, is_string, is_void, rettype, resolved_type,
    same_type, type_scope, type_string, underlying_type,
};
