//! Common test utilities for semantic analysis tests.

#![allow(dead_code)]

use vela_core::Result;
use vela_hir::{DataType, Definitions, Module, Stmt, type_string};
use vela_parser::parse;
use vela_semantic::analyze;

/// Parses and analyzes one source module.
pub fn analyze_source(source: &str) -> Result<(Module, Definitions)> {
    let ast = parse(source, false, false)?;
    analyze(&ast, false, false)
}

/// Analyzes source that is expected to be valid.
pub fn passes(source: &str) -> (Module, Definitions) {
    match analyze_source(source) {
        Ok(result) => result,
        Err(e) => panic!("expected analysis to pass, got: {e}"),
    }
}

pub fn should_pass(source: &str) -> bool {
    analyze_source(source).is_ok()
}

pub fn should_fail(source: &str) -> bool {
    analyze_source(source).is_err()
}

/// The collected diagnostic text of source that must fail analysis.
pub fn errors_of(source: &str) -> String {
    match analyze_source(source) {
        Err(vela_core::Error::Semantic(text)) => text,
        Err(other) => panic!("expected semantic diagnostics, got: {other}"),
        Ok(_) => panic!("expected analysis to fail"),
    }
}

/// The rendered type of the last top-level expression statement.
pub fn last_expr_type(source: &str) -> String {
    let (module, defs) = passes(source);
    let Some(Stmt::Expr(e)) = module.body.last() else {
        panic!("last statement is not an expression");
    };
    type_string(&defs, e.ty.as_ref())
}

/// The last top-level expression statement and the definitions arena.
pub fn last_expr(source: &str) -> (vela_hir::Expr, Definitions) {
    let (module, defs) = passes(source);
    let Some(Stmt::Expr(e)) = module.body.last() else {
        panic!("last statement is not an expression");
    };
    (e.clone(), defs)
}

/// The rendered type of the declaration introduced by the last statement.
pub fn last_decl_type(source: &str) -> String {
    let (module, defs) = passes(source);
    let Some(Stmt::Decl { decls, .. }) = module.body.last() else {
        panic!("last statement is not a declaration");
    };
    let decl = defs.decl(*decls.last().expect("declaration list is non-empty"));
    type_string(&defs, decl.ty.as_ref())
}

/// The field (name, rendered type) pairs of a record type.
pub fn fields_of(defs: &Definitions, ty: &DataType) -> Vec<(String, String)> {
    let DataType::Udt { def, .. } = ty else {
        panic!("expected a record type, got {}", type_string(defs, Some(ty)));
    };
    defs.data(*def)
        .body
        .iter()
        .map(|field| {
            let field = defs.decl(*field);
            (field.name.clone(), type_string(defs, field.ty.as_ref()))
        })
        .collect()
}
