//! Whole-pass properties: typing completeness and determinism.

mod common;
use common::passes;
use vela_hir::{Definitions, Expr, ExprKind, Module, Slice, Stmt};
use vela_parser::parse;
use vela_semantic::analyze;

const PROGRAM: &str = "\
data Trade: sym: Ss, price: f64s, volume: i64s end
let t: !Trade
def spread(hi: f64s, lo: f64s) -> f64s:
 return hi - lo
end
def id(x):
 return x
end
a := id(3)
s := spread(2.5, 1.5)
u := from t select avg(price) by sym where volume > 0
v := sort t by sym
xs := [1, 2, 3]
x := xs[0]
if x > 0:
 y := not false
end
";

/// Walks every expression of a statement, depth first.
fn walk_stmt(defs: &Definitions, stmt: &Stmt, visit: &mut impl FnMut(&Expr)) {
    match stmt {
        Stmt::Expr(e) => walk_expr(e, visit),
        Stmt::Decl { decls, .. } => {
            for decl in decls {
                let decl = defs.decl(*decl);
                if let Some(e) = &decl.explicit_type {
                    walk_expr(e, visit);
                }
                if let Some(e) = &decl.value {
                    walk_expr(e, visit);
                }
            }
        }
        Stmt::Assign { target, value } => {
            walk_expr(target, visit);
            walk_expr(value, visit);
        }
        Stmt::Del(targets) => {
            for t in targets {
                walk_expr(t, visit);
            }
        }
        Stmt::If { test, body, orelse } => {
            walk_expr(test, visit);
            for s in body.iter().chain(orelse) {
                walk_stmt(defs, s, visit);
            }
        }
        Stmt::While { test, body } => {
            walk_expr(test, visit);
            for s in body {
                walk_stmt(defs, s, visit);
            }
        }
        Stmt::Return(Some(e)) => walk_expr(e, visit),
        Stmt::Return(None) | Stmt::Data(_) => {}
        Stmt::Func(id) => {
            for s in &defs.func(*id).body {
                walk_stmt(defs, s, visit);
            }
        }
        Stmt::Generic(id) => {
            // the original body is untyped by design; instantiations are not
            for inst in &defs.generic(*id).instantiated {
                for s in &defs.func(*inst).body {
                    walk_stmt(defs, s, visit);
                }
            }
        }
    }
}

fn walk_expr(expr: &Expr, visit: &mut impl FnMut(&Expr)) {
    visit(expr);
    match &expr.kind {
        ExprKind::Integer(_)
        | ExprKind::Float(_)
        | ExprKind::Bool(_)
        | ExprKind::Str(_)
        | ExprKind::Char(_)
        | ExprKind::Id { .. }
        | ExprKind::OverloadedId { .. } => {}
        ExprKind::SuffixedLiteral { literal, .. } => walk_expr(literal, visit),
        ExprKind::ImpliedMember { table, .. } => walk_expr(table, visit),
        ExprKind::Member { value, .. } => walk_expr(value, visit),
        ExprKind::Subscript { value, slice } => {
            walk_expr(value, visit);
            match &**slice {
                Slice::Index(e) => walk_expr(e, visit),
                Slice::Range { lower, upper, step } => {
                    for e in [lower, upper, step].into_iter().flatten() {
                        walk_expr(e, visit);
                    }
                }
            }
        }
        ExprKind::Call { func, args } => {
            walk_expr(func, visit);
            for a in args {
                walk_expr(a, visit);
            }
        }
        ExprKind::Unary { operand, .. } => walk_expr(operand, visit),
        ExprKind::Binary { left, right, .. } => {
            walk_expr(left, visit);
            walk_expr(right, visit);
        }
        ExprKind::List(values) => {
            for v in values {
                walk_expr(v, visit);
            }
        }
        ExprKind::Paren(inner) => walk_expr(inner, visit),
        ExprKind::Query {
            table,
            cols,
            by,
            filter,
            ..
        } => {
            walk_expr(table, visit);
            for a in cols.iter().chain(by) {
                walk_expr(&a.value, visit);
            }
            if let Some(f) = filter {
                walk_expr(f, visit);
            }
        }
        ExprKind::Sort { table, by, .. } => {
            walk_expr(table, visit);
            for a in by {
                walk_expr(&a.value, visit);
            }
        }
        ExprKind::Join {
            left,
            right,
            left_on,
            right_on,
            left_asof,
            right_asof,
            within,
            ..
        } => {
            walk_expr(left, visit);
            walk_expr(right, visit);
            for a in left_on.iter().chain(right_on) {
                walk_expr(&a.value, visit);
            }
            for a in [left_asof, right_asof].into_iter().flatten() {
                walk_expr(&a.value, visit);
            }
            if let Some(w) = within {
                walk_expr(w, visit);
            }
        }
        // the template callee is a placeholder name, not a resolved value
        ExprKind::TemplateInst { args, .. } => {
            for a in args {
                walk_expr(a, visit);
            }
        }
    }
}

#[test]
fn every_expression_carries_a_type() {
    let (module, defs) = passes(PROGRAM);
    let mut untyped = Vec::new();
    for stmt in &module.body {
        walk_stmt(&defs, stmt, &mut |e: &Expr| {
            if e.ty.is_none() {
                untyped.push(format!("{:?}", e.kind));
            }
        });
    }
    assert!(untyped.is_empty(), "untyped expressions: {untyped:?}");
}

#[test]
fn analysis_is_deterministic() {
    let render = |source: &str| {
        let ast = parse(source, false, false).unwrap();
        let (module, defs) = analyze(&ast, false, false).unwrap();
        vela_hir::print_module(&defs, &module)
    };
    assert_eq!(render(PROGRAM), render(PROGRAM));
}

#[test]
fn rendered_types_resolve_back_to_equal_types() {
    // two relational results with the same shape synthesize records that
    // compare structurally equal even though their names differ
    let source = "data Trade: sym: Ss, price: f64s end\nlet t: !Trade\n\
                  a := from t select price\n\
                  b := from t select price where price > 0.0";
    let (module, defs) = passes(source);
    let tys: Vec<_> = module.body[2..]
        .iter()
        .map(|s| match s {
            Stmt::Decl { decls, .. } => defs.decl(decls[0]).ty.clone().expect("typed"),
            _ => panic!("expected declarations"),
        })
        .collect();
    assert!(vela_hir::same_type(&defs, Some(&tys[0]), Some(&tys[1])));
    assert_ne!(
        vela_hir::type_string(&defs, Some(&tys[0])),
        vela_hir::type_string(&defs, Some(&tys[1]))
    );
}

#[test]
fn calls_resolve_to_monomorphic_callables() {
    let (module, defs) = passes(PROGRAM);
    for stmt in &module.body {
        walk_stmt(&defs, stmt, &mut |e: &Expr| {
            if let ExprKind::Call { func, .. } = &e.kind {
                assert!(
                    !func.is_overloaded(),
                    "call through an unresolved overload set"
                );
                if let ExprKind::Id { res: Some(res), .. } = &func.kind {
                    assert!(
                        !matches!(res, vela_hir::Resolved::Generic(_)),
                        "call through an uninstantiated generic"
                    );
                }
            }
        });
    }
}
