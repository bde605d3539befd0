//! Overload definition and resolution tests.

mod common;
use common::{errors_of, last_expr, last_expr_type, should_fail, should_pass};
use vela_hir::{ExprKind, Resolved};

const OVERLOADS: &str = "def f(x: i64s) -> i64s:\n return x\nend\n\
                         def f(x: Ss) -> Ss:\n return x\nend\n";

#[test]
fn overloads_resolve_by_argument_type() {
    assert_eq!(last_expr_type(&format!("{OVERLOADS}f(1)")), "i64s");
    assert_eq!(last_expr_type(&format!("{OVERLOADS}f(\"a\")")), "Ss");
}

#[test]
fn call_rewrites_the_callee_to_one_candidate() {
    let (expr, _) = last_expr(&format!("{OVERLOADS}f(1)"));
    let ExprKind::Call { func, .. } = &expr.kind else {
        panic!("expected a call");
    };
    let ExprKind::Id { res: Some(res), .. } = &func.kind else {
        panic!("expected a resolved callee, got {:?}", func.kind);
    };
    assert!(matches!(res, Resolved::Func(_)));
}

#[test]
fn bare_overloaded_name_stays_overloaded() {
    let (expr, _) = last_expr(&format!("{OVERLOADS}f"));
    assert!(matches!(expr.kind, ExprKind::OverloadedId { .. }));
}

#[test]
fn duplicate_signature_is_rejected() {
    let source = "def g(x: i64s) -> i64s:\n return x\nend\n\
                  def g(x: i64s) -> i64s:\n return x + x\nend";
    let errors = errors_of(source);
    assert!(errors.contains("symbol g was already defined"));
}

#[test]
fn same_arguments_different_return_is_still_an_overload() {
    let source = "def h(x: i64s) -> i64s:\n return x\nend\n\
                  def h(x: i64s) -> f64s:\n return 1.5\nend";
    // distinct function types may share a name; the first match wins
    assert_eq!(last_expr_type(&format!("{source}\nh(3)")), "i64s");
}

#[test]
fn no_match_lists_candidates() {
    let errors = errors_of(&format!("{OVERLOADS}f(true)"));
    assert!(errors.contains("unable to match overloaded function f"));
    assert!(errors.contains("candidate: (i64s) -> i64s"));
    assert!(errors.contains("candidate: (Ss) -> Ss"));
}

#[test]
fn long_candidate_lists_are_truncated() {
    let errors = errors_of("1 + \"s\"");
    assert!(errors.contains("unable to match overloaded function +"));
    assert!(errors.contains("others>"));
}

#[test]
fn builtin_operators_pick_scalar_and_vector_shapes() {
    assert_eq!(last_expr_type("1 + 2"), "i64s");
    assert_eq!(last_expr_type("1.5 * 2.0"), "f64s");
    assert_eq!(last_expr_type("[1, 2] + 3"), "[i64s]");
    assert_eq!(last_expr_type("3 + [1, 2]"), "[i64s]");
    assert_eq!(last_expr_type("[1, 2] + [3, 4]"), "[i64s]");
    assert_eq!(last_expr_type("\"a\" + \"b\""), "Ss");
}

#[test]
fn comparisons_are_boolean() {
    assert_eq!(last_expr_type("1 < 2"), "b8s");
    assert_eq!(last_expr_type("[1, 2] > 0"), "[b8s]");
    assert_eq!(last_expr_type("\"a\" == \"b\""), "b8s");
    assert_eq!(last_expr_type("1 == 2 and 3 == 3"), "b8s");
    assert_eq!(last_expr_type("not true"), "b8s");
}

#[test]
fn unary_minus_works_on_both_shapes() {
    assert_eq!(last_expr_type("-3"), "i64s");
    assert_eq!(last_expr_type("-[1.5, 2.5]"), "[f64s]");
}

#[test]
fn aggregations() {
    assert_eq!(last_expr_type("sum([1, 2])"), "i64s");
    assert_eq!(last_expr_type("avg([1, 2])"), "f64s");
    assert_eq!(last_expr_type("max([1.5])"), "f64s");
    assert_eq!(last_expr_type("count([\"a\"])"), "i64s");
}

#[test]
fn mixed_numeric_arithmetic_is_not_implicit() {
    assert!(should_fail("1 + 2.5"));
}

#[test]
fn user_functions_may_overload_builtin_operators() {
    let source = "def +(a: Ss, b: i64s) -> Ss:\n return a\nend\n\"x\" + 3";
    assert_eq!(last_expr_type(source), "Ss");
}

#[test]
fn types_may_be_overloaded_by_functions_only() {
    // a function may share a type's name (a cast)
    assert!(should_pass(
        "data T: x: i64s end\ndef T(x: i64s) -> T:\n return T(x)\nend"
    ));
}

#[test]
fn values_may_not_join_an_overload_set() {
    let errors = errors_of("def g(x: i64s) -> i64s:\n return x\nend\ng := 3");
    assert!(errors.contains("symbol g was already defined"));
}
