//! Function definition and call tests.

mod common;
use common::{errors_of, last_decl_type, last_expr_type, should_fail, should_pass};

const ADD: &str = "def add(x: i64s, y: i64s) -> i64s:\n return x + y\nend\n";

#[test]
fn monomorphic_definition_and_call() {
    assert_eq!(last_expr_type(&format!("{ADD}add(1, 2)")), "i64s");
}

#[test]
fn inferred_return_type_matches_explicit() {
    assert_eq!(
        last_expr_type("def double(x: i64s):\n return x + x\nend\ndouble(4)"),
        "i64s"
    );
}

#[test]
fn functions_are_first_class_names() {
    assert_eq!(last_expr_type(&format!("{ADD}add")), "(i64s, i64s) -> i64s");
}

#[test]
fn recursion_sees_the_function_name() {
    let source = "def fact(n: i64s) -> i64s:\n\
                  if n <= 1:\n return 1\nelse:\n return n * fact(n - 1)\nend\n\
                  end\n\
                  fact(5)";
    assert_eq!(last_expr_type(source), "i64s");
}

#[test]
fn wrong_argument_count_is_reported() {
    let errors = errors_of(&format!("{ADD}add(1)"));
    assert!(errors.contains("wrong number of arguments; expected 2 but got 1"));
}

#[test]
fn wrong_argument_type_is_reported() {
    let errors = errors_of(&format!("{ADD}add(1, \"two\")"));
    assert!(errors.contains("argument type at position 1"));
}

#[test]
fn calling_a_value_is_reported() {
    let errors = errors_of("a := 3\na(1)");
    assert!(errors.contains("type i64s is not callable"));
}

#[test]
fn missing_returns_are_reported() {
    let errors = errors_of("def f() -> i64s:\n x := 1\nend");
    assert!(errors.contains("function f has no return statements"));
}

#[test]
fn annotated_empty_body_is_allowed() {
    assert!(should_pass("def f() -> i64s:\nend"));
}

#[test]
fn unannotated_empty_body_is_rejected() {
    assert!(should_fail("def f():\nend"));
}

#[test]
fn mismatched_returns_are_reported() {
    let errors = errors_of("def f(b: b8s):\nif b:\n return 1\nelse:\n return \"one\"\nend\nend");
    assert!(errors.contains("mismatched return types in function f"));
}

#[test]
fn return_conflicting_with_annotation_is_reported() {
    let errors = errors_of("def f() -> Ss:\n return 1\nend");
    assert!(errors.contains("mismatched return types"));
}

#[test]
fn return_outside_a_function_is_reported() {
    let errors = errors_of("return 3");
    assert!(errors.contains("return statement is not in function body"));
}

#[test]
fn arguments_shadow_outer_declarations() {
    let source = "x := \"outer\"\n\
                  def f(x: i64s) -> i64s:\n return x\nend\n\
                  f(1)";
    assert_eq!(last_expr_type(source), "i64s");
}

#[test]
fn arguments_are_not_visible_outside() {
    let errors = errors_of("def f(inner: i64s) -> i64s:\n return inner\nend\ninner");
    assert!(errors.contains("symbol inner was not found"));
}

#[test]
fn broken_definition_is_not_callable_later() {
    let errors = errors_of("def f() -> i64s:\n return \"s\"\nend\nf()");
    assert!(errors.contains("symbol f was not found"));
}

#[test]
fn docstrings_are_kept() {
    let (module, defs) = common::passes("def f() -> i64s:\n \"answers\"\n return 42\nend");
    let Some(vela_hir::Stmt::Func(id)) = module.body.first() else {
        panic!("expected a function definition");
    };
    assert_eq!(defs.func(*id).docstring, "answers");
}

#[test]
fn suffixed_literals_resolve_to_suffix_functions() {
    let source = "def suffixkm(x: i64s) -> i64s:\n return x * 1000\nend\nd := 5km";
    assert_eq!(last_decl_type(source), "i64s");
}

#[test]
fn unknown_suffix_is_reported() {
    let errors = errors_of("d := 5parsec");
    assert!(errors.contains("symbol suffixparsec was not found"));
}
