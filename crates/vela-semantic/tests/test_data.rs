//! Record definitions, member access, constructors, and casts.

mod common;
use common::{errors_of, last_decl_type, last_expr, last_expr_type, should_fail, should_pass};
use vela_hir::{ExprKind, type_string};

const POINT: &str = "data Point: x: i64s, y: i64s end\n";

#[test]
fn record_definition_and_constructor() {
    assert_eq!(
        last_decl_type(&format!("{POINT}p := Point(1, 2)")),
        "Point"
    );
}

#[test]
fn type_name_is_a_kind() {
    assert_eq!(last_expr_type(&format!("{POINT}Point")), "Kind(Point)");
}

#[test]
fn member_access_types() {
    assert_eq!(
        last_expr_type(&format!("{POINT}p := Point(1, 2)\np.x")),
        "i64s"
    );
}

#[test]
fn member_carries_its_resolution() {
    let (expr, _) = last_expr(&format!("{POINT}p := Point(1, 2)\np.x"));
    let ExprKind::Member { res, .. } = &expr.kind else {
        panic!("expected member access");
    };
    assert!(res.is_some());
}

#[test]
fn unknown_member_is_reported() {
    let errors = errors_of(&format!("{POINT}p := Point(1, 2)\np.z"));
    assert!(errors.contains("z is not a member"));
}

#[test]
fn primitives_have_no_members() {
    let errors = errors_of("a := 3\na.x");
    assert!(errors.contains("value does not have members"));
}

#[test]
fn constructor_arity_is_checked() {
    let errors = errors_of(&format!("{POINT}p := Point(1)"));
    assert!(errors.contains("wrong number of arguments"));
}

#[test]
fn constructor_argument_types_are_checked() {
    let errors = errors_of(&format!("{POINT}p := Point(1, \"two\")"));
    assert!(errors.contains("argument type at position 1"));
}

#[test]
fn lowercase_type_names_are_rejected() {
    let errors = errors_of("data point: x: i64s end");
    assert!(errors.contains("must begin with upper-case letter"));
}

#[test]
fn duplicate_type_is_rejected() {
    assert!(should_fail(&format!("{POINT}{POINT}")));
}

#[test]
fn broken_record_is_not_visible_later() {
    let errors = errors_of("data Bad: x: missing end\np := Bad(1)");
    assert!(errors.contains("symbol Bad was not found"));
}

#[test]
fn record_fields_keep_their_order_and_offsets() {
    let (module, defs) = common::passes(POINT);
    let Some(vela_hir::Stmt::Data(id)) = module.body.first() else {
        panic!("expected a data definition");
    };
    let data = defs.data(*id);
    let names: Vec<_> = data
        .body
        .iter()
        .map(|d| (defs.decl(*d).name.clone(), defs.decl(*d).offset))
        .collect();
    assert_eq!(
        names,
        vec![("x".to_string(), 0), ("y".to_string(), 1)]
    );
}

#[test]
fn structural_equality_ignores_type_names() {
    let source = "data A: x: i64s end\ndata B: x: i64s end\ndata C: y: i64s end";
    let (module, defs) = common::passes(source);
    let ids: Vec<_> = module
        .body
        .iter()
        .map(|s| match s {
            vela_hir::Stmt::Data(id) => *id,
            _ => panic!("expected data definitions"),
        })
        .collect();
    let ty = |i: usize| vela_hir::DataType::Udt {
        name: defs.data(ids[i]).name.clone(),
        def: ids[i],
    };
    assert!(vela_hir::same_type(&defs, Some(&ty(0)), Some(&ty(1))));
    assert!(!vela_hir::same_type(&defs, Some(&ty(0)), Some(&ty(2))));
}

#[test]
fn cast_definition_returns_its_own_type() {
    let source = "data Celsius: deg: f64s end\n\
                  def Celsius(x: f64s) -> Celsius:\n return Celsius(x)\nend\n\
                  c := Celsius(3.5)";
    assert_eq!(last_decl_type(source), "Celsius");
}

#[test]
fn cast_with_wrong_return_type_is_rejected() {
    let source = "data Celsius: deg: f64s end\n\
                  def Celsius(x: f64s) -> f64s:\n return x\nend";
    let errors = errors_of(source);
    assert!(errors.contains("must return its own type"));
}

#[test]
fn cast_must_name_a_type() {
    let errors = errors_of("def Foo(x: i64s) -> i64s:\n return x\nend");
    assert!(errors.contains("cast definition must be for a type"));
}

#[test]
fn dataframe_view_wraps_each_field_in_an_array() {
    let (expr, defs) = last_expr(&format!("{POINT}!Point"));
    // the name denotes the Dataframe type itself
    assert_eq!(type_string(&defs, expr.ty.as_ref()), "Kind(!Point)");
    let Some(vela_hir::DataType::Kind(inner)) = expr.ty else {
        panic!("expected a kind");
    };
    assert_eq!(
        common::fields_of(&defs, &inner),
        vec![
            ("x".to_string(), "[i64s]".to_string()),
            ("y".to_string(), "[i64s]".to_string())
        ]
    );
}

#[test]
fn dataframe_of_unknown_record_is_reported() {
    let errors = errors_of("!Nowhere");
    assert!(errors.contains("symbol !Nowhere was not found"));
}

#[test]
fn dataframe_declarations() {
    assert_eq!(last_decl_type(&format!("{POINT}let t: !Point")), "!Point");
}

#[test]
fn self_referential_record_resolves() {
    assert!(should_pass("data Node: value: i64s, next: Node end"));
}
