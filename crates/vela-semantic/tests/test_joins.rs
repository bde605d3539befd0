//! Join typing tests.

mod common;
use common::{errors_of, fields_of, last_expr};

const TABLES: &str = "data Trade: sym: Ss, ts: i64s, price: f64s end\n\
                      data Quote: sym: Ss, ts: i64s, bid: f64s end\n\
                      let t: !Trade\nlet q: !Quote\n";

fn join_fields(source: &str) -> Vec<(String, String)> {
    let (expr, defs) = last_expr(source);
    let ty = expr.ty.expect("join should have a type");
    fields_of(&defs, &ty)
}

#[test]
fn asof_join_merges_schemas() {
    let fields = join_fields(&format!("{TABLES}join t, q on sym asof ts"));
    assert_eq!(
        fields,
        vec![
            ("sym".to_string(), "[Ss]".to_string()),
            ("ts".to_string(), "[i64s]".to_string()),
            ("price".to_string(), "[f64s]".to_string()),
            ("bid".to_string(), "[f64s]".to_string())
        ]
    );
}

#[test]
fn equijoin_drops_only_the_key_columns() {
    let source = "data Master: sym: Ss, sector: Ss end\n\
                  data Trade: sym: Ss, price: f64s end\n\
                  let m: !Master\nlet t: !Trade\n\
                  join t, m on sym";
    assert_eq!(
        join_fields(source),
        vec![
            ("sym".to_string(), "[Ss]".to_string()),
            ("price".to_string(), "[f64s]".to_string()),
            ("sector".to_string(), "[Ss]".to_string())
        ]
    );
}

#[test]
fn nearest_join_with_tolerance() {
    assert!(common::should_pass(&format!(
        "{TABLES}join t, q on sym asof ts nearest within 5"
    )));
}

#[test]
fn within_tolerance_type_must_match_the_key_difference() {
    let errors = errors_of(&format!("{TABLES}join t, q on sym asof ts within 5.0"));
    assert!(errors.contains("not compatible with 'within'"));
    assert!(errors.contains("expected i64s, got f64s"));
}

#[test]
fn strict_nearest_is_contradictory() {
    let errors = errors_of(&format!("{TABLES}join t, q on sym asof ts strict nearest"));
    assert!(errors.contains("cannot be both 'nearest' and 'strict'"));
}

#[test]
fn asof_key_must_be_subtractable_for_nearest() {
    let errors = errors_of(&format!("{TABLES}join t, q on ts asof sym nearest"));
    assert!(errors.contains("prohibit 'within' or 'nearest'"));
}

#[test]
fn on_keys_must_agree_structurally() {
    let source = "data Trade: id: i64s, price: f64s end\n\
                  data Ref: id: Ss, name: Ss end\n\
                  let t: !Trade\nlet r: !Ref\n\
                  join t, r on id";
    let errors = errors_of(source);
    assert!(errors.contains("join 'on' types are not compatible"));
}

#[test]
fn asof_keys_must_agree() {
    let source = "data Trade: ts: i64s, price: f64s end\n\
                  data Quote: ts: f64s, bid: f64s end\n\
                  let t: !Trade\nlet q: !Quote\n\
                  join t, q asof ts";
    let errors = errors_of(source);
    assert!(errors.contains("join 'asof' types are not compatible"));
}

#[test]
fn both_operands_must_be_dataframes() {
    let errors = errors_of(&format!("{TABLES}x := 3\njoin t, x on sym"));
    assert!(errors.contains("join for right must be on Dataframe"));
}

#[test]
fn on_columns_resolve_against_each_side() {
    let (expr, _) = last_expr(&format!("{TABLES}join t, q on sym asof ts"));
    let vela_hir::ExprKind::Join {
        left_on, right_on, ..
    } = &expr.kind
    else {
        panic!("expected a join");
    };
    assert_eq!(left_on.len(), 1);
    assert_eq!(right_on.len(), 1);
    assert!(matches!(
        left_on[0].value.kind,
        vela_hir::ExprKind::ImpliedMember { .. }
    ));
    assert!(matches!(
        right_on[0].value.kind,
        vela_hir::ExprKind::ImpliedMember { .. }
    ));
}

#[test]
fn join_result_is_queryable() {
    let source = format!(
        "{TABLES}j := join t, q on sym asof ts\nfrom j select avg(bid) by sym"
    );
    let fields = join_fields(&source);
    assert_eq!(
        fields,
        vec![
            ("sym".to_string(), "[Ss]".to_string()),
            ("avg_bid".to_string(), "[f64s]".to_string())
        ]
    );
}
