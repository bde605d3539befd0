//! The curated set of built-in names installed at startup.
//!
//! Primitive type names and machine operators are inserted into the
//! startup scope before any user code is analyzed. Insertion order is
//! load-bearing: overload resolution picks the first matching candidate,
//! so scalar operator shapes are registered before the vectorized ones.

use crate::symbol_table::SymbolTable;
use vela_hir::{CompilerCode, DataType, Resolved};
use vela_vm::VmType;

fn prim(t: VmType) -> DataType {
    DataType::Prim(t)
}

fn array(t: DataType) -> DataType {
    DataType::Array(Box::new(t))
}

fn func(params: Vec<DataType>, ret: DataType) -> DataType {
    DataType::Func {
        params: params.into_iter().map(Some).collect(),
        ret: Box::new(Some(ret)),
    }
}

fn op(table: &mut SymbolTable, name: &str, code: &str, params: Vec<DataType>, ret: DataType) {
    table.append(
        name,
        Resolved::VmOp {
            code: code.to_string(),
            ty: func(params, ret),
        },
    );
}

/// Registers a binary operator in its four shapes: scalar-scalar,
/// array-array, array-scalar, and scalar-array.
fn binop(table: &mut SymbolTable, name: &str, code: &str, operand: VmType, ret: VmType) {
    let s = prim(operand);
    let r = prim(ret);
    op(table, name, code, vec![s.clone(), s.clone()], r.clone());
    op(
        table,
        name,
        code,
        vec![array(s.clone()), array(s.clone())],
        array(r.clone()),
    );
    op(
        table,
        name,
        code,
        vec![array(s.clone()), s.clone()],
        array(r.clone()),
    );
    op(table, name, code, vec![s.clone(), array(s)], array(r));
}

/// Registers a unary operator on a scalar and its array form.
fn unop(table: &mut SymbolTable, name: &str, code: &str, operand: VmType, ret: VmType) {
    op(table, name, code, vec![prim(operand)], prim(ret));
    op(
        table,
        name,
        code,
        vec![array(prim(operand))],
        array(prim(ret)),
    );
}

/// Registers an aggregation over an array of `elem`, yielding `ret`.
fn agg(table: &mut SymbolTable, name: &str, code: &str, elem: VmType, ret: VmType) {
    op(table, name, code, vec![array(prim(elem))], prim(ret));
}

/// Installs all built-in names into the current (startup) scope.
pub fn install(table: &mut SymbolTable) {
    // the `store` intrinsic takes any value and a name
    table.append(
        "store",
        Resolved::Compiler {
            code: CompilerCode::Store,
            ty: DataType::Func {
                params: vec![None, Some(prim(VmType::Ss))],
                ret: Box::new(Some(DataType::Void)),
            },
        },
    );

    // primitive type names and their short aliases
    for t in VmType::ALL {
        table.append(t.type_string(), Resolved::VmType(t));
        if let Some(alias) = t.alias() {
            table.append(alias, Resolved::VmType(t));
        }
    }

    let numeric = [VmType::I64s, VmType::F64s];

    // arithmetic
    for t in numeric {
        binop(table, "+", "add", t, t);
        binop(table, "-", "sub", t, t);
        binop(table, "*", "mul", t, t);
        binop(table, "/", "div", t, t);
    }
    binop(table, "%", "rem", VmType::I64s, VmType::I64s);
    op(
        table,
        "+",
        "add",
        vec![prim(VmType::Ss), prim(VmType::Ss)],
        prim(VmType::Ss),
    );

    // comparison
    for t in numeric {
        binop(table, "<", "lt", t, VmType::B8s);
        binop(table, "<=", "le", t, VmType::B8s);
        binop(table, ">", "gt", t, VmType::B8s);
        binop(table, ">=", "ge", t, VmType::B8s);
    }
    for t in VmType::ALL {
        binop(table, "==", "eq", t, VmType::B8s);
        binop(table, "!=", "ne", t, VmType::B8s);
    }

    // logical
    binop(table, "and", "and", VmType::B8s, VmType::B8s);
    binop(table, "or", "or", VmType::B8s, VmType::B8s);
    unop(table, "not", "not", VmType::B8s, VmType::B8s);

    // sign
    for t in numeric {
        unop(table, "-", "neg", t, t);
        unop(table, "+", "pos", t, t);
    }

    // aggregations
    agg(table, "sum", "sum", VmType::I64s, VmType::I64s);
    agg(table, "sum", "sum", VmType::F64s, VmType::F64s);
    agg(table, "avg", "avg", VmType::I64s, VmType::F64s);
    agg(table, "avg", "avg", VmType::F64s, VmType::F64s);
    for t in numeric {
        agg(table, "min", "min", t, t);
        agg(table, "max", "max", t, t);
    }
    for t in VmType::ALL {
        agg(table, "count", "count", t, VmType::I64s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_and_aliases_resolve() {
        let mut table = SymbolTable::new();
        install(&mut table);
        assert_eq!(table.find("i64s"), vec![Resolved::VmType(VmType::I64s)]);
        assert_eq!(table.find("i64"), vec![Resolved::VmType(VmType::I64s)]);
        assert_eq!(table.find("Ss"), vec![Resolved::VmType(VmType::Ss)]);
    }

    #[test]
    fn operators_are_overload_sets_in_insertion_order() {
        let mut table = SymbolTable::new();
        install(&mut table);
        let plus = table.find("+");
        assert!(plus.len() > 4);
        // scalar integer addition is the first candidate
        let Resolved::VmOp { code, ty } = &plus[0] else {
            panic!("expected a machine operator");
        };
        assert_eq!(code, "add");
        let DataType::Func { params, .. } = ty else {
            panic!("expected a function type");
        };
        assert_eq!(params[0], Some(DataType::Prim(VmType::I64s)));
    }

    #[test]
    fn store_intrinsic_has_a_wildcard_first_parameter() {
        let mut table = SymbolTable::new();
        install(&mut table);
        let store = table.find("store");
        let Resolved::Compiler { ty, .. } = &store[0] else {
            panic!("expected a compiler intrinsic");
        };
        let DataType::Func { params, ret } = ty else {
            panic!("expected a function type");
        };
        assert_eq!(params[0], None);
        assert_eq!(**ret, Some(DataType::Void));
    }
}
