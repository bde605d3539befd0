//! The type model and its structural utilities.
//!
//! An unknown type is `None` throughout (`Option<DataType>`); unknowns
//! compare equal to anything so that one missing type does not cascade
//! into a wall of follow-on diagnostics.

use crate::definitions::{DataId, DeclId, Definitions, FuncId, FunctionDef, GenericId};
use vela_vm::VmType;

/// The type of an expression or declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    /// A primitive machine type.
    Prim(VmType),
    /// A user-defined record type. A name starting with `!` is the
    /// Dataframe view of the scalar record of the same name.
    Udt { name: String, def: DataId },
    /// Homogeneous sequence.
    Array(Box<DataType>),
    /// Function type; `None` parameter or return positions are wildcards
    /// (generic arguments, compiler intrinsics).
    Func {
        params: Vec<Option<DataType>>,
        ret: Box<Option<DataType>>,
    },
    /// The type of a name that denotes a type.
    Kind(Box<DataType>),
    /// Absence of a value.
    Void,
}

/// Codes for compiler-recognized intrinsics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilerCode {
    Store,
}

/// What a name may resolve to.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Decl(DeclId),
    Func(FuncId),
    Generic(GenericId),
    Data(DataId),
    /// Reserved for module resolution; imports are not yet implemented.
    Module(String),
    /// A built-in machine operator with its function type prebaked.
    /// `code` is the opcode mnemonic consumed by code generation.
    VmOp { code: String, ty: DataType },
    /// A built-in machine type name.
    VmType(VmType),
    /// A compiler intrinsic.
    Compiler { code: CompilerCode, ty: DataType },
}

/// Returns the type of a resolved reference, when it has one.
#[must_use]
pub fn resolved_type(defs: &Definitions, res: Option<&Resolved>) -> Option<DataType> {
    match res? {
        Resolved::Decl(id) => defs.decl(*id).ty.clone(),
        Resolved::Func(id) => Some(function_type(defs, defs.func(*id))),
        Resolved::Generic(id) => {
            let original = defs.generic(*id).original;
            Some(function_type(defs, defs.func(original)))
        }
        Resolved::Data(id) => Some(DataType::Kind(Box::new(DataType::Udt {
            name: defs.data(*id).name.clone(),
            def: *id,
        }))),
        Resolved::Module(_) => None,
        Resolved::VmOp { ty, .. } => Some(ty.clone()),
        Resolved::VmType(t) => Some(DataType::Kind(Box::new(DataType::Prim(*t)))),
        Resolved::Compiler { ty, .. } => Some(ty.clone()),
    }
}

/// Builds the function type of a definition from its argument declarations.
#[must_use]
pub fn function_type(defs: &Definitions, func: &FunctionDef) -> DataType {
    let params = func
        .args
        .iter()
        .map(|arg| defs.decl(*arg).ty.clone())
        .collect();
    DataType::Func {
        params,
        ret: Box::new(func.rettype.clone()),
    }
}

/// Returns the field scope a type owns, or zero.
#[must_use]
pub fn type_scope(defs: &Definitions, ty: Option<&DataType>) -> usize {
    match ty {
        Some(DataType::Udt { def, .. }) => defs.data(*def).scope,
        _ => 0,
    }
}

/// Returns the record definition behind a UDT type.
#[must_use]
pub fn data_def_id(ty: Option<&DataType>) -> Option<DataId> {
    match ty {
        Some(DataType::Udt { def, .. }) => Some(*def),
        _ => None,
    }
}

/// Structural type equality; an unknown side matches anything.
#[must_use]
pub fn same_type(defs: &Definitions, left: Option<&DataType>, right: Option<&DataType>) -> bool {
    let (Some(left), Some(right)) = (left, right) else {
        return true;
    };
    match (left, right) {
        (DataType::Prim(a), DataType::Prim(b)) => a == b,
        (DataType::Udt { def: a, .. }, DataType::Udt { def: b, .. }) => {
            let a = defs.data(*a);
            let b = defs.data(*b);
            a.body.len() == b.body.len()
                && a.body.iter().zip(&b.body).all(|(x, y)| {
                    let x = defs.decl(*x);
                    let y = defs.decl(*y);
                    x.name == y.name && same_type(defs, x.ty.as_ref(), y.ty.as_ref())
                })
        }
        (DataType::Array(a), DataType::Array(b)) => same_type(defs, Some(&**a), Some(&**b)),
        (
            DataType::Func {
                params: ap,
                ret: ar,
            },
            DataType::Func {
                params: bp,
                ret: br,
            },
        ) => {
            ap.len() == bp.len()
                && ap
                    .iter()
                    .zip(bp)
                    .all(|(a, b)| same_type(defs, a.as_ref(), b.as_ref()))
                && same_type(defs, (**ar).as_ref(), (**br).as_ref())
        }
        (DataType::Kind(a), DataType::Kind(b)) => same_type(defs, Some(&**a), Some(&**b)),
        (DataType::Void, DataType::Void) => true,
        _ => false,
    }
}

/// Round-trippable textual rendering of a type; `_` for unknown.
#[must_use]
pub fn type_string(defs: &Definitions, ty: Option<&DataType>) -> String {
    let Some(ty) = ty else {
        return "_".to_string();
    };
    match ty {
        DataType::Prim(t) => t.type_string().to_string(),
        DataType::Udt { name, .. } => name.clone(),
        DataType::Array(inner) => format!("[{}]", type_string(defs, Some(inner.as_ref()))),
        DataType::Func { params, ret } => {
            let params: Vec<String> = params
                .iter()
                .map(|p| type_string(defs, p.as_ref()))
                .collect();
            format!(
                "({}) -> {}",
                params.join(", "),
                type_string(defs, (**ret).as_ref())
            )
        }
        DataType::Kind(inner) => format!("Kind({})", type_string(defs, Some(inner.as_ref()))),
        DataType::Void => "()".to_string(),
    }
}

/// Unwraps one level of array or kind.
#[must_use]
pub fn underlying_type(ty: Option<&DataType>) -> Option<DataType> {
    match ty? {
        DataType::Array(inner) | DataType::Kind(inner) => Some((**inner).clone()),
        _ => None,
    }
}

/// Argument types accepted by a callable type. A kind of a record type is
/// its constructor: one argument per field.
#[must_use]
pub fn argtypes(defs: &Definitions, ty: Option<&DataType>) -> Vec<Option<DataType>> {
    match ty {
        Some(DataType::Func { params, .. }) => params.clone(),
        Some(DataType::Kind(inner)) => match data_def_id(Some(inner.as_ref())) {
            Some(id) => defs
                .data(id)
                .body
                .iter()
                .map(|field| defs.decl(*field).ty.clone())
                .collect(),
            None => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Result type of calling a callable type. Calling a kind constructs the
/// denoted type.
#[must_use]
pub fn rettype(ty: Option<&DataType>) -> Option<DataType> {
    match ty? {
        DataType::Func { ret, .. } => (**ret).clone(),
        DataType::Kind(inner) => Some((**inner).clone()),
        _ => None,
    }
}

#[must_use]
pub fn is_string(ty: Option<&DataType>) -> bool {
    matches!(ty, Some(DataType::Prim(VmType::Ss)))
}

#[must_use]
pub fn is_indexable(ty: Option<&DataType>) -> bool {
    matches!(ty, Some(DataType::Prim(VmType::I64s)))
}

#[must_use]
pub fn is_boolean(ty: Option<&DataType>) -> bool {
    matches!(ty, Some(DataType::Prim(VmType::B8s)))
}

/// A Dataframe is a UDT whose name begins with `!`.
#[must_use]
pub fn is_dataframe(ty: Option<&DataType>) -> bool {
    matches!(ty, Some(DataType::Udt { name, .. }) if name.starts_with('!'))
}

#[must_use]
pub fn is_array(ty: Option<&DataType>) -> bool {
    matches!(ty, Some(DataType::Array(_)))
}

/// Functions and kinds (casts, constructors) can be called. An unknown
/// callee is treated as callable to avoid cascading diagnostics.
#[must_use]
pub fn is_callable(ty: Option<&DataType>) -> bool {
    matches!(ty, None | Some(DataType::Func { .. }) | Some(DataType::Kind(_)))
}

#[must_use]
pub fn is_kind(ty: Option<&DataType>) -> bool {
    matches!(ty, Some(DataType::Kind(_)))
}

#[must_use]
pub fn is_void(ty: Option<&DataType>) -> bool {
    matches!(ty, Some(DataType::Void))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::Declaration;

    fn decl(defs: &mut Definitions, name: &str, ty: DataType) -> DeclId {
        defs.add_decl(Declaration {
            name: name.to_string(),
            explicit_type: None,
            value: None,
            ty: Some(ty),
            offset: 0,
        })
    }

    #[test]
    fn unknown_matches_anything() {
        let defs = Definitions::new();
        assert!(same_type(
            &defs,
            None,
            Some(&DataType::Prim(VmType::I64s))
        ));
        assert!(same_type(&defs, None, None));
    }

    #[test]
    fn udt_equality_is_structural() {
        let mut defs = Definitions::new();
        let x1 = decl(&mut defs, "x", DataType::Prim(VmType::I64s));
        let a = defs.add_data(crate::DataDef {
            name: "A".to_string(),
            body: vec![x1],
            scope: 0,
        });
        let x2 = decl(&mut defs, "x", DataType::Prim(VmType::I64s));
        let b = defs.add_data(crate::DataDef {
            name: "B".to_string(),
            body: vec![x2],
            scope: 0,
        });
        let ta = DataType::Udt {
            name: "A".to_string(),
            def: a,
        };
        let tb = DataType::Udt {
            name: "B".to_string(),
            def: b,
        };
        assert!(same_type(&defs, Some(&ta), Some(&tb)));
    }

    #[test]
    fn udt_field_name_mismatch() {
        let mut defs = Definitions::new();
        let x = decl(&mut defs, "x", DataType::Prim(VmType::I64s));
        let a = defs.add_data(crate::DataDef {
            name: "A".to_string(),
            body: vec![x],
            scope: 0,
        });
        let y = decl(&mut defs, "y", DataType::Prim(VmType::I64s));
        let b = defs.add_data(crate::DataDef {
            name: "B".to_string(),
            body: vec![y],
            scope: 0,
        });
        let ta = DataType::Udt {
            name: "A".to_string(),
            def: a,
        };
        let tb = DataType::Udt {
            name: "B".to_string(),
            def: b,
        };
        assert!(!same_type(&defs, Some(&ta), Some(&tb)));
    }

    #[test]
    fn function_type_wildcards() {
        let defs = Definitions::new();
        let open = DataType::Func {
            params: vec![None],
            ret: Box::new(Some(DataType::Void)),
        };
        let closed = DataType::Func {
            params: vec![Some(DataType::Prim(VmType::Ss))],
            ret: Box::new(Some(DataType::Void)),
        };
        assert!(same_type(&defs, Some(&open), Some(&closed)));
    }

    #[test]
    fn rendering_round_trips_names() {
        let defs = Definitions::new();
        let ty = DataType::Array(Box::new(DataType::Prim(VmType::F64s)));
        assert_eq!(type_string(&defs, Some(&ty)), "[f64s]");
        let func = DataType::Func {
            params: vec![Some(DataType::Prim(VmType::I64s)), None],
            ret: Box::new(Some(DataType::Void)),
        };
        assert_eq!(type_string(&defs, Some(&func)), "(i64s, _) -> ()");
        assert_eq!(
            type_string(&defs, Some(&DataType::Kind(Box::new(ty)))),
            "Kind([f64s])"
        );
    }

    #[test]
    fn kind_of_record_is_its_constructor() {
        let mut defs = Definitions::new();
        let x = decl(&mut defs, "x", DataType::Prim(VmType::I64s));
        let y = decl(&mut defs, "y", DataType::Prim(VmType::F64s));
        let p = defs.add_data(crate::DataDef {
            name: "Point".to_string(),
            body: vec![x, y],
            scope: 0,
        });
        let kind = DataType::Kind(Box::new(DataType::Udt {
            name: "Point".to_string(),
            def: p,
        }));
        let args = argtypes(&defs, Some(&kind));
        assert_eq!(args.len(), 2);
        assert_eq!(args[0], Some(DataType::Prim(VmType::I64s)));
        let ret = rettype(Some(&kind)).unwrap();
        assert!(matches!(ret, DataType::Udt { ref name, .. } if name == "Point"));
    }
}
