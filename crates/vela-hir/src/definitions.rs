//! The definitions arena.
//!
//! Declarations, record definitions, and function definitions are shared:
//! a declaration is owned by its `data`/`def`/`let` statement but also
//! referenced from the symbol table, and a function may reference itself
//! recursively through its own body. All of them therefore live in one
//! arena and are addressed by typed indices.

use crate::expression::Expr;
use crate::statement::Stmt;
use crate::types::DataType;

macro_rules! arena_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub u32);

        impl $name {
            #[must_use]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id!(
    /// Index of a [`Declaration`] in the arena.
    DeclId
);
arena_id!(
    /// Index of a [`FunctionDef`] in the arena.
    FuncId
);
arena_id!(
    /// Index of a [`GenericFunctionDef`] in the arena.
    GenericId
);
arena_id!(
    /// Index of a [`DataDef`] in the arena.
    DataId
);

/// A resolved `name [: type] [= value]` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub explicit_type: Option<Expr>,
    pub value: Option<Expr>,
    pub ty: Option<DataType>,
    /// Field position within the enclosing record, when relevant.
    pub offset: usize,
}

/// A record type definition. `scope` is the symbol-table scope holding the
/// fields; member access on values of this type resolves against it.
#[derive(Debug, Clone, PartialEq)]
pub struct DataDef {
    pub name: String,
    pub body: Vec<DeclId>,
    pub scope: usize,
}

/// A fully analyzed function definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub args: Vec<DeclId>,
    pub body: Vec<Stmt>,
    pub explicit_rettype: Option<Expr>,
    pub docstring: String,
    pub rettype: Option<DataType>,
}

/// A generic function: at least one argument has no explicit type.
///
/// The unanalyzed source definition is retained so each call site can be
/// monomorphized by re-analyzing the body with the actual argument types
/// bound in the generic's defining scope.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericFunctionDef {
    pub original: FuncId,
    pub source: vela_parser::ast::FunctionDef,
    /// The scope the generic was defined in; instantiation bodies are
    /// analyzed under it.
    pub scope: usize,
    pub instantiated: Vec<FuncId>,
}

/// Arena owning every definition produced by an analysis session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definitions {
    decls: Vec<Declaration>,
    funcs: Vec<FunctionDef>,
    generics: Vec<GenericFunctionDef>,
    datas: Vec<DataDef>,
}

impl Definitions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_decl(&mut self, decl: Declaration) -> DeclId {
        self.decls.push(decl);
        DeclId(self.decls.len() as u32 - 1)
    }

    #[must_use]
    pub fn decl(&self, id: DeclId) -> &Declaration {
        &self.decls[id.index()]
    }

    pub fn decl_mut(&mut self, id: DeclId) -> &mut Declaration {
        &mut self.decls[id.index()]
    }

    pub fn add_func(&mut self, func: FunctionDef) -> FuncId {
        self.funcs.push(func);
        FuncId(self.funcs.len() as u32 - 1)
    }

    #[must_use]
    pub fn func(&self, id: FuncId) -> &FunctionDef {
        &self.funcs[id.index()]
    }

    pub fn func_mut(&mut self, id: FuncId) -> &mut FunctionDef {
        &mut self.funcs[id.index()]
    }

    pub fn add_generic(&mut self, generic: GenericFunctionDef) -> GenericId {
        self.generics.push(generic);
        GenericId(self.generics.len() as u32 - 1)
    }

    #[must_use]
    pub fn generic(&self, id: GenericId) -> &GenericFunctionDef {
        &self.generics[id.index()]
    }

    pub fn generic_mut(&mut self, id: GenericId) -> &mut GenericFunctionDef {
        &mut self.generics[id.index()]
    }

    pub fn add_data(&mut self, data: DataDef) -> DataId {
        self.datas.push(data);
        DataId(self.datas.len() as u32 - 1)
    }

    #[must_use]
    pub fn data(&self, id: DataId) -> &DataDef {
        &self.datas[id.index()]
    }

    pub fn data_mut(&mut self, id: DataId) -> &mut DataDef {
        &mut self.datas[id.index()]
    }
}
