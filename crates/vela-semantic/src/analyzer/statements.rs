//! Statement, declaration, and definition analysis.

use crate::analyzer::Analyzer;
use vela_core::Result;
use vela_hir::{
    DataDef, DataType, DeclId, Declaration, ExprKind, FunctionDef, GenericFunctionDef, Resolved,
    Stmt, is_boolean, is_kind, is_void, same_type, underlying_type,
};
use vela_parser::ast;

/// Where a declaration appears. Function arguments may omit both the type
/// and the initializer; that is what makes their function generic, so the
/// "unable to determine type" diagnostic applies only to value positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DeclContext {
    Value,
    Argument,
}

impl Analyzer {
    pub(crate) fn stmt(&mut self, node: &ast::Stmt) -> Result<Stmt> {
        match node {
            ast::Stmt::Expr(e) => Ok(Stmt::Expr(self.expr(e)?)),

            ast::Stmt::Decl { kind, decls } => {
                let mut ids = Vec::new();
                for decl in decls {
                    ids.push(self.declaration(decl, DeclContext::Value)?);
                }
                Ok(Stmt::Decl {
                    kind: *kind,
                    decls: ids,
                })
            }

            ast::Stmt::Assign { target, value } => self.assign(target, value),

            ast::Stmt::Del(targets) => self.del(targets),

            ast::Stmt::If { test, body, orelse } => {
                let test = self.expr(test)?;
                if !is_boolean(test.ty.as_ref()) {
                    let found = self.type_name(test.ty.as_ref());
                    self.error(format!("conditional must be a boolean, not {found}"));
                }
                self.symbols.push_scope();
                let body = self.visit_body(body);
                self.symbols.pop_scope();
                self.symbols.push_scope();
                let orelse = self.visit_body(orelse);
                self.symbols.pop_scope();
                Ok(Stmt::If {
                    test,
                    body: body?,
                    orelse: orelse?,
                })
            }

            ast::Stmt::While { test, body } => {
                let test = self.expr(test)?;
                if !is_boolean(test.ty.as_ref()) {
                    let found = self.type_name(test.ty.as_ref());
                    self.error(format!("conditional must be a boolean, not {found}"));
                }
                self.symbols.push_scope();
                let body = self.visit_body(body);
                self.symbols.pop_scope();
                Ok(Stmt::While { test, body: body? })
            }

            ast::Stmt::Return(value) => self.return_stmt(value.as_ref()),

            ast::Stmt::DataDef { name, body } => self.data_def_stmt(name, body),

            ast::Stmt::FunctionDef(def) => self.function_def(def),

            ast::Stmt::Import { .. } => Err(self.nyi("Import")),
            ast::Stmt::ImportFrom { .. } => Err(self.nyi("ImportFrom")),
        }
    }

    pub(crate) fn visit_body(&mut self, stmts: &[ast::Stmt]) -> Result<Vec<Stmt>> {
        let mut body = Vec::new();
        for stmt in stmts {
            body.push(self.stmt(stmt)?);
        }
        Ok(body)
    }

    fn assign(&mut self, target: &ast::Expr, value: &ast::Expr) -> Result<Stmt> {
        let target = self.expr(target)?;
        let value = self.expr(value)?;
        if target.is_temporary() {
            self.error("target of assignment cannot be temporary");
        }
        for side in [&target, &value] {
            if side.is_overloaded() {
                let name = &side.name;
                self.error(format!(
                    "overloaded name {name} requires a call to disambiguate"
                ));
            }
        }
        if !same_type(&self.defs, target.ty.as_ref(), value.ty.as_ref()) {
            let left = self.type_name(target.ty.as_ref());
            let right = self.type_name(value.ty.as_ref());
            self.error(format!("mismatched types in assignment: {left} vs {right}"));
        }
        if is_void(value.ty.as_ref()) {
            self.error("type 'void' is not assignable");
        }
        Ok(Stmt::Assign { target, value })
    }

    fn del(&mut self, targets: &[ast::Expr]) -> Result<Stmt> {
        let mut exprs = Vec::new();
        for target in targets {
            exprs.push(self.expr(target)?);
        }
        for target in &exprs {
            match &target.kind {
                ExprKind::Id {
                    name,
                    res: Some(Resolved::Decl(_)),
                } => {
                    let name = name.clone();
                    if !self.symbols.remove(&name) {
                        self.error(format!("cannot delete {name}: not declared in this scope"));
                    }
                }
                // an unresolved name was already reported
                ExprKind::Id { res: None, .. } => {}
                ExprKind::Id { name, .. } | ExprKind::OverloadedId { name, .. } => {
                    let name = name.clone();
                    self.error(format!("cannot delete {name}"));
                }
                _ => self.error("cannot delete an expression"),
            }
        }
        Ok(Stmt::Del(exprs))
    }

    fn return_stmt(&mut self, value: Option<&ast::Expr>) -> Result<Stmt> {
        let value = match value {
            Some(e) => Some(self.expr(e)?),
            None => None,
        };
        if let Some(v) = &value {
            if v.is_overloaded() {
                let name = v.name.clone();
                self.error(format!(
                    "overloaded name {name} requires a call to disambiguate"
                ));
            }
        }
        if self.rettype_stack.is_empty() {
            self.error("return statement is not in function body");
        } else {
            let ty = match &value {
                Some(v) => v.ty.clone(),
                None => Some(DataType::Void),
            };
            self.rettype_stack
                .last_mut()
                .expect("stack is non-empty")
                .push(ty);
        }
        Ok(Stmt::Return(value))
    }

    /// Analyzes one declaration and stores it in the current scope unless
    /// it accumulated errors.
    pub(crate) fn declaration(
        &mut self,
        node: &ast::Declaration,
        ctx: DeclContext,
    ) -> Result<DeclId> {
        let starting = self.error_count();
        if node.name.starts_with(|c: char| c.is_ascii_uppercase()) {
            self.error(format!(
                "value name {} must begin with lower-case letter",
                node.name
            ));
        }

        let explicit_type = match &node.explicit_type {
            Some(e) => Some(self.expr(e)?),
            None => None,
        };
        let mut ty = None;
        if let Some(annotation) = &explicit_type {
            if is_kind(annotation.ty.as_ref()) {
                ty = underlying_type(annotation.ty.as_ref());
            } else {
                self.error(format!("declaration for {} has invalid type", node.name));
            }
        }

        let value = match &node.value {
            Some(e) => Some(self.expr(e)?),
            None => None,
        };
        if let Some(v) = &value {
            if v.is_overloaded() {
                let name = v.name.clone();
                self.error(format!(
                    "overloaded name {name} requires a call to disambiguate"
                ));
            }
        }
        if ty.is_none() {
            if let Some(v) = &value {
                ty = v.ty.clone();
            }
        }
        if let Some(v) = &value {
            if !same_type(&self.defs, ty.as_ref(), v.ty.as_ref()) {
                let left = self.type_name(ty.as_ref());
                let right = self.type_name(v.ty.as_ref());
                self.error(format!(
                    "type of declaration does not match: {left} vs {right}"
                ));
            }
        }
        if ty.is_none() && ctx == DeclContext::Value {
            self.error("unable to determine type");
        }
        if is_void(ty.as_ref()) {
            self.error(format!("symbol {} cannot have a 'void' type", node.name));
        }

        let id = self.defs.add_decl(Declaration {
            name: node.name.clone(),
            explicit_type,
            value,
            ty,
            offset: 0,
        });
        if self.error_count() == starting && !self.store_symbol(&node.name, Resolved::Decl(id)) {
            self.error(format!("symbol {} was already defined", node.name));
        }
        Ok(id)
    }

    /// Analyzes a record definition. The tentative reference is stored
    /// before the body so self-referential types resolve, and removed
    /// again if the definition accumulated errors.
    pub(crate) fn data_def_stmt(&mut self, name: &str, body: &[ast::Declaration]) -> Result<Stmt> {
        let starting = self.error_count();
        if name.starts_with(|c: char| c.is_ascii_lowercase()) {
            self.error(format!("type name {name} must begin with upper-case letter"));
        }

        let data_id = self.defs.add_data(DataDef {
            name: name.to_string(),
            body: Vec::new(),
            scope: 0,
        });
        let res = Resolved::Data(data_id);
        if !self.store_symbol(name, res.clone()) {
            self.error(format!("symbol {name} was already defined"));
        }

        let scope = self.symbols.push_scope();
        let mut ids = Vec::new();
        let mut fields = Ok(());
        for (offset, field) in body.iter().enumerate() {
            match self.declaration(field, DeclContext::Value) {
                Ok(id) => {
                    self.defs.decl_mut(id).offset = offset;
                    ids.push(id);
                }
                Err(e) => {
                    fields = Err(e);
                    break;
                }
            }
        }
        self.symbols.pop_scope();
        fields?;

        if self.error_count() > starting {
            self.symbols.remove_ref(name, &res);
        }
        let data = self.defs.data_mut(data_id);
        data.body = ids;
        data.scope = scope;
        Ok(Stmt::Data(data_id))
    }

    fn function_def(&mut self, node: &ast::FunctionDef) -> Result<Stmt> {
        let starting = self.error_count();

        let explicit_rettype = match &node.explicit_rettype {
            Some(e) => Some(self.expr(e)?),
            None => None,
        };
        let mut rettype = None;
        if let Some(annotation) = &explicit_rettype {
            if is_kind(annotation.ty.as_ref()) {
                rettype = underlying_type(annotation.ty.as_ref());
            } else {
                self.error(format!("return type for {} has invalid type", node.name));
            }
        }

        // arguments live in a fresh inner scope
        let outer = self.symbols.current_scope();
        let inner = self.symbols.push_scope();
        let mut args = Vec::new();
        let mut arg_error = Ok(());
        for arg in &node.args {
            match self.declaration(arg, DeclContext::Argument) {
                Ok(id) => args.push(id),
                Err(e) => {
                    arg_error = Err(e);
                    break;
                }
            }
        }

        // shell first so the body can recurse into its own name
        let func_id = self.defs.add_func(FunctionDef {
            name: node.name.clone(),
            args,
            body: Vec::new(),
            explicit_rettype,
            docstring: node.docstring.clone(),
            rettype: rettype.clone(),
        });

        // a missing argument type makes the definition generic
        let generic_id = node
            .args
            .iter()
            .any(|a| a.explicit_type.is_none())
            .then(|| {
                self.defs.add_generic(GenericFunctionDef {
                    original: func_id,
                    source: node.clone(),
                    scope: outer,
                    instantiated: Vec::new(),
                })
            });
        let res = match generic_id {
            Some(id) => Resolved::Generic(id),
            None => Resolved::Func(func_id),
        };

        // the name goes into the outer scope; the body is analyzed in the
        // inner one
        self.symbols.set_current(outer);
        if !self.store_symbol(&node.name, res.clone()) {
            self.error(format!("symbol {} was already defined", node.name));
        }
        self.symbols.set_current(inner);

        self.rettype_stack.push(Vec::new());
        let body = match arg_error {
            Ok(()) => self.visit_body(&node.body),
            Err(e) => Err(e),
        };
        let rettypes = self.rettype_stack.pop().expect("frame pushed above");
        self.symbols.pop_scope();
        self.defs.func_mut(func_id).body = body?;

        let annotated = rettype;
        let unified = self.unify_rettypes(
            &node.name,
            annotated.clone(),
            &rettypes,
            node.explicit_rettype.is_some(),
            node.body.is_empty(),
            generic_id.is_some(),
        );

        // a definition named like a type is a cast and must return it
        if node.name.starts_with(|c: char| c.is_ascii_uppercase()) {
            self.check_cast(&node.name, unified.as_ref());
        }

        if self.error_count() > starting {
            self.symbols.remove_ref(&node.name, &res);
        }
        // a generic keeps only its annotated return type; the wildcard-typed
        // body must not pin one signature's inference onto the others
        self.defs.func_mut(func_id).rettype = if generic_id.is_some() {
            annotated
        } else {
            unified
        };
        Ok(match generic_id {
            Some(id) => Stmt::Generic(id),
            None => Stmt::Func(func_id),
        })
    }

    /// Unifies the return types collected from a function body against the
    /// annotated return type, reporting conflicts.
    ///
    /// A body without returns is an error unless the signature annotates a
    /// return type over an empty body (instantiation shells). A generic
    /// original may keep an unknown return type; instantiations may not.
    pub(crate) fn unify_rettypes(
        &mut self,
        name: &str,
        annotated: Option<DataType>,
        collected: &[Option<DataType>],
        explicit_given: bool,
        body_empty: bool,
        allow_unknown: bool,
    ) -> Option<DataType> {
        let mut body_rettype = None;
        if collected.is_empty() {
            if !(explicit_given && body_empty) {
                self.error(format!("function {name} has no return statements"));
            }
        } else {
            body_rettype = collected[0].clone();
            for ret in &collected[1..] {
                if !same_type(&self.defs, body_rettype.as_ref(), ret.as_ref()) {
                    let first = self.type_name(body_rettype.as_ref());
                    let other = self.type_name(ret.as_ref());
                    self.error(format!(
                        "mismatched return types in function {name}: {first} vs {other}"
                    ));
                }
            }
        }

        let rettype = annotated.or_else(|| body_rettype.clone());
        if rettype.is_none() && !allow_unknown && !(explicit_given && body_empty) {
            self.error(format!(
                "unable to determine return type for function {name}"
            ));
        }
        if !same_type(&self.defs, rettype.as_ref(), body_rettype.as_ref()) {
            let expected = self.type_name(rettype.as_ref());
            let found = self.type_name(body_rettype.as_ref());
            self.error(format!("mismatched return types: {expected} vs {found}"));
        }
        rettype
    }

    /// A function named after a type converts into that type; its return
    /// type must be the type itself or its array form.
    fn check_cast(&mut self, name: &str, rettype: Option<&DataType>) {
        let (resolveds, _) = self.find_symbol(name);
        let Some(first) = resolveds.first() else {
            return;
        };
        let cast_type = self.get_type(Some(first));
        if is_kind(cast_type.as_ref()) {
            let expected = underlying_type(cast_type.as_ref());
            let wrapped = expected.clone().map(|t| DataType::Array(Box::new(t)));
            if !same_type(&self.defs, rettype, expected.as_ref())
                && !same_type(&self.defs, rettype, wrapped.as_ref())
            {
                self.error(format!(
                    "cast definition for {name} must return its own type"
                ));
            }
        } else {
            self.error(format!("cast definition must be for a type, not {name}"));
        }
    }
}
