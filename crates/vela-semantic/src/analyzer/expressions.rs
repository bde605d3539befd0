//! Expression analysis.
//!
//! Operators and suffixed literals are syntactic sugar for function calls:
//! they are desugared, analyzed through the call visitor, and repacked so
//! the surface form is preserved in HIR.

use crate::analyzer::Analyzer;
use vela_core::Result;
use vela_hir::{
    Alias, DataType, Declaration, Expr, ExprKind, FuncId, FunctionDef, GenericId, Resolved, Slice,
    function_type, is_array, is_callable, is_indexable, is_kind, rettype, same_type, type_scope,
    underlying_type,
};
use vela_parser::ast;
use vela_parser::ast::{BinOpKind, UnaryOpKind};
use vela_vm::VmType;

/// Overload candidates listed in a no-match diagnostic before truncation.
const MAX_REPORTED_CANDIDATES: usize = 3;

impl Analyzer {
    pub(crate) fn expr(&mut self, node: &ast::Expr) -> Result<Expr> {
        match node {
            ast::Expr::Integer(n) => Ok(literal(ExprKind::Integer(*n), VmType::I64s)),
            ast::Expr::Float(x) => Ok(literal(ExprKind::Float(*x), VmType::F64s)),
            ast::Expr::Bool(b) => Ok(literal(ExprKind::Bool(*b), VmType::B8s)),
            ast::Expr::Str(s) => Ok(literal(ExprKind::Str(s.clone()), VmType::Ss)),
            ast::Expr::Char(c) => Ok(literal(ExprKind::Char(*c), VmType::C8s)),

            ast::Expr::SuffixedLiteral { literal, suffix } => {
                self.suffixed_literal(literal, suffix)
            }
            ast::Expr::Id(name) => self.identifier(name),
            ast::Expr::List(values) => self.list(values),

            ast::Expr::Paren(inner) => {
                let inner = self.expr(inner)?;
                let ty = inner.ty.clone();
                let name = inner.name.clone();
                Ok(Expr::new(ExprKind::Paren(Box::new(inner)), ty, name))
            }

            ast::Expr::Unary { op, operand } => self.unary(*op, operand),
            ast::Expr::Binary { left, op, right } => self.binary(left, *op, right),
            ast::Expr::Call { func, args } => self.call(func, args),
            ast::Expr::TemplateInst { func, args } => self.template_inst(func, args),
            ast::Expr::Member { value, member } => self.member(value, member),
            ast::Expr::Subscript { value, slice } => self.subscript(value, slice),

            ast::Expr::Query {
                table,
                cols,
                by,
                filter,
            } => self.query(table, cols, by, filter.as_deref()),
            ast::Expr::Sort { table, by } => self.sort(table, by),
            ast::Expr::Join {
                left,
                right,
                on,
                asof,
                strict,
                direction,
                within,
            } => self.join(
                left,
                right,
                on,
                asof.as_deref(),
                *strict,
                *direction,
                within.as_deref(),
            ),
        }
    }

    /// An optionally named column expression.
    pub(crate) fn alias(&mut self, node: &ast::Alias) -> Result<Alias> {
        if node.name.starts_with(|c: char| c.is_ascii_uppercase()) {
            self.error(format!(
                "value name {} must begin with lower-case letter",
                node.name
            ));
        }
        let value = self.expr(&node.value)?;
        Ok(Alias {
            value,
            name: node.name.clone(),
        })
    }

    fn identifier(&mut self, name: &str) -> Result<Expr> {
        // a Dataframe view is synthesized before its first lookup
        if name.starts_with('!') {
            let _ = self.make_dataframe(name);
        }

        let (resolveds, in_preferred) = self.find_symbol(name);
        if resolveds.is_empty() {
            self.error(format!("symbol {name} was not found"));
        }
        if resolveds.len() <= 1 {
            let res = resolveds.into_iter().next();
            let ty = self.get_type(res.as_ref());
            if in_preferred {
                let table = self
                    .symbols
                    .preferred
                    .clone()
                    .expect("preferred scope is set");
                return Ok(Expr::new(
                    ExprKind::ImpliedMember {
                        name: name.to_string(),
                        res,
                        table: Box::new(table),
                    },
                    ty,
                    name,
                ));
            }
            return Ok(Expr::new(
                ExprKind::Id {
                    name: name.to_string(),
                    res,
                },
                ty,
                name,
            ));
        }

        // carry the whole overload set; a call site picks one
        let ty = self.get_type(resolveds.first());
        Ok(Expr::new(
            ExprKind::OverloadedId {
                name: name.to_string(),
                candidates: resolveds,
            },
            ty,
            name,
        ))
    }

    fn unary(&mut self, op: UnaryOpKind, operand: &ast::Expr) -> Result<Expr> {
        let desugared = ast::Expr::Call {
            func: Box::new(ast::Expr::Id(op.symbol().to_string())),
            args: vec![operand.clone()],
        };
        let call = self.expr(&desugared)?;
        let (res, mut args, ty, name) = unpack_call(call);
        let operand = args.remove(0);
        Ok(Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
                res,
            },
            ty,
            name,
        ))
    }

    fn binary(&mut self, left: &ast::Expr, op: BinOpKind, right: &ast::Expr) -> Result<Expr> {
        let desugared = ast::Expr::Call {
            func: Box::new(ast::Expr::Id(op.symbol().to_string())),
            args: vec![left.clone(), right.clone()],
        };
        let call = self.expr(&desugared)?;
        let (res, mut args, ty, name) = unpack_call(call);
        let left = args.remove(0);
        let right = args.remove(0);
        Ok(Expr::new(
            ExprKind::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
                res,
            },
            ty,
            name,
        ))
    }

    fn suffixed_literal(&mut self, lit: &ast::Expr, suffix: &str) -> Result<Expr> {
        let desugared = ast::Expr::Call {
            func: Box::new(ast::Expr::Id(format!("suffix{suffix}"))),
            args: vec![lit.clone()],
        };
        let call = self.expr(&desugared)?;
        let (res, mut args, ty, name) = unpack_call(call);
        let lit = args.remove(0);
        Ok(Expr::new(
            ExprKind::SuffixedLiteral {
                literal: Box::new(lit),
                suffix: suffix.to_string(),
                res,
            },
            ty,
            name,
        ))
    }

    fn call(&mut self, func_ast: &ast::Expr, args_ast: &[ast::Expr]) -> Result<Expr> {
        let mut func = self.expr(func_ast)?;
        if !is_callable(func.ty.as_ref()) {
            let found = self.type_name(func.ty.as_ref());
            self.error(format!("type {found} is not callable"));
        }
        let mut args = Vec::new();
        for arg in args_ast {
            args.push(self.expr(arg)?);
        }

        if let Some(generic_id) = generic_of(&func) {
            if let Some(resolved) = self.resolve_generic_call(generic_id, &args)? {
                func = resolved;
            }
        } else if func.is_overloaded() {
            func = self.resolve_overloaded_call(func, &args);
        } else if let Some(reason) = self.match_args(&args, func.ty.as_ref()) {
            self.error(reason);
        }

        let ty = rettype(func.ty.as_ref());
        let name = args
            .first()
            .map_or_else(|| func.name.clone(), |a| a.name.clone());
        Ok(Expr::new(
            ExprKind::Call {
                func: Box::new(func),
                args,
            },
            ty,
            name,
        ))
    }

    /// Resolves a call to a generic function: reuse an instantiation with
    /// a matching signature or monomorphize a new one. Returns the direct
    /// reference the callee is rewritten to.
    fn resolve_generic_call(
        &mut self,
        generic_id: GenericId,
        args: &[Expr],
    ) -> Result<Option<Expr>> {
        for inst in self.defs.generic(generic_id).instantiated.clone() {
            let func_type = function_type(&self.defs, self.defs.func(inst));
            if self.match_args(args, Some(&func_type)).is_none() {
                return Ok(Some(direct_ref(self.defs.func(inst), inst, func_type)));
            }
        }

        let original = self.defs.generic(generic_id).original;
        let original_type = function_type(&self.defs, self.defs.func(original));
        if let Some(reason) = self.match_args(args, Some(&original_type)) {
            self.error(reason);
            return Ok(None);
        }

        // fill unknown parameter positions from the actuals
        let DataType::Func { params, .. } = &original_type else {
            return Ok(None);
        };
        let filled: Vec<Option<DataType>> = params
            .iter()
            .zip(args)
            .map(|(param, arg)| param.clone().or_else(|| arg.ty.clone()))
            .collect();

        let inst = self.instantiate_generic(generic_id, &filled)?;
        let func_type = function_type(&self.defs, self.defs.func(inst));
        Ok(Some(direct_ref(self.defs.func(inst), inst, func_type)))
    }

    /// Monomorphizes a generic for one argument-type vector: the retained
    /// source definition is re-analyzed in the generic's defining scope
    /// with the argument types bound, yielding a fully typed body.
    fn instantiate_generic(
        &mut self,
        generic_id: GenericId,
        argtypes: &[Option<DataType>],
    ) -> Result<FuncId> {
        let generic = self.defs.generic(generic_id).clone();

        // the body is analyzed where the generic was defined, away from
        // any relational query context
        let saved_scope = self.symbols.current_scope();
        let saved_preferred = self.symbols.preferred.take();
        self.symbols.set_current(generic.scope);

        let result = self.monomorphize(generic_id, &generic.source, argtypes);

        self.symbols.set_current(saved_scope);
        self.symbols.preferred = saved_preferred;
        result
    }

    fn monomorphize(
        &mut self,
        generic_id: GenericId,
        source: &ast::FunctionDef,
        argtypes: &[Option<DataType>],
    ) -> Result<FuncId> {
        self.symbols.push_scope();
        let mut args = Vec::new();
        for (arg, ty) in source.args.iter().zip(argtypes) {
            let value = match &arg.value {
                Some(v) => Some(self.expr(v)?),
                None => None,
            };
            let id = self.defs.add_decl(Declaration {
                name: arg.name.clone(),
                explicit_type: None,
                value,
                ty: ty.clone(),
                offset: 0,
            });
            self.store_symbol(&arg.name, Resolved::Decl(id));
            args.push(id);
        }

        let original_ret = self.defs.func(self.defs.generic(generic_id).original).rettype.clone();
        let func_id = self.defs.add_func(FunctionDef {
            name: source.name.clone(),
            args,
            body: Vec::new(),
            explicit_rettype: None,
            docstring: source.docstring.clone(),
            rettype: original_ret.clone(),
        });
        // register the shell before the body so recursion finds it
        self.defs.generic_mut(generic_id).instantiated.push(func_id);

        self.rettype_stack.push(Vec::new());
        let body = self.visit_body(&source.body);
        let rettypes = self.rettype_stack.pop().expect("frame pushed above");
        self.symbols.pop_scope();
        self.defs.func_mut(func_id).body = body?;

        let rettype = self.unify_rettypes(
            &source.name,
            original_ret,
            &rettypes,
            source.explicit_rettype.is_some(),
            source.body.is_empty(),
            false,
        );
        self.defs.func_mut(func_id).rettype = rettype;
        Ok(func_id)
    }

    /// Picks the first matching candidate of an overload set and rewrites
    /// the callee to it; on no match, reports per-candidate reasons.
    fn resolve_overloaded_call(&mut self, func: Expr, args: &[Expr]) -> Expr {
        let ExprKind::OverloadedId { name, candidates } = &func.kind else {
            return func;
        };
        let mut mismatches = String::new();
        let mut counted = 0usize;
        for res in candidates {
            let func_type = self.get_type(Some(res));
            match self.match_args(args, func_type.as_ref()) {
                None => {
                    return Expr::new(
                        ExprKind::Id {
                            name: name.clone(),
                            res: Some(res.clone()),
                        },
                        func_type,
                        name.clone(),
                    );
                }
                Some(reason) => {
                    counted += 1;
                    if counted <= MAX_REPORTED_CANDIDATES {
                        let candidate = self.type_name(func_type.as_ref());
                        mismatches.push_str(&format!("\n  candidate: {candidate}\n    {reason}"));
                    }
                }
            }
        }
        if counted > MAX_REPORTED_CANDIDATES {
            mismatches.push_str(&format!(
                "\n  ...\n  <{} others>",
                counted - MAX_REPORTED_CANDIDATES
            ));
        }
        let name = name.clone();
        self.error(format!(
            "unable to match overloaded function {name}{mismatches}"
        ));
        func
    }

    fn member(&mut self, value_ast: &ast::Expr, member: &str) -> Result<Expr> {
        let value = self.expr(value_ast)?;
        let scope = type_scope(&self.defs, value.ty.as_ref());
        // an unknown base already produced a diagnostic
        if scope == 0 && value.ty.is_some() {
            self.error("value does not have members");
        }
        let resolveds = self.symbols.find_in(member, scope);
        if scope != 0 && resolveds.is_empty() {
            self.error(format!("{member} is not a member"));
        }
        let res = (resolveds.len() == 1).then(|| resolveds[0].clone());
        let ty = self.get_type(res.as_ref());
        if res.is_some() && ty.is_none() {
            self.error("unable to resolve type");
        }
        Ok(Expr::new(
            ExprKind::Member {
                value: Box::new(value),
                member: member.to_string(),
                res,
            },
            ty,
            member,
        ))
    }

    fn subscript(&mut self, value_ast: &ast::Expr, slice_ast: &ast::Slice) -> Result<Expr> {
        let value = self.expr(value_ast)?;
        if !is_array(value.ty.as_ref()) {
            let found = self.type_name(value.ty.as_ref());
            self.error(format!("value must be an array; got type {found}"));
        }
        let slice = self.slice(slice_ast)?;
        // an index yields the element; a slice keeps the array type
        let ty = match &slice {
            Slice::Index(_) => underlying_type(value.ty.as_ref()),
            Slice::Range { .. } => value.ty.clone(),
        };
        let name = value.name.clone();
        Ok(Expr::new(
            ExprKind::Subscript {
                value: Box::new(value),
                slice: Box::new(slice),
            },
            ty,
            name,
        ))
    }

    fn slice(&mut self, node: &ast::Slice) -> Result<Slice> {
        match node {
            ast::Slice::Index(e) => {
                let e = self.expr(e)?;
                if !is_indexable(e.ty.as_ref()) {
                    let found = self.type_name(e.ty.as_ref());
                    self.error(format!("type {found} cannot be used as an index"));
                }
                Ok(Slice::Index(e))
            }
            ast::Slice::Range { lower, upper, step } => {
                let lower = self.bound(lower.as_deref(), "lower bound")?;
                let upper = self.bound(upper.as_deref(), "upper bound")?;
                let step = self.bound(step.as_deref(), "step")?;
                Ok(Slice::Range { lower, upper, step })
            }
        }
    }

    fn bound(&mut self, node: Option<&ast::Expr>, what: &str) -> Result<Option<Expr>> {
        let Some(node) = node else {
            return Ok(None);
        };
        let e = self.expr(node)?;
        if !is_indexable(e.ty.as_ref()) {
            let found = self.type_name(e.ty.as_ref());
            self.error(format!("{what} type {found} cannot be used as an index"));
        }
        Ok(Some(e))
    }

    fn list(&mut self, values_ast: &[ast::Expr]) -> Result<Expr> {
        let mut values = Vec::new();
        for value in values_ast {
            values.push(self.expr(value)?);
        }
        let expected = values.first().and_then(|v| v.ty.clone());
        for value in &values {
            if !same_type(&self.defs, value.ty.as_ref(), expected.as_ref()) {
                let found = self.type_name(value.ty.as_ref());
                let wanted = self.type_name(expected.as_ref());
                self.error(format!("mismatched types in list: {found} vs {wanted}"));
            }
        }
        let name = values.first().map_or_else(String::new, |v| v.name.clone());

        // a list of kinds is a type expression: the kind of an array
        let ty = if is_kind(expected.as_ref()) {
            if values.len() >= 2 {
                self.error("only one type allowed for lists");
            }
            underlying_type(expected.as_ref())
                .map(|inner| DataType::Kind(Box::new(DataType::Array(Box::new(inner)))))
        } else {
            expected.map(|t| DataType::Array(Box::new(t)))
        };
        Ok(Expr::new(ExprKind::List(values), ty, name))
    }
}

fn literal(kind: ExprKind, ty: VmType) -> Expr {
    Expr::new(kind, Some(DataType::Prim(ty)), "")
}

fn generic_of(func: &Expr) -> Option<GenericId> {
    match &func.kind {
        ExprKind::Id {
            res: Some(Resolved::Generic(id)),
            ..
        } => Some(*id),
        _ => None,
    }
}

/// Splits an analyzed call back into its parts for operator repacking.
fn unpack_call(call: Expr) -> (Option<Resolved>, Vec<Expr>, Option<DataType>, String) {
    let Expr { kind, ty, name } = call;
    let ExprKind::Call { func, args } = kind else {
        unreachable!("operator desugaring always produces a call");
    };
    let res = match func.kind {
        ExprKind::Id { res, .. } => res,
        _ => None,
    };
    (res, args, ty, name)
}

/// A direct `Id` expression pointing at a specific function definition.
fn direct_ref(def: &FunctionDef, id: FuncId, func_type: DataType) -> Expr {
    Expr::new(
        ExprKind::Id {
            name: def.name.clone(),
            res: Some(Resolved::Func(id)),
        },
        Some(func_type),
        def.name.clone(),
    )
}
