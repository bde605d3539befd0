//! The analyzer: state, entry points, and shared helpers.
//!
//! Analysis is a single synchronous walk over the AST. Diagnostics are
//! collected into a buffer so one run can surface many problems; the walk
//! only aborts early for constructs that are not implemented at all
//! (imports). Definitions that accumulated errors are unwound from the
//! symbol table so later code does not see a broken entity.

mod expressions;
mod queries;
mod statements;
mod templates;

use crate::builtins;
use crate::symbol_table::SymbolTable;
use vela_core::{Error, Result};
use vela_hir::{
    DataId, DataType, Declaration, Definitions, Expr, Module, Resolved, Stmt, argtypes,
    print_module, resolved_type, same_type, type_scope, type_string,
};
use vela_parser::ast;

/// Semantic analysis: resolves and types an AST module into HIR.
///
/// A fresh analyzer is used per compilation; a REPL keeps one alive so
/// definitions, history, and interactive override semantics accumulate
/// across inputs.
pub struct Analyzer {
    pub(crate) defs: Definitions,
    pub(crate) symbols: SymbolTable,
    /// One frame of collected return types per active function definition.
    pub(crate) rettype_stack: Vec<Vec<Option<DataType>>>,
    errors: Vec<String>,
    history: Vec<Stmt>,
    pub(crate) interactive: bool,
    anon_counter: usize,
}

impl Analyzer {
    /// Creates an analyzer with the built-ins installed.
    #[must_use]
    pub fn new() -> Self {
        let mut symbols = SymbolTable::new();
        builtins::install(&mut symbols);
        Self {
            defs: Definitions::new(),
            symbols,
            rettype_stack: Vec::new(),
            errors: Vec::new(),
            history: Vec::new(),
            interactive: false,
            anon_counter: 0,
        }
    }

    /// Interactive mode lets a new definition replace an overridable
    /// symbol instead of failing (REPL redefinition).
    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// Analyzes one module, accumulating onto prior state.
    ///
    /// # Errors
    /// Returns `Error::Semantic` carrying every collected diagnostic, or
    /// `Error::Unsupported` for constructs the analyzer aborts on.
    pub fn analyze_module(&mut self, module: &ast::Module) -> Result<Module> {
        self.errors.clear();
        let mut body = Vec::new();
        for stmt in &module.body {
            body.push(self.stmt(stmt)?);
        }
        self.history.extend(body.iter().cloned());
        let module = Module {
            body,
            docstring: module.docstring.clone(),
        };
        if self.errors.is_empty() {
            Ok(module)
        } else {
            Err(Error::Semantic(self.errors.join("\n")))
        }
    }

    #[must_use]
    pub fn definitions(&self) -> &Definitions {
        &self.defs
    }

    #[must_use]
    pub fn into_definitions(self) -> Definitions {
        self.defs
    }

    /// All HIR statements produced across calls (REPL accumulation).
    #[must_use]
    pub fn history(&self) -> &[Stmt] {
        &self.history
    }

    /// Renders a module against this analyzer's definitions.
    #[must_use]
    pub fn render(&self, module: &Module) -> String {
        print_module(&self.defs, module)
    }

    /* diagnostics */

    pub(crate) fn error(&mut self, message: impl std::fmt::Display) {
        self.errors.push(format!("Error: {message}"));
    }

    /// Marks a point in the diagnostic buffer; a later comparison tells a
    /// definition whether it accumulated errors and must unwind.
    pub(crate) fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub(crate) fn nyi(&self, rule: &str) -> Error {
        Error::Unsupported(rule.to_string())
    }

    /* symbol resolution */

    /// Resolves a name: the preferred scope first (flagging the hit so the
    /// caller can wrap it as an implied member), then the lexical chain.
    pub(crate) fn find_symbol(&self, name: &str) -> (Vec<Resolved>, bool) {
        if let Some(preferred) = &self.symbols.preferred {
            let scope = type_scope(&self.defs, preferred.ty.as_ref());
            let initial = self.symbols.find_in(name, scope);
            if !initial.is_empty() {
                return (initial, true);
            }
        }
        (self.symbols.find(name), false)
    }

    /// Stores a resolution under a name in the current scope, honoring the
    /// overload rules; returns false when the name cannot take it.
    pub(crate) fn store_symbol(&mut self, name: &str, res: Resolved) -> bool {
        if !self.symbols.contains(name) {
            self.symbols.insert(name, res);
            return true;
        }
        let interactive = self.interactive;
        let defs = &self.defs;
        let entries = self.symbols.entries_mut(name).expect("name is present");
        for existing in entries.iter_mut() {
            if !overloadable(defs, existing, &res) {
                if interactive && overridable(existing) {
                    *existing = res;
                    return true;
                }
                return false;
            }
        }
        entries.push(res);
        true
    }

    /// Runs a sub-visit with the preferred scope set to the query operand,
    /// clearing it again on every path.
    pub(crate) fn with_preferred<T>(
        &mut self,
        table: Expr,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        self.symbols.preferred = Some(table);
        let result = f(self);
        self.symbols.preferred = None;
        result
    }

    /* types */

    pub(crate) fn get_type(&self, res: Option<&Resolved>) -> Option<DataType> {
        resolved_type(&self.defs, res)
    }

    pub(crate) fn type_name(&self, ty: Option<&DataType>) -> String {
        type_string(&self.defs, ty)
    }

    /// Explains why the arguments do not fit a callable type; `None` means
    /// they match (an unknown callee type also matches, to avoid cascades).
    pub(crate) fn match_args(&self, args: &[Expr], func_type: Option<&DataType>) -> Option<String> {
        func_type?;
        let argtypes = argtypes(&self.defs, func_type);
        if args.len() != argtypes.len() {
            return Some(format!(
                "wrong number of arguments; expected {} but got {}",
                argtypes.len(),
                args.len()
            ));
        }
        for (i, (arg, expected)) in args.iter().zip(&argtypes).enumerate() {
            if !same_type(&self.defs, arg.ty.as_ref(), expected.as_ref()) {
                return Some(format!(
                    "argument type at position {i} does not match: {} vs {}",
                    self.type_name(arg.ty.as_ref()),
                    self.type_name(expected.as_ref())
                ));
            }
        }
        None
    }

    /* Dataframe synthesis */

    /// A fresh name for a synthesized record type.
    pub(crate) fn anon_name(&mut self) -> String {
        let name = format!("Anon__{}", self.anon_counter);
        self.anon_counter += 1;
        name
    }

    /// Builds a record definition from a rendered field list by parsing a
    /// `data` fragment and analyzing it under the given name.
    pub(crate) fn create_datatype(&mut self, type_name: &str, type_def: &str) -> Result<Stmt> {
        let source = format!("data Anon: {type_def} end");
        let parsed = vela_parser::parse(&source, false, false)?;
        let Some(ast::Stmt::DataDef { body, .. }) = parsed.body.first() else {
            return Err(Error::Semantic(format!(
                "Error: malformed field list '{type_def}'"
            )));
        };
        let body = body.clone();
        self.data_def_stmt(type_name, &body)
    }

    /// Finds the scalar record behind a `!`-prefixed Dataframe name.
    fn underlying_udt(&self, name: &str) -> Option<DataId> {
        let (resolveds, _) = self.find_symbol(&name[1..]);
        match resolveds.first() {
            Some(Resolved::Data(id)) => Some(*id),
            _ => None,
        }
    }

    /// Checks that a synthesized Dataframe still mirrors its scalar record
    /// field-for-field with each type wrapped in an array.
    fn dataframe_valid(&self, underlying: DataId, res: &Resolved) -> bool {
        let Resolved::Data(df) = res else {
            return false;
        };
        let scalar = self.defs.data(underlying);
        let frame = self.defs.data(*df);
        scalar.body.len() == frame.body.len()
            && scalar.body.iter().zip(&frame.body).all(|(s, f)| {
                let s = self.defs.decl(*s);
                let f = self.defs.decl(*f);
                let wrapped = s.ty.clone().map(|t| DataType::Array(Box::new(t)));
                s.name == f.name && same_type(&self.defs, wrapped.as_ref(), f.ty.as_ref())
            })
    }

    /// Returns the Dataframe type for a `!X` name, synthesizing (or
    /// re-synthesizing, when the underlying record changed) its record
    /// definition on first use.
    pub(crate) fn make_dataframe(&mut self, name: &str) -> Option<DataType> {
        let underlying = self.underlying_udt(name)?;

        // reuse an existing, still-valid synthesis
        let (resolveds, _) = self.find_symbol(name);
        let mut existing = resolveds
            .first()
            .filter(|res| self.dataframe_valid(underlying, res))
            .cloned();

        if existing.is_none() {
            let mut body = Vec::new();
            let scope = self.symbols.push_scope();
            for field_id in self.defs.data(underlying).body.clone() {
                let field = self.defs.decl(field_id).clone();
                let decl = Declaration {
                    name: field.name.clone(),
                    explicit_type: None,
                    value: field.value,
                    ty: field.ty.map(|t| DataType::Array(Box::new(t))),
                    offset: field.offset,
                };
                let id = self.defs.add_decl(decl);
                self.store_symbol(&field.name, Resolved::Decl(id));
                body.push(id);
            }
            self.symbols.pop_scope();
            let data_id = self.defs.add_data(vela_hir::DataDef {
                name: name.to_string(),
                body,
                scope,
            });
            let res = Resolved::Data(data_id);
            self.store_symbol(name, res.clone());
            existing = Some(res);
        }

        match existing {
            Some(Resolved::Data(id)) => Some(DataType::Udt {
                name: name.to_string(),
                def: id,
            }),
            _ => None,
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Types may be overloaded by functions; functions by functions with a
/// distinct signature. Everything else collides.
fn overloadable(defs: &Definitions, first: &Resolved, second: &Resolved) -> bool {
    match first {
        Resolved::VmType(_) | Resolved::Data(_) => {
            matches!(second, Resolved::VmOp { .. } | Resolved::Func(_))
        }
        Resolved::VmOp { .. } | Resolved::Func(_) => {
            if matches!(second, Resolved::VmOp { .. } | Resolved::Func(_)) {
                !same_type(
                    defs,
                    resolved_type(defs, Some(first)).as_ref(),
                    resolved_type(defs, Some(second)).as_ref(),
                )
            } else {
                false
            }
        }
        _ => false,
    }
}

/// Built-in types and operators are sacrosanct; anything else may be
/// replaced in interactive mode.
fn overridable(res: &Resolved) -> bool {
    !matches!(res, Resolved::VmType(_) | Resolved::VmOp { .. })
}

/// Semantic analysis: converts an AST module into typed HIR.
///
/// # Errors
/// Returns the accumulated diagnostics as a single `Error::Semantic`, or
/// `Error::Unsupported` for import forms.
pub fn analyze(
    module: &ast::Module,
    interactive: bool,
    dump_hir: bool,
) -> Result<(Module, Definitions)> {
    let mut analyzer = Analyzer::new();
    analyzer.set_interactive(interactive);
    let module = analyzer.analyze_module(module)?;
    if dump_hir {
        println!("{}", print_module(analyzer.definitions(), &module));
    }
    Ok((module, analyzer.into_definitions()))
}
