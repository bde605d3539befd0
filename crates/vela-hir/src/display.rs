//! Textual rendering of HIR.
//!
//! The rendering is deterministic and close to source syntax; the REPL
//! echoes it and the test suite compares analyses through it.

use crate::definitions::{DataId, DeclId, Definitions, FuncId, GenericId};
use crate::expression::{Alias, Expr, ExprKind, Slice};
use crate::statement::{Module, Stmt};
use crate::types::type_string;
use vela_parser::ast::{DeclKind, JoinDirection, UnaryOpKind};

/// Renders a module as text.
#[must_use]
pub fn print_module(defs: &Definitions, module: &Module) -> String {
    let mut printer = Printer {
        defs,
        out: String::new(),
        indent: 0,
    };
    if !module.docstring.is_empty() {
        printer.line(&format!("{:?}", module.docstring));
    }
    for stmt in &module.body {
        printer.stmt(stmt);
    }
    printer.out
}

struct Printer<'a> {
    defs: &'a Definitions,
    out: String,
    indent: usize,
}

impl Printer<'_> {
    fn line(&mut self, text: &str) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn block(&mut self, body: &[Stmt]) {
        self.indent += 1;
        for stmt in body {
            self.stmt(stmt);
        }
        self.indent -= 1;
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(e) => {
                let text = self.expr(e);
                self.line(&text);
            }
            Stmt::Decl { kind, decls } => {
                let keyword = match kind {
                    DeclKind::Let => "let",
                    DeclKind::Var => "var",
                };
                let decls: Vec<String> = decls.iter().map(|d| self.declaration(*d)).collect();
                self.line(&format!("{keyword} {}", decls.join(", ")));
            }
            Stmt::Assign { target, value } => {
                let text = format!("{} = {}", self.expr(target), self.expr(value));
                self.line(&text);
            }
            Stmt::Del(targets) => {
                let targets: Vec<String> = targets.iter().map(|t| self.expr(t)).collect();
                self.line(&format!("del {}", targets.join(", ")));
            }
            Stmt::If { test, body, orelse } => {
                let text = format!("if {}:", self.expr(test));
                self.line(&text);
                self.block(body);
                if !orelse.is_empty() {
                    self.line("else:");
                    self.block(orelse);
                }
                self.line("end");
            }
            Stmt::While { test, body } => {
                let text = format!("while {}:", self.expr(test));
                self.line(&text);
                self.block(body);
                self.line("end");
            }
            Stmt::Return(value) => match value {
                Some(e) => {
                    let text = format!("return {}", self.expr(e));
                    self.line(&text);
                }
                None => self.line("return"),
            },
            Stmt::Data(id) => self.data_def(*id),
            Stmt::Func(id) => self.function_def(*id),
            Stmt::Generic(id) => self.generic_def(*id),
        }
    }

    fn data_def(&mut self, id: DataId) {
        let data = self.defs.data(id);
        let fields: Vec<String> = data.body.iter().map(|d| self.declaration(*d)).collect();
        self.line(&format!("data {}: {} end", data.name, fields.join(", ")));
    }

    fn function_def(&mut self, id: FuncId) {
        let func = self.defs.func(id);
        let args: Vec<String> = func.args.iter().map(|d| self.declaration(*d)).collect();
        let ret = type_string(self.defs, func.rettype.as_ref());
        self.line(&format!(
            "def {}({}) -> {}:",
            func.name,
            args.join(", "),
            ret
        ));
        if !func.docstring.is_empty() {
            let doc = format!("{:?}", func.docstring);
            self.indent += 1;
            self.line(&doc);
            self.indent -= 1;
        }
        self.block(&func.body);
        self.line("end");
    }

    fn generic_def(&mut self, id: GenericId) {
        let generic = self.defs.generic(id);
        self.function_def(generic.original);
        for func in &generic.instantiated {
            self.function_def(*func);
        }
    }

    fn declaration(&self, id: DeclId) -> String {
        let decl = self.defs.decl(id);
        let mut text = format!("{}: {}", decl.name, type_string(self.defs, decl.ty.as_ref()));
        if let Some(value) = &decl.value {
            text.push_str(&format!(" = {}", self.expr(value)));
        }
        text
    }

    fn expr(&self, expr: &Expr) -> String {
        match &expr.kind {
            ExprKind::Integer(n) => n.to_string(),
            ExprKind::Float(x) => format!("{x:?}"),
            ExprKind::Bool(b) => b.to_string(),
            ExprKind::Str(s) => format!("{s:?}"),
            ExprKind::Char(c) => format!("{c:?}"),
            ExprKind::SuffixedLiteral {
                literal, suffix, ..
            } => format!("{}{}", self.expr(literal), suffix),
            ExprKind::Id { name, .. } => name.clone(),
            ExprKind::OverloadedId { name, .. } => name.clone(),
            ExprKind::ImpliedMember { name, .. } => name.clone(),
            ExprKind::Member { value, member, .. } => {
                format!("{}.{}", self.expr(value), member)
            }
            ExprKind::Subscript { value, slice } => {
                format!("{}[{}]", self.expr(value), self.slice(slice))
            }
            ExprKind::Call { func, args } => {
                let args: Vec<String> = args.iter().map(|a| self.expr(a)).collect();
                format!("{}({})", self.expr(func), args.join(", "))
            }
            ExprKind::Unary { op, operand, .. } => {
                if *op == UnaryOpKind::Not {
                    format!("not {}", self.expr(operand))
                } else {
                    format!("{}{}", op.symbol(), self.expr(operand))
                }
            }
            ExprKind::Binary {
                left, op, right, ..
            } => format!("({} {} {})", self.expr(left), op.symbol(), self.expr(right)),
            ExprKind::List(values) => {
                let values: Vec<String> = values.iter().map(|v| self.expr(v)).collect();
                format!("[{}]", values.join(", "))
            }
            ExprKind::Paren(inner) => format!("({})", self.expr(inner)),
            ExprKind::Query {
                table,
                cols,
                by,
                filter,
                ..
            } => {
                let mut text = format!("from {}", self.expr(table));
                if !cols.is_empty() {
                    text.push_str(&format!(" select {}", self.aliases(cols)));
                }
                if !by.is_empty() {
                    text.push_str(&format!(" by {}", self.aliases(by)));
                }
                if let Some(filter) = filter {
                    text.push_str(&format!(" where {}", self.expr(filter)));
                }
                text
            }
            ExprKind::Sort { table, by, .. } => {
                format!("sort {} by {}", self.expr(table), self.aliases(by))
            }
            ExprKind::Join {
                left,
                right,
                left_on,
                left_asof,
                strict,
                direction,
                within,
                ..
            } => {
                let mut text = format!("join {}, {}", self.expr(left), self.expr(right));
                if !left_on.is_empty() {
                    text.push_str(&format!(" on {}", self.aliases(left_on)));
                }
                if let Some(asof) = left_asof {
                    text.push_str(&format!(" asof {}", self.alias(asof)));
                    if *strict {
                        text.push_str(" strict");
                    }
                    match direction {
                        JoinDirection::Backward => {}
                        JoinDirection::Forward => text.push_str(" forward"),
                        JoinDirection::Nearest => text.push_str(" nearest"),
                    }
                    if let Some(within) = within {
                        text.push_str(&format!(" within {}", self.expr(within)));
                    }
                }
                text
            }
            ExprKind::TemplateInst { func, args, .. } => {
                let args: Vec<String> = args.iter().map(|a| self.expr(a)).collect();
                format!("{}$({})", self.expr(func), args.join(", "))
            }
        }
    }

    fn slice(&self, slice: &Slice) -> String {
        match slice {
            Slice::Index(e) => self.expr(e),
            Slice::Range { lower, upper, step } => {
                let part = |e: &Option<Expr>| e.as_ref().map_or(String::new(), |e| self.expr(e));
                let mut text = format!("{}:{}", part(lower), part(upper));
                if let Some(step) = step {
                    text.push_str(&format!(":{}", self.expr(step)));
                }
                text
            }
        }
    }

    fn alias(&self, alias: &Alias) -> String {
        if alias.name.is_empty() {
            self.expr(&alias.value)
        } else {
            format!("{} = {}", alias.name, self.expr(&alias.value))
        }
    }

    fn aliases(&self, aliases: &[Alias]) -> String {
        let parts: Vec<String> = aliases.iter().map(|a| self.alias(a)).collect();
        parts.join(", ")
    }
}
