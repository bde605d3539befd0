//! Compile-time template instantiation.
//!
//! `load("path.csv")` is the one supported template. Each argument must be
//! a constant string; it is compiled and interpreted through the machine
//! to obtain the file path, the file's schema is inferred, and a
//! `Provider$<file>` record type is synthesized. The template's type is
//! the Dataframe of that record.

use crate::analyzer::Analyzer;
use vela_core::Result;
use vela_hir::{Expr, ExprKind, Module, Stmt, is_string};
use vela_parser::ast;
use vela_vm::{infer_table_from_file, interpret};

impl Analyzer {
    pub(crate) fn template_inst(
        &mut self,
        func_ast: &ast::Expr,
        args_ast: &[ast::Expr],
    ) -> Result<Expr> {
        let ast::Expr::Id(name) = func_ast else {
            return Err(self.nyi("template instantiation on a non-identifier"));
        };
        if name != "load" {
            return Err(self.nyi(&format!("template instantiation of {name}")));
        }
        let func = Expr::new(
            ExprKind::Id {
                name: "load".to_string(),
                res: None,
            },
            None,
            "load",
        );
        let mut args = Vec::new();
        for arg in args_ast {
            args.push(self.expr(arg)?);
        }

        // statically evaluate each argument and synthesize its schema
        let mut resolutions = Vec::new();
        let mut type_name = String::new();
        for arg in &args {
            if !is_string(arg.ty.as_ref()) {
                self.error("'load' expects a String parameter");
                continue;
            }
            let module = Module {
                body: vec![Stmt::Expr(arg.clone())],
                docstring: String::new(),
            };
            let rendered = vela_codegen::codegen(&module, &self.defs, false)
                .and_then(|program| interpret(&program));
            let rendered = match rendered {
                Ok(rendered) => rendered,
                Err(_) => {
                    self.error("cannot evaluate 'load' argument at compile time");
                    continue;
                }
            };
            // the machine renders strings quoted
            let filename = rendered.trim_matches('"').to_string();
            let schema = match infer_table_from_file(&filename) {
                Ok(schema) => schema,
                Err(err) => {
                    self.error(format!("cannot infer schema from '{filename}': {err}"));
                    continue;
                }
            };
            type_name = format!("Provider${filename}");
            if let Stmt::Data(id) = self.create_datatype(&type_name, &schema)? {
                resolutions.push(id);
            }
        }

        let ty = if type_name.is_empty() {
            None
        } else {
            self.make_dataframe(&format!("!{type_name}"))
        };
        Ok(Expr::new(
            ExprKind::TemplateInst {
                func: Box::new(func),
                args,
                resolutions,
            },
            ty,
            "load",
        ))
    }
}
