//! HIR-to-bytecode compilation of constant expressions.

use vela_core::{Error, Result};
use vela_hir::{Definitions, Expr, ExprKind, Module, Resolved, Stmt};
use vela_vm::{Instr, Program, Value};

/// Compiles a module of constant expressions into a bytecode program.
///
/// # Errors
/// Returns `Error::Codegen` for any construct that is not a compile-time
/// constant (names, calls, queries, control flow, ...).
pub fn codegen(module: &Module, defs: &Definitions, dump_program: bool) -> Result<Program> {
    let generator = CodeGenerator::new(defs);
    let program = generator.generate(module)?;
    if dump_program {
        println!("{program:?}");
    }
    Ok(program)
}

/// Compiles constant expressions into stack instructions.
pub struct CodeGenerator<'a> {
    defs: &'a Definitions,
    program: Program,
}

impl<'a> CodeGenerator<'a> {
    #[must_use]
    pub fn new(defs: &'a Definitions) -> Self {
        Self {
            defs,
            program: Program::new(),
        }
    }

    /// Generates code for every statement of the module.
    pub fn generate(mut self, module: &Module) -> Result<Program> {
        for stmt in &module.body {
            match stmt {
                Stmt::Expr(expr) => self.expr(expr)?,
                _ => return Err(not_constant("statement")),
            }
        }
        Ok(self.program)
    }

    fn expr(&mut self, expr: &Expr) -> Result<()> {
        match &expr.kind {
            ExprKind::Integer(n) => self.constant(Value::I64(*n)),
            ExprKind::Float(x) => self.constant(Value::F64(*x)),
            ExprKind::Bool(b) => self.constant(Value::B8(*b)),
            ExprKind::Str(s) => self.constant(Value::Str(s.clone())),
            ExprKind::Char(c) => self.constant(Value::C8(*c)),
            ExprKind::Paren(inner) => self.expr(inner),
            ExprKind::Unary { operand, res, .. } => {
                self.expr(operand)?;
                match vm_opcode(res.as_ref())? {
                    "pos" => {}
                    "neg" => self.program.emit(Instr::Neg),
                    "not" => self.program.emit(Instr::Not),
                    other => return Err(not_constant(&format!("operator '{other}'"))),
                }
                Ok(())
            }
            ExprKind::Binary {
                left, right, res, ..
            } => {
                self.expr(left)?;
                self.expr(right)?;
                let instr = match vm_opcode(res.as_ref())? {
                    "add" => Instr::Add,
                    "sub" => Instr::Sub,
                    "mul" => Instr::Mul,
                    "div" => Instr::Div,
                    "rem" => Instr::Rem,
                    "lt" => Instr::Lt,
                    "le" => Instr::Le,
                    "gt" => Instr::Gt,
                    "ge" => Instr::Ge,
                    "eq" => Instr::Eq,
                    "ne" => Instr::Ne,
                    "and" => Instr::And,
                    "or" => Instr::Or,
                    other => return Err(not_constant(&format!("operator '{other}'"))),
                };
                self.program.emit(instr);
                Ok(())
            }
            ExprKind::Id { name, .. } | ExprKind::ImpliedMember { name, .. } => {
                Err(not_constant(&format!("name '{name}'")))
            }
            ExprKind::Call { func, .. } => match &func.kind {
                ExprKind::Id {
                    res: Some(Resolved::Func(id)),
                    ..
                } => Err(not_constant(&format!(
                    "call to function '{}'",
                    self.defs.func(*id).name
                ))),
                _ => Err(not_constant("function call")),
            },
            _ => Err(not_constant("expression")),
        }
    }

    fn constant(&mut self, value: Value) -> Result<()> {
        let idx = self.program.add_const(value);
        self.program.emit(Instr::Const(idx));
        Ok(())
    }
}

/// Extracts the opcode mnemonic from an operator's resolution.
fn vm_opcode(res: Option<&Resolved>) -> Result<&str> {
    match res {
        Some(Resolved::VmOp { code, .. }) => Ok(code),
        _ => Err(not_constant("user-defined operator")),
    }
}

fn not_constant(what: &str) -> Error {
    Error::Codegen(format!("{what} is not a compile-time constant"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vela_hir::{BinOpKind, DataType};
    use vela_vm::VmType;

    fn str_expr(s: &str) -> Expr {
        Expr::new(
            ExprKind::Str(s.to_string()),
            Some(DataType::Prim(VmType::Ss)),
            "",
        )
    }

    fn module_of(expr: Expr) -> Module {
        Module {
            body: vec![Stmt::Expr(expr)],
            docstring: String::new(),
        }
    }

    #[test]
    fn string_constant_evaluates_to_quoted_literal() {
        let defs = Definitions::new();
        let program = codegen(&module_of(str_expr("trades.csv")), &defs, false).unwrap();
        assert_eq!(vela_vm::interpret(&program).unwrap(), "\"trades.csv\"");
    }

    #[test]
    fn concatenation_of_constants() {
        let defs = Definitions::new();
        let concat = Expr::new(
            ExprKind::Binary {
                left: Box::new(str_expr("trades")),
                op: BinOpKind::Add,
                right: Box::new(str_expr(".csv")),
                res: Some(Resolved::VmOp {
                    code: "add".to_string(),
                    ty: DataType::Func {
                        params: vec![
                            Some(DataType::Prim(VmType::Ss)),
                            Some(DataType::Prim(VmType::Ss)),
                        ],
                        ret: Box::new(Some(DataType::Prim(VmType::Ss))),
                    },
                }),
            },
            Some(DataType::Prim(VmType::Ss)),
            "",
        );
        let program = codegen(&module_of(concat), &defs, false).unwrap();
        assert_eq!(vela_vm::interpret(&program).unwrap(), "\"trades.csv\"");
    }

    #[test]
    fn names_are_not_constants() {
        let defs = Definitions::new();
        let id = Expr::new(
            ExprKind::Id {
                name: "path".to_string(),
                res: None,
            },
            Some(DataType::Prim(VmType::Ss)),
            "path",
        );
        assert!(codegen(&module_of(id), &defs, false).is_err());
    }
}
