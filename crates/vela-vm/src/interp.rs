//! Stack interpreter for compiled programs.

use crate::program::{Instr, Program, Value};
use vela_core::{Error, Result};

/// Runs a program and renders its final stack value.
///
/// # Errors
/// Returns `Error::Runtime` on stack underflow, operand type mismatches,
/// or division by zero.
pub fn interpret(program: &Program) -> Result<String> {
    let mut stack: Vec<Value> = Vec::new();

    for instr in &program.code {
        match instr {
            Instr::Const(idx) => {
                let value = program
                    .consts
                    .get(*idx)
                    .ok_or_else(|| Error::Runtime(format!("bad constant index {idx}")))?;
                stack.push(value.clone());
            }
            Instr::Neg => {
                let v = pop(&mut stack)?;
                stack.push(match v {
                    Value::I64(n) => Value::I64(-n),
                    Value::F64(x) => Value::F64(-x),
                    other => return Err(type_error("negate", &other)),
                });
            }
            Instr::Not => {
                let v = pop(&mut stack)?;
                stack.push(match v {
                    Value::B8(b) => Value::B8(!b),
                    other => return Err(type_error("not", &other)),
                });
            }
            Instr::Add => binary(&mut stack, |l, r| match (l, r) {
                (Value::I64(a), Value::I64(b)) => Ok(Value::I64(a + b)),
                (Value::F64(a), Value::F64(b)) => Ok(Value::F64(a + b)),
                (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
                (l, _) => Err(type_error("add", &l)),
            })?,
            Instr::Sub => arith(&mut stack, "subtract", |a, b| a - b, |a, b| a - b)?,
            Instr::Mul => arith(&mut stack, "multiply", |a, b| a * b, |a, b| a * b)?,
            Instr::Div => binary(&mut stack, |l, r| match (l, r) {
                (Value::I64(_), Value::I64(0)) => {
                    Err(Error::Runtime("division by zero".to_string()))
                }
                (Value::I64(a), Value::I64(b)) => Ok(Value::I64(a / b)),
                (Value::F64(a), Value::F64(b)) => Ok(Value::F64(a / b)),
                (l, _) => Err(type_error("divide", &l)),
            })?,
            Instr::Rem => binary(&mut stack, |l, r| match (l, r) {
                (Value::I64(_), Value::I64(0)) => {
                    Err(Error::Runtime("division by zero".to_string()))
                }
                (Value::I64(a), Value::I64(b)) => Ok(Value::I64(a % b)),
                (l, _) => Err(type_error("remainder", &l)),
            })?,
            Instr::Lt => compare(&mut stack, |o| o.is_lt())?,
            Instr::Le => compare(&mut stack, |o| o.is_le())?,
            Instr::Gt => compare(&mut stack, |o| o.is_gt())?,
            Instr::Ge => compare(&mut stack, |o| o.is_ge())?,
            Instr::Eq => {
                let r = pop(&mut stack)?;
                let l = pop(&mut stack)?;
                stack.push(Value::B8(l == r));
            }
            Instr::Ne => {
                let r = pop(&mut stack)?;
                let l = pop(&mut stack)?;
                stack.push(Value::B8(l != r));
            }
            Instr::And => logical(&mut stack, |a, b| a && b)?,
            Instr::Or => logical(&mut stack, |a, b| a || b)?,
        }
    }

    let result = pop(&mut stack)?;
    Ok(result.to_string())
}

fn pop(stack: &mut Vec<Value>) -> Result<Value> {
    stack
        .pop()
        .ok_or_else(|| Error::Runtime("stack underflow".to_string()))
}

fn type_error(op: &str, value: &Value) -> Error {
    Error::Runtime(format!("cannot {op} value {value}"))
}

fn binary(stack: &mut Vec<Value>, f: impl FnOnce(Value, Value) -> Result<Value>) -> Result<()> {
    let r = pop(stack)?;
    let l = pop(stack)?;
    stack.push(f(l, r)?);
    Ok(())
}

fn arith(
    stack: &mut Vec<Value>,
    op: &str,
    ints: impl FnOnce(i64, i64) -> i64,
    floats: impl FnOnce(f64, f64) -> f64,
) -> Result<()> {
    binary(stack, |l, r| match (l, r) {
        (Value::I64(a), Value::I64(b)) => Ok(Value::I64(ints(a, b))),
        (Value::F64(a), Value::F64(b)) => Ok(Value::F64(floats(a, b))),
        (l, _) => Err(type_error(op, &l)),
    })
}

fn compare(stack: &mut Vec<Value>, accept: impl FnOnce(std::cmp::Ordering) -> bool) -> Result<()> {
    binary(stack, |l, r| {
        let ordering = match (&l, &r) {
            (Value::I64(a), Value::I64(b)) => a.cmp(b),
            (Value::F64(a), Value::F64(b)) => a
                .partial_cmp(b)
                .ok_or_else(|| Error::Runtime("cannot order NaN".to_string()))?,
            (Value::Str(a), Value::Str(b)) => a.cmp(b),
            (Value::C8(a), Value::C8(b)) => a.cmp(b),
            _ => return Err(type_error("compare", &l)),
        };
        Ok(Value::B8(accept(ordering)))
    })
}

fn logical(stack: &mut Vec<Value>, f: impl FnOnce(bool, bool) -> bool) -> Result<()> {
    binary(stack, |l, r| match (l, r) {
        (Value::B8(a), Value::B8(b)) => Ok(Value::B8(f(a, b))),
        (l, _) => Err(type_error("combine", &l)),
    })
}
