//! Bytecode generation for compile-time evaluation of Vela HIR.
//!
//! Semantic analysis needs to evaluate `load` template arguments while the
//! program is being compiled. It wraps each argument in a one-statement
//! module and hands it here; anything that cannot be reduced to constants
//! and built-in operators is rejected.

mod generator;

pub use generator::{CodeGenerator, codegen};
