//! The Vela virtual machine.
//!
//! This crate provides the fixed table of primitive machine types, the
//! bytecode [`Program`] representation with its stack [`interpret`]er, and
//! the CSV schema inference used to type `load` expressions at compile time.

mod csv;
mod interp;
mod program;
mod types;

pub use csv::infer_table_from_file;
pub use interp::interpret;
pub use program::{Instr, Program, Value};
pub use types::VmType;
