//! CSV schema inference.
//!
//! `load("file.csv")` is typed at compile time by inspecting the file and
//! rendering its schema as a `name: type, ...` field list, ready to be fed
//! back through the parser as a record definition body.

use crate::types::VmType;
use std::fs;
use std::path::Path;
use vela_core::{Error, Result};

/// How many data rows are sampled per column when guessing a type.
const SAMPLE_ROWS: usize = 100;

/// Infers a field list (`name: type, ...`) from a CSV file.
///
/// A column is `i64s` when every sampled cell parses as an integer, `f64s`
/// when every cell parses as a float, `b8s` for true/false columns, and
/// `Ss` otherwise. Empty cells are ignored; a column with no data is `Ss`.
///
/// # Errors
/// Returns `Error::Io` when the file cannot be read and `Error::Table`
/// when it has no header row.
pub fn infer_table_from_file(path: &str) -> Result<String> {
    let contents = fs::read_to_string(Path::new(path))?;
    let mut lines = contents.lines().filter(|l| !l.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| Error::Table(format!("{path} has no header row")))?;
    let names = sanitize_headers(header);
    if names.is_empty() {
        return Err(Error::Table(format!("{path} has no columns")));
    }

    let mut guesses = vec![TypeGuess::new(); names.len()];
    for line in lines.take(SAMPLE_ROWS) {
        for (guess, cell) in guesses.iter_mut().zip(line.split(',')) {
            guess.observe(cell.trim());
        }
    }

    let fields: Vec<String> = names
        .iter()
        .zip(&guesses)
        .map(|(name, guess)| format!("{}: {}", name, guess.resolve()))
        .collect();
    Ok(fields.join(", "))
}

/// Running type guess for a single column.
#[derive(Clone)]
struct TypeGuess {
    seen: bool,
    all_i64: bool,
    all_f64: bool,
    all_b8: bool,
}

impl TypeGuess {
    fn new() -> Self {
        Self {
            seen: false,
            all_i64: true,
            all_f64: true,
            all_b8: true,
        }
    }

    fn observe(&mut self, cell: &str) {
        if cell.is_empty() {
            return;
        }
        self.seen = true;
        self.all_i64 &= cell.parse::<i64>().is_ok();
        self.all_f64 &= cell.parse::<f64>().is_ok();
        self.all_b8 &= matches!(cell, "true" | "false");
    }

    fn resolve(&self) -> VmType {
        if !self.seen {
            VmType::Ss
        } else if self.all_i64 {
            VmType::I64s
        } else if self.all_f64 {
            VmType::F64s
        } else if self.all_b8 {
            VmType::B8s
        } else {
            VmType::Ss
        }
    }
}

/// Turns header cells into unique, lower-case-initial identifiers.
fn sanitize_headers(header: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for cell in header.split(',') {
        let mut name = sanitize(cell.trim());
        if names.contains(&name) {
            let mut n = 2;
            while names.contains(&format!("{name}_{n}")) {
                n += 1;
            }
            name = format!("{name}_{n}");
        }
        names.push(name);
    }
    names
}

fn sanitize(cell: &str) -> String {
    let mut name: String = cell
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, 'c');
    }
    // field names must begin with a lower-case letter
    let head = name.remove(0).to_ascii_lowercase();
    name.insert(0, head);
    name
}
