//! Batch compilation pipeline.

use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use miette::NamedSource;
use std::fs;
use std::path::Path;

/// Lexes, parses, and analyzes a file, optionally printing the HIR.
///
/// # Errors
/// Returns an error when any stage fails; diagnostics are printed first.
pub fn check(file: &Path, dump_hir: bool) -> Result<()> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("cannot read {}", file.display()))?;

    let ast = vela_parser::parse(&source, false, false).map_err(|e| {
        let name = file.display().to_string();
        let report = miette::Report::new(e).with_source_code(NamedSource::new(name, source.clone()));
        eprintln!("{report:?}");
        anyhow!("parsing failed")
    })?;

    let (module, defs) = vela_semantic::analyze(&ast, false, false).map_err(|e| {
        eprintln!("{}", e.to_string().red());
        anyhow!("semantic analysis failed")
    })?;

    if dump_hir {
        print!("{}", vela_hir::print_module(&defs, &module));
    } else {
        println!("{}: no errors", file.display());
    }
    Ok(())
}
