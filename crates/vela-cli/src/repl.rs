//! The interactive session.
//!
//! One analyzer lives for the whole session, so definitions accumulate
//! across inputs and overridable symbols may be redefined. Each accepted
//! input is echoed back in its HIR rendering.

use anyhow::Result;
use colored::Colorize;
use std::io::{self, BufRead, Write};
use vela_core::Error;
use vela_semantic::Analyzer;

pub fn run() -> Result<()> {
    let mut analyzer = Analyzer::new();
    analyzer.set_interactive(true);

    let stdin = io::stdin();
    let mut buffer = String::new();

    print!("{}", "vela> ".bold());
    io::stdout().flush()?;
    for line in stdin.lock().lines() {
        let line = line?;
        buffer.push_str(&line);
        buffer.push('\n');

        match vela_parser::parse(&buffer, true, false) {
            Ok(ast) => {
                buffer.clear();
                match analyzer.analyze_module(&ast) {
                    Ok(module) => print!("{}", analyzer.render(&module)),
                    Err(e) => eprintln!("{}", e.to_string().red()),
                }
            }
            // an unfinished block keeps accumulating lines
            Err(Error::Parser(ref msg, _)) if msg.contains("unexpected end of input") => {
                print!("{}", "  ... ".dimmed());
                io::stdout().flush()?;
                continue;
            }
            Err(e) => {
                buffer.clear();
                eprintln!("{}", e.to_string().red());
            }
        }

        print!("{}", "vela> ".bold());
        io::stdout().flush()?;
    }
    Ok(())
}
