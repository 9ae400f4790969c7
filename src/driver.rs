//! Stage-by-stage report of a compilation.
//!
//! Each section is written to the sink as soon as its stage finishes, so a
//! failing compilation still shows everything produced before the error.

use std::io::{self, Write};

use thiserror::Error;
use tracing::{debug, info};

use crate::error::CompileError;
use crate::{Compilation, ast, asm, codegen, ir, irgen, lexer, parser, semantic};

#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error("failed to write report: {0}")]
    Io(#[from] io::Error),
}

fn section<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out, "--- {title} ---")
}

/// Compile `source`, writing tokens, AST, semantic result, TAC and assembly
/// to `out` in that order.
pub fn run<W: Write>(source: &str, out: &mut W) -> Result<Compilation, DriverError> {
    section(out, "1. Lexical Analysis (Tokens)")?;
    let tokens = lexer::tokenize(source)?;
    for token in &tokens {
        writeln!(out, "{token}")?;
    }

    writeln!(out)?;
    section(out, "2. Parsing (Abstract Syntax Tree)")?;
    let program = parser::parse(tokens.clone())?;
    write!(out, "{}", ast::dump(&program))?;

    writeln!(out)?;
    section(out, "3. Semantic Analysis")?;
    let symbols = match semantic::check(&program) {
        Ok(symbols) => symbols,
        Err(err) => {
            writeln!(out, "{err}")?;
            return Err(err.into());
        }
    };
    debug!(symbols = symbols.len(), "symbol table built");
    writeln!(out, "Semantic analysis successful.")?;

    writeln!(out)?;
    section(out, "4. Three-Address Code (TAC)")?;
    let code = irgen::lower(&program);
    for line in ir::listing(&code) {
        writeln!(out, "{line}")?;
    }

    writeln!(out)?;
    section(out, "5. Assembly Code Generation")?;
    let lines = codegen::generate(&code);
    writeln!(out, "{}", asm::listing(&lines))?;

    info!(tokens = tokens.len(), tac = code.len(), asm = lines.len(), "compilation finished");
    Ok(Compilation { tokens, program, symbols, ir: code, asm: lines })
}
