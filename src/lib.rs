//! Teaching-scale compiler from a small imperative language to three-address
//! code and then to assembly for an abstract two-register machine.
//!
//! - `lexer` turns source text into tokens.
//! - `parser` builds the AST by recursive descent.
//! - `semantic` checks that every name is defined before use.
//! - `irgen` lowers the AST to TAC (`ir`).
//! - `codegen` expands TAC into assembly lines (`asm`).
//! - `driver` prints each artifact as its stage completes.

pub mod asm;
pub mod ast;
pub mod codegen;
pub mod config;
pub mod driver;
pub mod error;
pub mod ir;
pub mod irgen;
pub mod lexer;
pub mod parser;
pub mod semantic;

pub use error::{CompileError, CompileResult, NameRequirement};

use asm::AsmLine;
use ast::Program;
use ir::Instr;
use lexer::Token;
use semantic::SymbolTable;

/// Every artifact produced by one successful compilation.
#[derive(Debug, Clone)]
pub struct Compilation {
    pub tokens: Vec<Token>,
    pub program: Program,
    pub symbols: SymbolTable,
    pub ir: Vec<Instr>,
    pub asm: Vec<AsmLine>,
}

impl Compilation {
    pub fn ir_listing(&self) -> Vec<String> {
        ir::listing(&self.ir)
    }

    pub fn asm_listing(&self) -> String {
        asm::listing(&self.asm)
    }
}

/// Run the whole pipeline, stopping at the first error.
pub fn compile(source: &str) -> CompileResult<Compilation> {
    let tokens = lexer::tokenize(source)?;
    let program = parser::parse(tokens.clone())?;
    let symbols = semantic::check(&program)?;
    let ir = irgen::lower(&program);
    let asm = codegen::generate(&ir);
    Ok(Compilation { tokens, program, symbols, ir, asm })
}
