// src/asm.rs
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    R1,
    R2,
    Ax,
    Bp,
    Sp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmOperand {
    Imm(i64),
    Reg(Reg),
    /// Variable, temporary or label, resolved by a later stage.
    Sym(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Load, Store, Mov,
    Push, Pop,
    Cmp, Je, Jmp,
    Call, Ret,
    Print,
    Add, Sub, Mul, Div,
    CmpGt, CmpLt, CmpEq, CmpNe,
    /// Emitted for operators with no machine mapping.
    OpErr,
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Load => "LOAD",
            Opcode::Store => "STORE",
            Opcode::Mov => "MOV",
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::Cmp => "CMP",
            Opcode::Je => "JE",
            Opcode::Jmp => "JMP",
            Opcode::Call => "CALL",
            Opcode::Ret => "RET",
            Opcode::Print => "PRINT",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::CmpGt => "CMPGT",
            Opcode::CmpLt => "CMPLT",
            Opcode::CmpEq => "CMPEQ",
            Opcode::CmpNe => "CMPNE",
            Opcode::OpErr => "OP_ERR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmLine {
    Label(String),
    Instr { op: Opcode, operands: Vec<AsmOperand> },
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reg::R1 => "R1",
            Reg::R2 => "R2",
            Reg::Ax => "AX",
            Reg::Bp => "BP",
            Reg::Sp => "SP",
        };
        f.write_str(name)
    }
}

impl fmt::Display for AsmOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmOperand::Imm(n) => write!(f, "#{n}"),
            AsmOperand::Reg(reg) => write!(f, "{reg}"),
            AsmOperand::Sym(name) => f.write_str(name),
        }
    }
}

impl fmt::Display for AsmLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmLine::Label(name) => write!(f, "{name}:"),
            AsmLine::Instr { op, operands } => {
                write!(f, "  {}", op.mnemonic())?;
                for (i, operand) in operands.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{sep}{operand}")?;
                }
                Ok(())
            }
        }
    }
}

/// Render the full listing. Every label after the first gets a blank line
/// in front of it.
pub fn listing(lines: &[AsmLine]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
            if matches!(line, AsmLine::Label(_)) {
                out.push('\n');
            }
        }
        out.push_str(&line.to_string());
    }
    out
}
