//! Template-based lowering of TAC to assembly for the abstract machine.
//!
//! Every IR instruction expands to a fixed sequence of lines. Values move
//! through two scratch registers, R1 and R2, and AX carries call results
//! and return values. Nothing is saved or spilled between instructions, so
//! the selection is only correct while no more than two values are live at
//! once. Real register allocation would change this contract and is not
//! attempted here.

use tracing::{debug, warn};

use crate::asm::{AsmLine, AsmOperand, Opcode, Reg};
use crate::ir::{Instr, Op, Operand, Place};

pub struct CodeGenerator {
    lines: Vec<AsmLine>,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn generate(mut self, code: &[Instr]) -> Vec<AsmLine> {
        for instr in code {
            self.compile_instr(instr);
        }
        debug!(lines = self.lines.len(), "generated assembly");
        self.lines
    }

    fn compile_instr(&mut self, instr: &Instr) {
        match instr {
            Instr::Label(label) => self.lines.push(AsmLine::Label(label.to_string())),
            Instr::Copy { dest, src } => self.emit_copy(dest, src),
            Instr::Binary { dest, op, lhs, rhs } => self.emit_binary(dest, *op, lhs, rhs),
            Instr::IfFalse { cond, target } => {
                self.emit(Opcode::Load, vec![operand(cond), reg(Reg::R1)]);
                self.emit(Opcode::Cmp, vec![reg(Reg::R1), AsmOperand::Imm(0)]);
                self.emit(Opcode::Je, vec![sym(target)]);
            }
            Instr::Goto(label) => self.emit(Opcode::Jmp, vec![sym(label)]),
            Instr::FuncBegin(name) => self.emit_prologue(name),
            Instr::FuncEnd => self.emit_epilogue(),
            Instr::GetParam(name) => self.emit(Opcode::Pop, vec![sym(name)]),
            Instr::Param(arg) => self.emit(Opcode::Push, vec![operand(arg)]),
            Instr::Call { dest, func, .. } => {
                self.emit(Opcode::Call, vec![sym(func)]);
                self.emit(Opcode::Store, vec![reg(Reg::Ax), sym(dest)]);
            }
            Instr::Return(value) => self.emit(Opcode::Load, vec![operand(value), reg(Reg::Ax)]),
            Instr::Print(value) => self.emit(Opcode::Print, vec![operand(value)]),
        }
    }

    fn emit(&mut self, op: Opcode, operands: Vec<AsmOperand>) {
        self.lines.push(AsmLine::Instr { op, operands });
    }

    fn emit_prologue(&mut self, name: &str) {
        self.lines.push(AsmLine::Label(name.to_string()));
        self.emit(Opcode::Push, vec![reg(Reg::Bp)]);
        self.emit(Opcode::Mov, vec![reg(Reg::Sp), reg(Reg::Bp)]);
    }

    fn emit_epilogue(&mut self) {
        self.emit(Opcode::Pop, vec![reg(Reg::Bp)]);
        self.emit(Opcode::Ret, vec![]);
    }

    fn emit_copy(&mut self, dest: &Place, src: &Operand) {
        self.emit(Opcode::Load, vec![operand(src), reg(Reg::R1)]);
        self.emit(Opcode::Store, vec![reg(Reg::R1), sym(dest)]);
    }

    fn emit_binary(&mut self, dest: &Place, op: Op, lhs: &Operand, rhs: &Operand) {
        let opcode = opcode_for(op);
        if opcode == Opcode::OpErr {
            warn!(op = op.symbol(), %dest, "operator has no opcode, emitting OP_ERR");
        }
        self.emit(Opcode::Load, vec![operand(lhs), reg(Reg::R1)]);
        self.emit(Opcode::Load, vec![operand(rhs), reg(Reg::R2)]);
        self.emit(opcode, vec![reg(Reg::R1), reg(Reg::R2)]);
        self.emit(Opcode::Store, vec![reg(Reg::R1), sym(dest)]);
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// `<=` and `>=` have no instruction and map to the `OP_ERR` sentinel.
pub fn opcode_for(op: Op) -> Opcode {
    match op {
        Op::Add => Opcode::Add,
        Op::Sub => Opcode::Sub,
        Op::Mul => Opcode::Mul,
        Op::Div => Opcode::Div,
        Op::Gt => Opcode::CmpGt,
        Op::Lt => Opcode::CmpLt,
        Op::Eq => Opcode::CmpEq,
        Op::Ne => Opcode::CmpNe,
        Op::Le | Op::Ge => Opcode::OpErr,
    }
}

fn operand(value: &Operand) -> AsmOperand {
    match value {
        Operand::Const(n) => AsmOperand::Imm(*n),
        other => AsmOperand::Sym(other.to_string()),
    }
}

fn reg(reg: Reg) -> AsmOperand {
    AsmOperand::Reg(reg)
}

fn sym(name: &impl ToString) -> AsmOperand {
    AsmOperand::Sym(name.to_string())
}

/// Generate assembly for a whole TAC sequence.
pub fn generate(code: &[Instr]) -> Vec<AsmLine> {
    CodeGenerator::new().generate(code)
}
