// src/irgen.rs
use tracing::debug;

use crate::ast::*;
use crate::ir::{Instr, Label, Op, Operand, Place, Temp};

/// Fresh temporaries and labels. Both sequences run for the whole
/// compilation and are never reset at function boundaries.
#[derive(Debug, Default)]
pub struct Counters {
    temps: u32,
    labels: u32,
}

impl Counters {
    pub fn temp(&mut self) -> Temp {
        self.temps += 1;
        Temp(self.temps)
    }

    pub fn label(&mut self) -> Label {
        self.labels += 1;
        Label(self.labels)
    }
}

/// Lowers the AST to a flat three-address instruction sequence.
#[derive(Default)]
pub struct IrGenerator {
    counters: Counters,
    code: Vec<Instr>,
}

impl IrGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lower(mut self, program: &Program) -> Vec<Instr> {
        for stmt in &program.body {
            self.emit_stmt(stmt);
        }
        debug!(instructions = self.code.len(), "lowered program to TAC");
        self.code
    }

    fn emit_block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.emit_stmt(stmt);
        }
    }

    fn emit_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::FuncDef(def) => {
                self.code.push(Instr::FuncBegin(def.name.clone()));
                for param in &def.params {
                    self.code.push(Instr::GetParam(param.clone()));
                }
                self.emit_block(&def.body);
                self.code.push(Instr::FuncEnd);
            }
            Stmt::If { cond, then_block, else_block } => {
                let cond = self.emit_expr(cond);
                let after_then = self.counters.label();
                self.code.push(Instr::IfFalse { cond, target: after_then });
                self.emit_block(then_block);
                match else_block {
                    Some(else_block) => {
                        let end = self.counters.label();
                        self.code.push(Instr::Goto(end));
                        self.code.push(Instr::Label(after_then));
                        self.emit_block(else_block);
                        self.code.push(Instr::Label(end));
                    }
                    None => self.code.push(Instr::Label(after_then)),
                }
            }
            Stmt::While { cond, body } => {
                let start = self.counters.label();
                let end = self.counters.label();
                self.code.push(Instr::Label(start));
                let cond = self.emit_expr(cond);
                self.code.push(Instr::IfFalse { cond, target: end });
                self.emit_block(body);
                self.code.push(Instr::Goto(start));
                self.code.push(Instr::Label(end));
            }
            Stmt::Assign { target, value } => {
                let src = self.emit_expr(value);
                self.code.push(Instr::Copy { dest: Place::Var(target.clone()), src });
            }
            Stmt::Print(value) => {
                let value = self.emit_expr(value);
                self.code.push(Instr::Print(value));
            }
            Stmt::Return(value) => {
                let value = self.emit_expr(value);
                self.code.push(Instr::Return(value));
            }
            Stmt::Call(call) => {
                // result temp is discarded
                self.emit_call(call);
            }
        }
    }

    fn emit_call(&mut self, call: &Call) -> Temp {
        let args: Vec<Operand> = call.args.iter().map(|arg| self.emit_expr(arg)).collect();
        for arg in args.iter().rev() {
            self.code.push(Instr::Param(arg.clone()));
        }
        let dest = self.counters.temp();
        self.code.push(Instr::Call { dest, func: call.name.clone(), argc: args.len() });
        dest
    }

    fn emit_binary(&mut self, op: Op, lhs: &Expr, rhs: &Expr) -> Operand {
        let lhs = self.emit_expr(lhs);
        let rhs = self.emit_expr(rhs);
        let dest = self.counters.temp();
        self.code.push(Instr::Binary { dest: Place::Temp(dest), op, lhs, rhs });
        Operand::Temp(dest)
    }

    fn emit_expr(&mut self, expr: &Expr) -> Operand {
        match expr {
            Expr::Number(n) => Operand::Const(*n),
            Expr::Ident(name) => Operand::Var(name.clone()),
            Expr::Call(call) => Operand::Temp(self.emit_call(call)),
            Expr::BinOp { op, lhs, rhs } => {
                let op = match op {
                    BinaryOp::Add => Op::Add,
                    BinaryOp::Sub => Op::Sub,
                    BinaryOp::Mul => Op::Mul,
                    BinaryOp::Div => Op::Div,
                };
                self.emit_binary(op, lhs, rhs)
            }
            Expr::RelOp { op, lhs, rhs } => {
                let op = match op {
                    RelOp::Eq => Op::Eq,
                    RelOp::Ne => Op::Ne,
                    RelOp::Lt => Op::Lt,
                    RelOp::Gt => Op::Gt,
                    RelOp::Le => Op::Le,
                    RelOp::Ge => Op::Ge,
                };
                self.emit_binary(op, lhs, rhs)
            }
        }
    }
}

/// Lower `program` with a fresh set of counters.
pub fn lower(program: &Program) -> Vec<Instr> {
    IrGenerator::new().lower(program)
}
