use std::fmt::{self, Write};

pub use crate::lexer::RelOp;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Vec<Stmt>,
}

/// A `{ ... }` statement list.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef {
    pub name: String,
    pub params: Vec<String>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub name: String,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    FuncDef(FuncDef),
    If {
        cond: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },
    While {
        cond: Expr,
        body: Block,
    },
    Assign {
        target: String,
        value: Expr,
    },
    Print(Expr),
    Return(Expr),
    Call(Call),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(i64),
    Ident(String),
    Call(Call),
    BinOp {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    RelOp {
        op: RelOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn binop(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::BinOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }

    pub fn relop(op: RelOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::RelOp { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
    }
}

// Compact functional form, e.g. `binop(+, number(2), identifier(x))`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "number({n})"),
            Expr::Ident(name) => write!(f, "identifier({name})"),
            Expr::Call(call) => {
                write!(f, "func_call({}", call.name)?;
                for arg in &call.args {
                    write!(f, ", {arg}")?;
                }
                write!(f, ")")
            }
            Expr::BinOp { op, lhs, rhs } => write!(f, "binop({}, {lhs}, {rhs})", op.symbol()),
            Expr::RelOp { op, lhs, rhs } => write!(f, "relop({}, {lhs}, {rhs})", op.symbol()),
        }
    }
}

/// Nested dump of the tree, two spaces per level, one node per line. Named
/// nodes (`func_def`, `assign`, `func_call`) list their name as a leading
/// `identifier` child.
pub fn dump(program: &Program) -> String {
    let mut out = String::new();
    line(&mut out, 0, "program", None);
    for stmt in &program.body {
        dump_stmt(&mut out, 1, stmt);
    }
    out
}

fn line(out: &mut String, level: usize, kind: &str, value: Option<&dyn fmt::Display>) {
    for _ in 0..level {
        out.push_str("  ");
    }
    out.push_str(kind);
    if let Some(value) = value {
        let _ = write!(out, " -> {value}");
    }
    out.push('\n');
}

fn dump_block(out: &mut String, level: usize, block: &Block) {
    line(out, level, "statements", None);
    for stmt in &block.stmts {
        dump_stmt(out, level + 1, stmt);
    }
}

fn dump_stmt(out: &mut String, level: usize, stmt: &Stmt) {
    match stmt {
        Stmt::FuncDef(def) => {
            line(out, level, "func_def", None);
            line(out, level + 1, "identifier", Some(&def.name));
            for param in &def.params {
                line(out, level + 1, "param", Some(param));
            }
            dump_block(out, level + 1, &def.body);
        }
        Stmt::If { cond, then_block, else_block } => {
            line(out, level, "if", None);
            dump_expr(out, level + 1, cond);
            dump_block(out, level + 1, then_block);
            if let Some(else_block) = else_block {
                dump_block(out, level + 1, else_block);
            }
        }
        Stmt::While { cond, body } => {
            line(out, level, "while", None);
            dump_expr(out, level + 1, cond);
            dump_block(out, level + 1, body);
        }
        Stmt::Assign { target, value } => {
            line(out, level, "assign", Some(&"="));
            line(out, level + 1, "identifier", Some(target));
            dump_expr(out, level + 1, value);
        }
        Stmt::Print(value) => {
            line(out, level, "print", None);
            dump_expr(out, level + 1, value);
        }
        Stmt::Return(value) => {
            line(out, level, "return", None);
            dump_expr(out, level + 1, value);
        }
        Stmt::Call(call) => dump_call(out, level, call),
    }
}

fn dump_call(out: &mut String, level: usize, call: &Call) {
    line(out, level, "func_call", None);
    line(out, level + 1, "identifier", Some(&call.name));
    for arg in &call.args {
        dump_expr(out, level + 1, arg);
    }
}

fn dump_expr(out: &mut String, level: usize, expr: &Expr) {
    match expr {
        Expr::Number(n) => line(out, level, "number", Some(n)),
        Expr::Ident(name) => line(out, level, "identifier", Some(name)),
        Expr::Call(call) => dump_call(out, level, call),
        Expr::BinOp { op, lhs, rhs } => {
            line(out, level, "binop", Some(&op.symbol()));
            dump_expr(out, level + 1, lhs);
            dump_expr(out, level + 1, rhs);
        }
        Expr::RelOp { op, lhs, rhs } => {
            line(out, level, "relop", Some(&op.symbol()));
            dump_expr(out, level + 1, lhs);
            dump_expr(out, level + 1, rhs);
        }
    }
}
