// src/ir.rs
use std::fmt;

/// Operator carried by a binary TAC instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Add, Sub, Mul, Div,
    Eq, Ne, Lt, Gt, Le, Ge,
}

impl Op {
    pub fn symbol(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Eq => "==",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Gt => ">",
            Op::Le => "<=",
            Op::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Temp(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(pub u32);

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Something an instruction can write to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Place {
    Var(String),
    Temp(Temp),
}

/// Something an instruction can read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Const(i64),
    Var(String),
    Temp(Temp),
}

impl From<Place> for Operand {
    fn from(place: Place) -> Self {
        match place {
            Place::Var(name) => Operand::Var(name),
            Place::Temp(t) => Operand::Temp(t),
        }
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Place::Var(name) => write!(f, "{name}"),
            Place::Temp(t) => write!(f, "{t}"),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Const(n) => write!(f, "{n}"),
            Operand::Var(name) => write!(f, "{name}"),
            Operand::Temp(t) => write!(f, "{t}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    Label(Label),

    // data movement / arithmetic
    Copy { dest: Place, src: Operand },
    Binary { dest: Place, op: Op, lhs: Operand, rhs: Operand },

    // control flow
    IfFalse { cond: Operand, target: Label },
    Goto(Label),

    // functions
    FuncBegin(String),
    FuncEnd,
    GetParam(String),
    Param(Operand),
    Call { dest: Temp, func: String, argc: usize },
    Return(Operand),

    // builtins
    Print(Operand),
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Label(label) => write!(f, "{label}:"),
            Instr::Copy { dest, src } => write!(f, "{dest} = {src}"),
            Instr::Binary { dest, op, lhs, rhs } => {
                write!(f, "{dest} = {lhs} {} {rhs}", op.symbol())
            }
            Instr::IfFalse { cond, target } => write!(f, "if_false {cond} goto {target}"),
            Instr::Goto(label) => write!(f, "goto {label}"),
            Instr::FuncBegin(name) => write!(f, "func_begin {name}"),
            Instr::FuncEnd => write!(f, "func_end"),
            Instr::GetParam(name) => write!(f, "get_param {name}"),
            Instr::Param(arg) => write!(f, "param {arg}"),
            Instr::Call { dest, func, argc } => write!(f, "{dest} = call {func}, {argc}"),
            Instr::Return(value) => write!(f, "return {value}"),
            Instr::Print(value) => write!(f, "print {value}"),
        }
    }
}

/// Render an instruction sequence one line per instruction.
pub fn listing(code: &[Instr]) -> Vec<String> {
    code.iter().map(ToString::to_string).collect()
}
