//! Quadruple IR: the flat instruction vector emitted by the translators and
//! consumed by the VM.

use crate::ast::BinOp;

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Addr(i64),
    FuncName(String),
    StrLiteral(String),
    QuadIndex(usize),
    None,
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Addr(a) => write!(f, "{a}"),
            Operand::FuncName(n) => write!(f, "{n}"),
            Operand::StrLiteral(s) => write!(f, "{s}"),
            Operand::QuadIndex(i) => write!(f, "{i}"),
            Operand::None => write!(f, "_"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    MainStart,
    Func,
    EndFunc,
    Era,
    Param,
    Gosub,
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Gt,
    Ne,
    Goto,
    Gotof,
    Print,
    EndProgram,
}

impl Op {
    pub fn name(self) -> &'static str {
        match self {
            Op::MainStart => "MAIN_START",
            Op::Func => "FUNC",
            Op::EndFunc => "ENDFUNC",
            Op::Era => "ERA",
            Op::Param => "PARAM",
            Op::Gosub => "GOSUB",
            Op::Assign => "=",
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
            Op::Div => "/",
            Op::Lt => "<",
            Op::Gt => ">",
            Op::Ne => "!=",
            Op::Goto => "GOTO",
            Op::Gotof => "GOTOF",
            Op::Print => "PRINT",
            Op::EndProgram => "ENDPROGRAM",
        }
    }
}

impl From<BinOp> for Op {
    fn from(op: BinOp) -> Self {
        match op {
            BinOp::Add => Op::Add,
            BinOp::Sub => Op::Sub,
            BinOp::Mul => Op::Mul,
            BinOp::Div => Op::Div,
            BinOp::Lt => Op::Lt,
            BinOp::Gt => Op::Gt,
            BinOp::Ne => Op::Ne,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quad {
    pub op: Op,
    pub arg1: Operand,
    pub arg2: Operand,
    pub dest: Operand,
}

impl Quad {
    pub fn new(op: Op, arg1: Operand, arg2: Operand, dest: Operand) -> Self {
        Quad { op, arg1, arg2, dest }
    }
}

impl std::fmt::Display for Quad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {}, {})", self.op.name(), self.arg1, self.arg2, self.dest)
    }
}
