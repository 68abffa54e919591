//! The closed instruction set of the listing target.

use std::fmt;

/// All 30 opcodes.
///
/// Register-register arithmetic takes `A = dest, B = lhs, C = rhs`. All
/// branching opcodes carry a relative offset in B, computed as
/// `offset = target − jump_index − 1`: JMP branches unconditionally, and
/// JMPT/JMPF test register A first. FORPREP/FORLOOP operate on a contiguous
/// (current, limit, step) control block starting at register A and also
/// branch by B.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    Move = 0,
    LoadK,
    LoadNil,
    LoadTrue,
    LoadFalse,
    GetGlobal,
    SetGlobal,
    NewTable,
    SetIndex,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Concat,
    Neg,
    Not,
    Eq,
    Ne,
    Lt,
    Le,
    Jmp,
    JmpT,
    JmpF,
    ForPrep,
    ForLoop,
    Closure,
    Call,
    Return,
}

impl OpCode {
    /// Number of opcodes.
    pub const COUNT: usize = 30;

    /// Listing mnemonic.
    pub fn name(&self) -> &'static str {
        use OpCode::*;
        match self {
            Move => "MOVE",
            LoadK => "LOADK",
            LoadNil => "LOADNIL",
            LoadTrue => "LOADTRUE",
            LoadFalse => "LOADFALSE",
            GetGlobal => "GETGLOBAL",
            SetGlobal => "SETGLOBAL",
            NewTable => "NEWTABLE",
            SetIndex => "SETINDEX",
            Add => "ADD",
            Sub => "SUB",
            Mul => "MUL",
            Div => "DIV",
            Mod => "MOD",
            Pow => "POW",
            Concat => "CONCAT",
            Neg => "NEG",
            Not => "NOT",
            Eq => "EQ",
            Ne => "NE",
            Lt => "LT",
            Le => "LE",
            Jmp => "JMP",
            JmpT => "JMPT",
            JmpF => "JMPF",
            ForPrep => "FORPREP",
            ForLoop => "FORLOOP",
            Closure => "CLOSURE",
            Call => "CALL",
            Return => "RETURN",
        }
    }

    /// True for the three branching opcodes whose offset gets backpatched.
    pub fn is_jump(&self) -> bool {
        matches!(self, OpCode::Jmp | OpCode::JmpT | OpCode::JmpF)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
