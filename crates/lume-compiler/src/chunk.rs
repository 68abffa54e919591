//! Compiled output: an append-only instruction stream plus a deduplicated,
//! insertion-ordered constant pool.

use crate::opcode::OpCode;
use indexmap::IndexMap;
use std::fmt;

/// A constant-pool value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
    Nil,
}

impl Value {
    /// Rendering used in the constant section of the listing: strings are
    /// quoted, everything else uses its default form.
    pub fn render(&self) -> String {
        match self {
            Value::Number(n) => format!("{n}"),
            Value::Str(s) => format!("\"{s}\""),
            Value::Bool(b) => format!("{b}"),
            Value::Nil => "nil".to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Hashable dedup key for the pool: (value, runtime type). Numbers key on
/// their bit pattern so equality matches the stored value exactly.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum ConstKey {
    Number(u64),
    Str(String),
    Bool(bool),
    Nil,
}

impl ConstKey {
    fn of(value: &Value) -> ConstKey {
        match value {
            Value::Number(n) => ConstKey::Number(n.to_bits()),
            Value::Str(s) => ConstKey::Str(s.clone()),
            Value::Bool(b) => ConstKey::Bool(*b),
            Value::Nil => ConstKey::Nil,
        }
    }
}

/// One instruction. Operands are signed so backward jump offsets are
/// representable; instructions are never mutated after emission except for
/// jump backpatching.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Instruction {
    pub op: OpCode,
    pub a: i32,
    pub b: i32,
    pub c: i32,
    pub line: u32,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.op.name(), self.a, self.b, self.c)
    }
}

/// A finished compilation unit: instructions and constants.
#[derive(Debug, Default)]
pub struct Chunk {
    pub code: Vec<Instruction>,
    constants: Vec<Value>,
    index: IndexMap<ConstKey, u32>,
}

impl Chunk {
    pub fn new() -> Self {
        Chunk::default()
    }

    /// Append an instruction, returning its index (a stable jump address).
    pub fn emit(&mut self, op: OpCode, a: i32, b: i32, c: i32, line: u32) -> usize {
        let pc = self.code.len();
        self.code.push(Instruction { op, a, b, c, line });
        pc
    }

    /// Intern a constant, returning its pool index. Repeated (value, type)
    /// pairs share one slot.
    pub fn add_constant(&mut self, value: Value) -> u32 {
        let key = ConstKey::of(&value);
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        let idx = self.constants.len() as u32;
        self.constants.push(value);
        self.index.insert(key, idx);
        idx
    }

    pub fn constants(&self) -> &[Value] {
        &self.constants
    }

    pub fn code_len(&self) -> usize {
        self.code.len()
    }

    /// Mutable access to an emitted instruction, for backpatching only.
    pub fn get_mut(&mut self, pc: usize) -> &mut Instruction {
        &mut self.code[pc]
    }
}
