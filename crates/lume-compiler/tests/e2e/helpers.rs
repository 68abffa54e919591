use lume_compiler::chunk::{Chunk, Value};
use lume_compiler::opcode::OpCode;
use lume_compiler::{compile, compile_to_chunk, CompileError, OptLevel};

/// Compile a source string to a chunk, panicking on error.
pub fn compile_str(source: &str, level: OptLevel) -> Chunk {
    compile_to_chunk(source, level).unwrap_or_else(|e| {
        panic!("compile failed: {e}\nsource:\n{source}");
    })
}

/// Compile a source string to its listing, panicking on error.
pub fn compile_listing(source: &str, level: OptLevel) -> String {
    compile(source, level).unwrap_or_else(|e| {
        panic!("compile failed: {e}\nsource:\n{source}");
    })
}

/// Compile a source string and expect an error.
pub fn compile_err(source: &str) -> CompileError {
    match compile_to_chunk(source, OptLevel::O0) {
        Err(e) => e,
        Ok(_) => panic!("expected compile error, got success\nsource:\n{source}"),
    }
}

/// Check if a chunk contains a specific opcode.
pub fn has_opcode(chunk: &Chunk, op: OpCode) -> bool {
    chunk.code.iter().any(|i| i.op == op)
}

/// Count occurrences of an opcode in a chunk.
pub fn count_opcode(chunk: &Chunk, op: OpCode) -> usize {
    chunk.code.iter().filter(|i| i.op == op).count()
}

/// Find the first instruction index with a given opcode.
pub fn find_opcode(chunk: &Chunk, op: OpCode) -> Option<usize> {
    chunk.code.iter().position(|i| i.op == op)
}

/// True if the constant pool holds this number.
pub fn has_number_constant(chunk: &Chunk, n: f64) -> bool {
    chunk
        .constants()
        .iter()
        .any(|v| matches!(v, Value::Number(x) if *x == n))
}

/// True if the constant pool holds this string.
#[allow(dead_code)]
pub fn has_string_constant(chunk: &Chunk, s: &str) -> bool {
    chunk
        .constants()
        .iter()
        .any(|v| matches!(v, Value::Str(x) if x == s))
}
