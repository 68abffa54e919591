//! Lume compiler: a small Lua-subset to register-bytecode listing compiler.
//!
//! The pipeline is strictly staged: [`lexer::tokenize`] → [`parser::parse`] →
//! [`optimizer::optimize`] → [`codegen::generate`] → [`listing::render`].
//! Each stage consumes the previous stage's whole output; the first error
//! aborts the compilation with no partial result.

pub mod ast;
pub mod chunk;
pub mod codegen;
pub mod lexer;
pub mod listing;
pub mod opcode;
pub mod optimizer;
pub mod parser;
pub mod token;

pub use optimizer::OptLevel;

use crate::chunk::Chunk;
use crate::codegen::CodegenError;
use crate::lexer::LexError;
use crate::parser::ParseError;
use std::fmt;

/// Any stage's failure. The optimizer cannot fail.
#[derive(Clone, Debug, PartialEq)]
pub enum CompileError {
    Lex(LexError),
    Parse(ParseError),
    Codegen(CodegenError),
}

impl CompileError {
    /// Which stage produced the error.
    pub fn stage(&self) -> &'static str {
        match self {
            CompileError::Lex(_) => "lex",
            CompileError::Parse(_) => "parse",
            CompileError::Codegen(_) => "codegen",
        }
    }

    pub fn line(&self) -> u32 {
        match self {
            CompileError::Lex(e) => e.line,
            CompileError::Parse(e) => e.line,
            CompileError::Codegen(e) => e.line,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Lex(e) => write!(f, "{e}"),
            CompileError::Parse(e) => write!(f, "{e}"),
            CompileError::Codegen(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<LexError> for CompileError {
    fn from(e: LexError) -> Self {
        CompileError::Lex(e)
    }
}

impl From<ParseError> for CompileError {
    fn from(e: ParseError) -> Self {
        CompileError::Parse(e)
    }
}

impl From<CodegenError> for CompileError {
    fn from(e: CodegenError) -> Self {
        CompileError::Codegen(e)
    }
}

/// Compile source text down to a chunk without rendering. Useful for
/// inspecting instructions and constants directly.
pub fn compile_to_chunk(source: &str, level: OptLevel) -> Result<Chunk, CompileError> {
    let tokens = lexer::tokenize(source)?;
    let program = parser::parse(tokens)?;
    let program = optimizer::optimize(program, level);
    let chunk = codegen::generate(&program)?;
    Ok(chunk)
}

/// Compile source text into its textual listing.
pub fn compile(source: &str, level: OptLevel) -> Result<String, CompileError> {
    Ok(listing::render(&compile_to_chunk(source, level)?))
}
