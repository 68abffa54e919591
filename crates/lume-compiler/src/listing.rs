//! Textual listing renderer.
//!
//! Pure formatting over a finished chunk; performs no validation. The output
//! is a debugging/inspection artifact, not a binary format.

use crate::chunk::Chunk;
use std::fmt::Write;

/// Render a chunk into the stable listing grammar:
///
/// ```text
/// -- <title comment lines>
///
/// -- Constants:
/// -- [<index>] = <rendered-literal>
///
/// -- Instructions:
/// -- [<index>] <MNEMONIC> <A> <B> <C>
/// ```
pub fn render(chunk: &Chunk) -> String {
    let mut out = String::new();
    writeln!(out, "-- lume bytecode listing").unwrap();
    writeln!(
        out,
        "-- {} constants, {} instructions",
        chunk.constants().len(),
        chunk.code_len()
    )
    .unwrap();
    writeln!(out).unwrap();

    writeln!(out, "-- Constants:").unwrap();
    for (i, value) in chunk.constants().iter().enumerate() {
        writeln!(out, "-- [{i}] = {}", value.render()).unwrap();
    }
    writeln!(out).unwrap();

    writeln!(out, "-- Instructions:").unwrap();
    for (i, inst) in chunk.code.iter().enumerate() {
        writeln!(out, "-- [{i}] {} {} {} {}", inst.op.name(), inst.a, inst.b, inst.c).unwrap();
    }
    out
}
