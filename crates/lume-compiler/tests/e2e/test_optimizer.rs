use super::helpers::*;
use lume_compiler::opcode::OpCode;
use lume_compiler::OptLevel;

#[test]
fn e2e_folding_collapses_to_one_constant() {
    let chunk = compile_str("local x = 5 + 3", OptLevel::O1);
    assert!(!has_opcode(&chunk, OpCode::Add));
    assert!(has_number_constant(&chunk, 8.0));
}

#[test]
fn e2e_folding_matches_direct_evaluation() {
    let chunk = compile_str("local x = (5 + 3) * (10 - 2)", OptLevel::O1);
    assert!(has_number_constant(&chunk, 64.0));
    assert_eq!(count_opcode(&chunk, OpCode::Mul), 0);
}

#[test]
fn e2e_deeply_nested_folds_in_one_call() {
    let chunk = compile_str("local x = ((1 + 2) * 3) + ((4 + 5) * 6)", OptLevel::O1);
    assert!(has_number_constant(&chunk, 63.0));
    assert_eq!(chunk.code_len(), 1);
}

#[test]
fn e2e_level_zero_leaves_arithmetic_alone() {
    let chunk = compile_str("local x = 5 + 3", OptLevel::O0);
    assert!(has_opcode(&chunk, OpCode::Add));
    assert!(has_number_constant(&chunk, 5.0));
    assert!(has_number_constant(&chunk, 3.0));
}

#[test]
fn e2e_division_by_zero_survives_folding() {
    let chunk = compile_str("local x = 1 / 0", OptLevel::O2);
    assert!(has_opcode(&chunk, OpCode::Div));
}

#[test]
fn e2e_if_true_reduces_to_consequent() {
    let plain = compile_str("x = 1", OptLevel::O1);
    let reduced = compile_str("if true then x = 1 else x = 2 end", OptLevel::O1);
    assert_eq!(plain.code, reduced.code);
}

#[test]
fn e2e_if_false_reduces_to_alternate() {
    let plain = compile_str("x = 2", OptLevel::O1);
    let reduced = compile_str("if false then x = 1 else x = 2 end", OptLevel::O1);
    assert_eq!(plain.code, reduced.code);
}

#[test]
fn e2e_while_false_emits_nothing() {
    let chunk = compile_str("while false do x = 1 end", OptLevel::O1);
    assert_eq!(chunk.code_len(), 0);
    assert!(chunk.constants().is_empty());
}

#[test]
fn e2e_folded_condition_feeds_dce() {
    // `1 < 2` folds to true, then the branch dissolves.
    let chunk = compile_str("if 1 < 2 then x = 1 end", OptLevel::O1);
    assert!(!has_opcode(&chunk, OpCode::JmpF));
    assert!(has_opcode(&chunk, OpCode::SetGlobal));
}

#[test]
fn e2e_peephole_requires_level_two() {
    let l1 = compile_str("local y = x + 0", OptLevel::O1);
    assert!(has_opcode(&l1, OpCode::Add));
    let l2 = compile_str("local y = x + 0", OptLevel::O2);
    assert!(!has_opcode(&l2, OpCode::Add));
}

#[test]
fn e2e_peephole_mul_identities() {
    let chunk = compile_str("local y = x * 1\nlocal z = 1 * x", OptLevel::O2);
    assert!(!has_opcode(&chunk, OpCode::Mul));
    let chunk = compile_str("local y = f(x) * 0", OptLevel::O2);
    assert!(!has_opcode(&chunk, OpCode::Mul));
    assert!(has_number_constant(&chunk, 0.0));
}

#[test]
fn e2e_peephole_boolean_identities() {
    let chunk = compile_str("local y = true and x", OptLevel::O2);
    assert!(!has_opcode(&chunk, OpCode::JmpF));
    let chunk = compile_str("local y = x or false", OptLevel::O2);
    assert!(!has_opcode(&chunk, OpCode::JmpT));
}

#[test]
fn e2e_optimization_changes_listing_but_stays_deterministic() {
    let source = "local a = 2 + 3\nif true then b = a end";
    let o0 = compile_listing(source, OptLevel::O0);
    let o2a = compile_listing(source, OptLevel::O2);
    let o2b = compile_listing(source, OptLevel::O2);
    assert_ne!(o0, o2a);
    assert_eq!(o2a, o2b);
}
